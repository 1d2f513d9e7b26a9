//! Lead Scoring Engine Library
//!
//! This library provides lead quality scoring (via an external language model
//! with a deterministic fallback) and duplicate lead detection for CRM
//! applications.
//!
//! # Modules
//!
//! - `analysis`: Website, contact and market sub-analyses used as prompt context.
//! - `assessment`: Scoring + duplicate-check workflow and persistable projections.
//! - `config`: Configuration management.
//! - `duplicates`: Weighted duplicate detection.
//! - `errors`: Error types of the external scoring call.
//! - `llm_client`: OpenRouter chat-completions client.
//! - `models`: Lead records and result types.
//! - `scoring`: The lead quality scorer and its fallback.
//! - `validation`: Email, phone and decision-maker checks.

pub mod analysis;
pub mod assessment;
pub mod config;
pub mod duplicates;
pub mod errors;
pub mod llm_client;
pub mod models;
pub mod scoring;
pub mod validation;
