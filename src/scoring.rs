/// Lead quality scoring
///
/// The scorer asks an external language model for a structured assessment
/// and falls back to a deterministic heuristic whenever that is not
/// possible:
/// 1. Build the analysis context (website, contacts, market)
/// 2. Request a completion with the context as prompt payload
/// 3. Parse the model output, defaulting every missing field
/// 4. On any failure, substitute `fallback(lead)`
use crate::analysis::LeadContext;
use crate::config::ScoringConfig;
use crate::errors::ScoringError;
use crate::llm_client::{ChatMessage, OpenRouterClient};
use crate::models::{FollowupTiming, LeadRecord, PriorityLevel, ScoreFactors, ScoreResult};
use serde_json::{Map, Value};

const SYSTEM_PROMPT: &str = "You are an expert lead qualification specialist. \
Analyze leads objectively and provide actionable insights.";

const DEFAULT_SCORE: u8 = 5;
const DEFAULT_REASONING: &str = "AI analysis completed";
const DEFAULT_CONFIDENCE: f64 = 0.7;

const FALLBACK_REASONING: &str = "Fallback scoring used due to AI unavailability";
const FALLBACK_CONFIDENCE: f64 = 0.5;
const FALLBACK_REVENUE_BONUS_THRESHOLD: f64 = 100_000.0;

const MIN_SCORE: u8 = 1;
const MAX_SCORE: u8 = 10;
const MAX_FACTOR: u8 = 10;

/// Scores leads, via the external service when configured.
///
/// Holds no mutable state; one instance can serve concurrent callers.
#[derive(Clone)]
pub struct LeadScorer {
    client: Option<OpenRouterClient>,
}

impl LeadScorer {
    /// Builds a scorer from configuration.
    ///
    /// Without an API key the scorer is created in fallback-only mode
    /// rather than failing.
    pub fn new(config: &ScoringConfig) -> Result<Self, ScoringError> {
        match OpenRouterClient::new(config) {
            Ok(client) => {
                tracing::info!("✓ AI lead scoring enabled (model: {})", client.model());
                Ok(Self {
                    client: Some(client),
                })
            }
            Err(ScoringError::Disabled) => {
                tracing::warn!("AI lead scoring disabled, every lead gets fallback scoring");
                Ok(Self::fallback_only())
            }
            Err(e) => Err(e),
        }
    }

    /// A scorer that never calls out and always returns the fallback result.
    pub fn fallback_only() -> Self {
        Self { client: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Scores a lead. Never fails: errors are logged and replaced by `fallback`.
    pub async fn score(&self, lead: &LeadRecord) -> ScoreResult {
        match self.request_score(lead).await {
            Ok(result) => {
                tracing::info!(
                    "AI score for '{}': {}/10 (confidence {:.2})",
                    lead.company_name,
                    result.score,
                    result.confidence
                );
                result
            }
            Err(ScoringError::Disabled) => fallback(lead),
            Err(e) => {
                tracing::warn!(
                    "AI lead scoring failed for '{}', using fallback: {}",
                    lead.company_name,
                    e
                );
                fallback(lead)
            }
        }
    }

    /// Performs the external scoring call without any fallback substitution.
    pub async fn request_score(&self, lead: &LeadRecord) -> Result<ScoreResult, ScoringError> {
        let client = self.client.as_ref().ok_or(ScoringError::Disabled)?;

        let context = LeadContext::from_lead(lead);
        tracing::debug!(
            "Scoring context: website {:?}, contacts {:?}, market {:?}",
            context.website_analysis.quality,
            context.contact_analysis.quality,
            context.market_analysis.overall_potential
        );

        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_prompt(&context)?),
        ];
        let content = client.complete(&messages).await?;

        parse_analysis(&content)
    }
}

/// Renders the user prompt with the context embedded as pretty JSON.
pub fn build_prompt(context: &LeadContext<'_>) -> Result<String, ScoringError> {
    let payload = serde_json::to_string_pretty(context)?;

    Ok(format!(
        r#"Analyze this lead data and provide a comprehensive score from 1-10 with detailed reasoning:

LEAD DATA:
{payload}

Please provide a JSON response with:
- score: integer (1-10, where 10 is highest quality)
- reasoning: string explaining the score
- factors: object with individual scores for:
    * company_quality (0-10)
    * contact_quality (0-10)
    * market_potential (0-10)
    * data_completeness (0-10)
- confidence: float (0-1, how confident in the assessment)
- recommendations: array of strings with specific actions to improve lead quality
- risk_factors: array of strings identifying potential issues
- priority_level: string ("high", "medium", "low")
- suggested_followup_timing: string ("immediate", "within_24h", "within_week", "low_priority")

Consider:
- Company website validity and professionalism
- Contact information quality and completeness
- Industry conversion potential
- Geographic market viability
- Revenue indicators
- Decision maker level
- Data completeness"#
    ))
}

fn number_field(analysis: &Map<String, Value>, key: &str) -> Option<f64> {
    let parsed = match analysis.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

fn string_list_field(analysis: &Map<String, Value>, key: &str) -> Vec<String> {
    analysis
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn factor(factors: Option<&Map<String, Value>>, key: &str) -> u8 {
    factors
        .and_then(|f| number_field(f, key))
        .map(|n| n.round().clamp(0.0, f64::from(MAX_FACTOR)) as u8)
        .unwrap_or(0)
}

/// Parses the model output into a fully populated `ScoreResult`.
///
/// The output must be a JSON object; anything else is `MalformedResponse`.
/// Missing or ill-typed fields take their defaults and numbers are clamped
/// into range.
pub fn parse_analysis(content: &str) -> Result<ScoreResult, ScoringError> {
    let value: Value = serde_json::from_str(content.trim())?;
    let analysis = value.as_object().ok_or_else(|| {
        ScoringError::MalformedResponse("Expected a JSON object from the model".to_string())
    })?;

    let score = number_field(analysis, "score")
        .map(|n| n.round().clamp(f64::from(MIN_SCORE), f64::from(MAX_SCORE)) as u8)
        .unwrap_or(DEFAULT_SCORE);

    let factors = analysis.get("factors").and_then(Value::as_object);

    Ok(ScoreResult {
        score,
        reasoning: analysis
            .get("reasoning")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_REASONING)
            .to_string(),
        factors: ScoreFactors {
            company_quality: factor(factors, "company_quality"),
            contact_quality: factor(factors, "contact_quality"),
            market_potential: factor(factors, "market_potential"),
            data_completeness: factor(factors, "data_completeness"),
        },
        confidence: number_field(analysis, "confidence")
            .map(|c| c.clamp(0.0, 1.0))
            .unwrap_or(DEFAULT_CONFIDENCE),
        recommendations: string_list_field(analysis, "recommendations"),
        risk_factors: string_list_field(analysis, "risk_factors"),
        priority_level: analysis
            .get("priority_level")
            .and_then(Value::as_str)
            .and_then(PriorityLevel::from_label)
            .unwrap_or(PriorityLevel::Medium),
        suggested_followup_timing: analysis
            .get("suggested_followup_timing")
            .and_then(Value::as_str)
            .and_then(FollowupTiming::from_label)
            .unwrap_or(FollowupTiming::WithinWeek),
        success: true,
    })
}

/// Deterministic, network-free scoring.
///
/// Starts at 5 and adds one point each for having contacts, an http(s)
/// website and revenue above 100k. The remaining fields are generic on
/// purpose: they signal degraded mode rather than describe the lead.
pub fn fallback(lead: &LeadRecord) -> ScoreResult {
    let mut score = DEFAULT_SCORE;

    if !lead.contacts.is_empty() {
        score += 1;
    }
    if lead.company_website.contains("http") {
        score += 1;
    }
    if lead.revenue > FALLBACK_REVENUE_BONUS_THRESHOLD {
        score += 1;
    }

    ScoreResult {
        score: score.min(MAX_SCORE),
        reasoning: FALLBACK_REASONING.to_string(),
        factors: ScoreFactors::neutral(),
        confidence: FALLBACK_CONFIDENCE,
        recommendations: vec![
            "Verify contact information".to_string(),
            "Research company details".to_string(),
        ],
        risk_factors: vec!["Limited data available".to_string()],
        priority_level: PriorityLevel::Medium,
        suggested_followup_timing: FollowupTiming::WithinWeek,
        success: false,
    }
}
