use anyhow::Context;
use lead_scoring_engine::assessment::assess_lead;
use lead_scoring_engine::config::ScoringConfig;
use lead_scoring_engine::models::LeadRecord;
use lead_scoring_engine::scoring::LeadScorer;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Batch entry point.
///
/// Reads a JSON array of leads and assesses them in file order: each lead
/// is scored and checked for duplicates against every lead listed before
/// it. One JSON report per lead is written to stdout; logs go to stderr.
///
/// # Returns
///
/// * `anyhow::Result<()>` - Ok when every lead was assessed, or an error if input or configuration is unusable.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lead_scoring_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: lead-scoring-engine <leads.json>"))?;

    // Load configuration
    let config = ScoringConfig::from_env()?;
    let scorer = LeadScorer::new(&config)?;

    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read {}", path))?;
    let leads: Vec<LeadRecord> =
        serde_json::from_str(&raw).with_context(|| format!("{} is not a JSON array of leads", path))?;
    tracing::info!("Loaded {} lead(s) from {}", leads.len(), path);

    let mut flagged = 0;
    for (idx, lead) in leads.iter().enumerate() {
        tracing::info!("[{}/{}] Processing lead: {}", idx + 1, leads.len(), lead.company_name);

        let assessment = assess_lead(&scorer, lead, &leads[..idx], config.duplicate_threshold).await;
        if assessment.duplicate_flag.is_some() {
            flagged += 1;
        }

        let report = json!({
            "index": idx,
            "status": assessment.status_message(),
            "quality_tier": assessment.quality_tier(),
            "assessment": assessment,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    tracing::info!(
        "✓ Assessed {} lead(s), {} flagged as duplicate",
        leads.len(),
        flagged
    );

    Ok(())
}
