use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "anthropic/claude-3.5-sonnet";
pub const DEFAULT_DUPLICATE_THRESHOLD: u32 = 70;

/// Settings for the external scoring call and the duplicate-flag workflow.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// OpenRouter API key. `None` puts the scorer in fallback-only mode.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Upper bound for one scoring request, connect included.
    pub timeout: Duration,
    pub referer: String,
    pub title: String,
    /// A lead is flagged as duplicate when its best match scores above this.
    pub duplicate_threshold: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            max_tokens: 800,
            timeout: Duration::from_secs(30),
            referer: "https://ea-crm.com".to_string(),
            title: "EA CRM Lead Scoring AI".to_string(),
            duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
        }
    }
}

impl ScoringConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let config = Self {
            api_key: std::env::var("OPENROUTER_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            base_url: std::env::var("OPENROUTER_BASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty())
                .map(|url| {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("OPENROUTER_BASE_URL must start with http:// or https://");
                    }
                    Ok(url.trim_end_matches('/').to_string())
                })
                .transpose()?
                .unwrap_or(defaults.base_url),
            model: std::env::var("LEAD_SCORING_MODEL")
                .ok()
                .filter(|model| !model.trim().is_empty())
                .unwrap_or(defaults.model),
            temperature: match std::env::var("LEAD_SCORING_TEMPERATURE") {
                Ok(raw) => raw
                    .trim()
                    .parse::<f32>()
                    .ok()
                    .filter(|t| (0.0..=2.0).contains(t))
                    .ok_or_else(|| {
                        anyhow::anyhow!("LEAD_SCORING_TEMPERATURE must be a number between 0 and 2")
                    })?,
                Err(_) => defaults.temperature,
            },
            max_tokens: match std::env::var("LEAD_SCORING_MAX_TOKENS") {
                Ok(raw) => raw
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| {
                        anyhow::anyhow!("LEAD_SCORING_MAX_TOKENS must be a positive integer")
                    })?,
                Err(_) => defaults.max_tokens,
            },
            timeout: match std::env::var("LEAD_SCORING_TIMEOUT_SECS") {
                Ok(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs)
                    .ok_or_else(|| {
                        anyhow::anyhow!("LEAD_SCORING_TIMEOUT_SECS must be a positive integer")
                    })?,
                Err(_) => defaults.timeout,
            },
            referer: std::env::var("LEAD_SCORING_REFERER")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.referer),
            title: std::env::var("LEAD_SCORING_TITLE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.title),
            duplicate_threshold: match std::env::var("DUPLICATE_FLAG_THRESHOLD") {
                Ok(raw) => raw
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n <= 100)
                    .ok_or_else(|| {
                        anyhow::anyhow!("DUPLICATE_FLAG_THRESHOLD must be an integer between 0 and 100")
                    })?,
                Err(_) => defaults.duplicate_threshold,
            },
        };

        // Never log the key itself
        tracing::info!("Configuration loaded successfully");
        if config.scoring_enabled() {
            tracing::debug!("Scoring API: {} (model: {})", config.base_url, config.model);
        } else {
            tracing::warn!("OPENROUTER_API_KEY not set, lead scoring runs in fallback mode");
        }
        tracing::debug!(
            "Scoring timeout: {}s, duplicate threshold: {}",
            config.timeout.as_secs(),
            config.duplicate_threshold
        );

        Ok(config)
    }

    pub fn scoring_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_scoring_contract() {
        let config = ScoringConfig::default();
        assert!(!config.scoring_enabled());
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_tokens, 800);
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.duplicate_threshold, 70);
    }
}
