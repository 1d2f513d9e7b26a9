use crate::config::ScoringConfig;
use crate::errors::ScoringError;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Client for an OpenAI-compatible chat-completions endpoint (OpenRouter by default).
#[derive(Clone)]
pub struct OpenRouterClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    referer: String,
    title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenRouterClient {
    /// Creates a new `OpenRouterClient`.
    ///
    /// # Arguments
    ///
    /// * `config` - Scoring configuration; must carry an API key.
    ///
    /// # Returns
    ///
    /// * `Result<Self, ScoringError>` - `Disabled` when no key is configured.
    pub fn new(config: &ScoringConfig) -> Result<Self, ScoringError> {
        let api_key = config.api_key.clone().ok_or(ScoringError::Disabled)?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ScoringError::Configuration(format!("Failed to create scoring client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            referer: config.referer.clone(),
            title: config.title.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one chat-completion request and returns the first choice's text.
    ///
    /// # Arguments
    ///
    /// * `messages` - The conversation, usually a system and a user message.
    ///
    /// # Returns
    ///
    /// * `Result<String, ScoringError>` - The raw model output.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ScoringError> {
        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!("Requesting completion from {} (model: {})", url, self.model);

        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&body)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Scoring API returned error {}: {}", status, error_text);
            return Err(ScoringError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        // Decode failures map to MalformedResponse, a stalled body to Timeout
        let envelope: ChatCompletionResponse = response.json().await?;

        envelope
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                ScoringError::MalformedResponse("No message content in completion".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_api_key() {
        let config = ScoringConfig::default();
        assert!(matches!(
            OpenRouterClient::new(&config),
            Err(ScoringError::Disabled)
        ));
    }

    #[tokio::test]
    async fn test_client_creation() {
        let config = ScoringConfig {
            api_key: Some("test-key".to_string()),
            base_url: "https://example.com/api/v1/".to_string(),
            ..Default::default()
        };
        let client = OpenRouterClient::new(&config).unwrap();
        assert_eq!(client.base_url, "https://example.com/api/v1");
        assert_eq!(client.model(), "anthropic/claude-3.5-sonnet");
    }
}
