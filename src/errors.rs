use std::fmt;

/// Failure kinds of the external scoring call.
///
/// None of these ever reach callers of `LeadScorer::score`; they are
/// logged and replaced by the deterministic fallback result.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoringError {
    /// No API key configured, the scorer runs in fallback-only mode.
    Disabled,
    /// The HTTP client could not be built.
    Configuration(String),
    /// Transport-level failure (connect, TLS, body read).
    Network(String),
    /// The request exceeded the configured timeout.
    Timeout,
    /// The scoring service answered with a status other than 200.
    Status {
        /// HTTP status code returned by the service.
        status: u16,
        /// Response body, for logging.
        body: String,
    },
    /// The response body or the model output did not have the expected shape.
    MalformedResponse(String),
}

impl fmt::Display for ScoringError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringError::Disabled => write!(f, "AI scoring disabled: no API key configured"),
            ScoringError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            ScoringError::Network(msg) => write!(f, "Network error: {}", msg),
            ScoringError::Timeout => write!(f, "Scoring request timed out"),
            ScoringError::Status { status, body } => {
                write!(f, "Scoring API returned status {}: {}", status, body)
            }
            ScoringError::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
        }
    }
}

impl std::error::Error for ScoringError {}

impl From<reqwest::Error> for ScoringError {
    /// Converts a `reqwest::Error`, keeping timeouts distinguishable.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScoringError::Timeout
        } else if err.is_decode() {
            ScoringError::MalformedResponse(err.to_string())
        } else {
            ScoringError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ScoringError {
    fn from(err: serde_json::Error) -> Self {
        ScoringError::MalformedResponse(err.to_string())
    }
}
