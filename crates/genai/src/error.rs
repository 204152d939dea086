use thiserror::Error;

/// Error type for model calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenAiError {
    /// No API key configured
    #[error("API key not configured")]
    MissingKey,
    /// Request never completed (DNS, TLS, timeout, client build)
    #[error("Network error: {0}")]
    Network(String),
    /// Non-2xx response
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    /// Response envelope could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),
    /// The service refused the prompt
    #[error("Prompt blocked: {0}")]
    Blocked(String),
}

impl GenAiError {
    /// True for 401/403 responses and missing keys.
    pub fn is_auth(&self) -> bool {
        matches!(self, GenAiError::MissingKey)
            || matches!(self, GenAiError::Http { status, .. } if *status == 401 || *status == 403)
    }
}
