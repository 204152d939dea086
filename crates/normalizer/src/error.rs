use thiserror::Error;
use wildlens_genai::GenAiError;

/// Failure surfaced by the species and image operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    /// A required input was empty or could not be decoded
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The model did not honour the requested JSON shape
    #[error("model response was not in the expected format: {message}")]
    UpstreamFormat { message: String, raw: String },
    /// The image model answered without any image part
    #[error("no image was produced")]
    NoImageProduced,
    /// The model service could not be reached or refused the call
    #[error("transport error: {0}")]
    Transport(#[from] GenAiError),
}

impl NormalizeError {
    pub(crate) fn upstream(message: impl Into<String>, raw: &str) -> Self {
        NormalizeError::UpstreamFormat { message: message.into(), raw: raw.to_string() }
    }
}
