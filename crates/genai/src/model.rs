use std::sync::Arc;

use wildlens_core::ImageArtifact;

use crate::GenAiError;

/// How the service should shape a text response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Unconstrained text. Required when search augmentation is on.
    #[default]
    FreeText,
    /// `application/json` structured output
    Json,
}

/// A single-turn text completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub model: String,
    pub prompt: String,
    /// Let the model consult web search before answering
    pub search: bool,
    pub output: OutputMode,
    pub temperature: Option<f32>,
}

impl TextRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            search: false,
            output: OutputMode::FreeText,
            temperature: None,
        }
    }

    pub fn with_search(mut self) -> Self {
        self.search = true;
        self
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A web source the model cited.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Citation {
    pub uri: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextResponse {
    /// Concatenated text of the first candidate, possibly empty
    pub text: String,
    /// Grounding sources, in service order
    pub citations: Vec<Citation>,
}

/// Image generation or edit request. An edit carries a `source`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub source: Option<ImageArtifact>,
    pub aspect_ratio: Option<String>,
    pub image_size: Option<String>,
}

impl ImageRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            source: None,
            aspect_ratio: None,
            image_size: None,
        }
    }
}

/// One content part of an image response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponsePart {
    pub text: Option<String>,
    pub image: Option<ImageArtifact>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageResponse {
    pub parts: Vec<ResponsePart>,
}

/// The external generative-model capability.
///
/// Calls are blocking; run them off any UI thread.
pub trait GenerativeModel: Send + Sync {
    fn generate_text(&self, request: &TextRequest) -> Result<TextResponse, GenAiError>;

    fn generate_image(&self, request: &ImageRequest) -> Result<ImageResponse, GenAiError>;
}

impl<M: GenerativeModel + ?Sized> GenerativeModel for &M {
    fn generate_text(&self, request: &TextRequest) -> Result<TextResponse, GenAiError> {
        (**self).generate_text(request)
    }

    fn generate_image(&self, request: &ImageRequest) -> Result<ImageResponse, GenAiError> {
        (**self).generate_image(request)
    }
}

impl<M: GenerativeModel + ?Sized> GenerativeModel for Box<M> {
    fn generate_text(&self, request: &TextRequest) -> Result<TextResponse, GenAiError> {
        (**self).generate_text(request)
    }

    fn generate_image(&self, request: &ImageRequest) -> Result<ImageResponse, GenAiError> {
        (**self).generate_image(request)
    }
}

impl<M: GenerativeModel + ?Sized> GenerativeModel for Arc<M> {
    fn generate_text(&self, request: &TextRequest) -> Result<TextResponse, GenAiError> {
        (**self).generate_text(request)
    }

    fn generate_image(&self, request: &ImageRequest) -> Result<ImageResponse, GenAiError> {
        (**self).generate_image(request)
    }
}
