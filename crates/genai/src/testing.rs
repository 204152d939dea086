//! Scripted model for tests.
//!
//! Replays queued responses in order and records every request it sees.
//! When a queue runs dry the call fails with a `Network` error.

use std::collections::VecDeque;
use std::sync::Mutex;

use wildlens_core::ImageArtifact;

use crate::model::{
    Citation, GenerativeModel, ImageRequest, ImageResponse, ResponsePart, TextRequest,
    TextResponse,
};
use crate::GenAiError;

#[derive(Default)]
pub struct ScriptedModel {
    text: Mutex<VecDeque<Result<TextResponse, GenAiError>>>,
    images: Mutex<VecDeque<Result<ImageResponse, GenAiError>>>,
    text_requests: Mutex<Vec<TextRequest>>,
    image_requests: Mutex<Vec<ImageRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a text response with the given grounding URLs.
    pub fn with_text(self, text: impl Into<String>, urls: &[&str]) -> Self {
        let citations = urls
            .iter()
            .map(|u| Citation { uri: Some(u.to_string()), title: None })
            .collect();
        self.push_text(Ok(TextResponse { text: text.into(), citations }));
        self
    }

    pub fn with_text_error(self, error: GenAiError) -> Self {
        self.push_text(Err(error));
        self
    }

    /// Queue an image response made of the given parts.
    pub fn with_image_parts(self, parts: Vec<ResponsePart>) -> Self {
        self.push_image(Ok(ImageResponse { parts }));
        self
    }

    /// Queue an image response holding one image.
    pub fn with_image(self, image: ImageArtifact) -> Self {
        self.with_image_parts(vec![ResponsePart { text: None, image: Some(image) }])
    }

    pub fn with_image_error(self, error: GenAiError) -> Self {
        self.push_image(Err(error));
        self
    }

    pub fn push_text(&self, response: Result<TextResponse, GenAiError>) {
        lock(&self.text).push_back(response);
    }

    pub fn push_image(&self, response: Result<ImageResponse, GenAiError>) {
        lock(&self.images).push_back(response);
    }

    /// Text requests received so far, oldest first.
    pub fn text_requests(&self) -> Vec<TextRequest> {
        lock(&self.text_requests).clone()
    }

    /// Image requests received so far, oldest first.
    pub fn image_requests(&self) -> Vec<ImageRequest> {
        lock(&self.image_requests).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.text_requests).len() + lock(&self.image_requests).len()
    }
}

impl GenerativeModel for ScriptedModel {
    fn generate_text(&self, request: &TextRequest) -> Result<TextResponse, GenAiError> {
        lock(&self.text_requests).push(request.clone());
        lock(&self.text)
            .pop_front()
            .unwrap_or_else(|| Err(GenAiError::Network("no scripted text response".into())))
    }

    fn generate_image(&self, request: &ImageRequest) -> Result<ImageResponse, GenAiError> {
        lock(&self.image_requests).push(request.clone());
        lock(&self.images)
            .pop_front()
            .unwrap_or_else(|| Err(GenAiError::Network("no scripted image response".into())))
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    // A panicking test thread must not wedge the others
    m.lock().unwrap_or_else(|e| e.into_inner())
}
