//! Gemini HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). One endpoint:
//! `POST {api_base}/v1beta/models/{model}:generateContent`.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use wildlens_config::ResolvedConfig;
use wildlens_core::ImageArtifact;

use crate::model::{
    Citation, GenerativeModel, ImageRequest, ImageResponse, OutputMode, ResponsePart,
    TextRequest, TextResponse,
};
use crate::wire::{
    ApiError, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    GoogleSearch, ImageConfig, Part, Tool,
};
use crate::GenAiError;

/// Path template, relative to the API base. `{model}` is substituted.
pub const GENERATE_CONTENT_PATH: &str = "/v1beta/models/{model}:generateContent";

/// Gemini API client (blocking). Cheap to clone; clones share a connection pool.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::blocking::Client,
    api_base: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a client. `timeout: None` waits indefinitely.
    pub fn new(
        api_key: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, GenAiError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GenAiError::MissingKey);
        }

        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("wildlens/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| GenAiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Create a client from resolved configuration. Fails fast without a key.
    pub fn from_config(config: &ResolvedConfig) -> Result<Self, GenAiError> {
        let key = config.require_key().map_err(|_| GenAiError::MissingKey)?;
        Self::new(key, config.settings.api_base.clone(), config.settings.timeout())
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}{}", self.api_base, GENERATE_CONTENT_PATH.replace("{model}", model))
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn generate_content(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenAiError> {
        let url = self.endpoint(model);
        log::debug!("POST {}", url);

        let response = self.http.post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .map_err(|e| GenAiError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let text = response.text().unwrap_or_default();
            let message = match serde_json::from_str::<ApiError>(&text) {
                Ok(err) => match err.error.status {
                    Some(code) => format!("{} ({})", err.error.message, code),
                    None => err.error.message,
                },
                Err(_) => text,
            };
            log::warn!("{} returned HTTP {}", model, status);
            return Err(GenAiError::Http { status, message });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| GenAiError::Parse(e.to_string()))?;

        if parsed.candidates.is_empty() {
            if let Some(reason) = parsed.prompt_feedback.as_ref().and_then(|f| f.block_reason.clone()) {
                return Err(GenAiError::Blocked(reason));
            }
        }

        Ok(parsed)
    }
}

impl GenerativeModel for GeminiClient {
    fn generate_text(&self, request: &TextRequest) -> Result<TextResponse, GenAiError> {
        let body = text_request_body(request);
        let response = self.generate_content(&request.model, &body)?;
        Ok(text_response(response))
    }

    fn generate_image(&self, request: &ImageRequest) -> Result<ImageResponse, GenAiError> {
        let body = image_request_body(request);
        let response = self.generate_content(&request.model, &body)?;
        image_response(response)
    }
}

// ── Request/response mapping ────────────────────────────────────────

fn text_request_body(request: &TextRequest) -> GenerateContentRequest {
    let tools = if request.search {
        vec![Tool { google_search: GoogleSearch {} }]
    } else {
        Vec::new()
    };

    let response_mime_type = match request.output {
        OutputMode::FreeText => None,
        OutputMode::Json => Some("application/json".to_string()),
    };

    let generation_config = if request.temperature.is_some() || response_mime_type.is_some() {
        Some(GenerationConfig {
            temperature: request.temperature,
            response_mime_type,
            image_config: None,
        })
    } else {
        None
    };

    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part::text(request.prompt.clone())],
        }],
        tools,
        generation_config,
    }
}

fn image_request_body(request: &ImageRequest) -> GenerateContentRequest {
    let mut parts = Vec::with_capacity(2);
    if let Some(source) = &request.source {
        parts.push(Part::inline(source.mime_type(), source.to_base64()));
    }
    parts.push(Part::text(request.prompt.clone()));

    let generation_config = if request.aspect_ratio.is_some() || request.image_size.is_some() {
        Some(GenerationConfig {
            image_config: Some(ImageConfig {
                aspect_ratio: request.aspect_ratio.clone(),
                image_size: request.image_size.clone(),
            }),
            ..GenerationConfig::default()
        })
    } else {
        None
    };

    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        tools: Vec::new(),
        generation_config,
    }
}

fn text_response(response: GenerateContentResponse) -> TextResponse {
    let Some(candidate) = response.candidates.into_iter().next() else {
        return TextResponse::default();
    };

    let text = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter(|p| p.thought != Some(true))
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    let citations = candidate
        .grounding_metadata
        .map(|g| {
            g.grounding_chunks
                .into_iter()
                .map(|chunk| {
                    let web = chunk.web.unwrap_or_default();
                    Citation { uri: web.uri, title: web.title }
                })
                .collect()
        })
        .unwrap_or_default();

    TextResponse { text, citations }
}

fn image_response(response: GenerateContentResponse) -> Result<ImageResponse, GenAiError> {
    let Some(content) = response.candidates.into_iter().next().and_then(|c| c.content) else {
        return Ok(ImageResponse::default());
    };

    let mut parts = Vec::with_capacity(content.parts.len());
    let mut decode_error = None;
    for part in content.parts {
        let image = match part.inline_data {
            Some(blob) => match STANDARD.decode(blob.data.as_bytes()) {
                Ok(bytes) => Some(ImageArtifact::from_bytes(blob.mime_type, bytes)),
                Err(e) => {
                    log::warn!("Skipping undecodable inline image part: {}", e);
                    if decode_error.is_none() {
                        decode_error = Some(e);
                    }
                    None
                }
            },
            None => None,
        };
        parts.push(ResponsePart { text: part.text, image });
    }

    // Undecodable parts only matter when nothing else carried an image
    if let Some(e) = decode_error {
        if parts.iter().all(|p| p.image.is_none()) {
            return Err(GenAiError::Parse(format!("inline image data: {}", e)));
        }
    }

    Ok(ImageResponse { parts })
}
