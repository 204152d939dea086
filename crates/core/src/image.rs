//! Encoded image payloads.
//!
//! Callers exchange images as base64 data URIs (`data:image/png;base64,...`).
//! Internally an artifact is raw bytes plus a mime type.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;

/// Mime type assumed when a payload arrives without a data-URI header.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageDecodeError {
    #[error("image payload is empty")]
    Empty,
    #[error("malformed data URI header: {0}")]
    BadHeader(String),
    #[error("invalid base64 image data: {0}")]
    Base64(String),
}

/// An immutable encoded image (PNG, JPEG, ...).
#[derive(Clone, PartialEq, Eq)]
pub struct ImageArtifact {
    mime_type: String,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageArtifact")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageArtifact {
    pub fn from_bytes(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: normalize_mime(&mime_type.into()),
            bytes,
        }
    }

    /// Parse a bare base64 payload or a `data:<mime>;base64,` URI.
    ///
    /// The header, when present, is stripped and its mime type kept.
    pub fn from_encoded(encoded: &str) -> Result<Self, ImageDecodeError> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(ImageDecodeError::Empty);
        }

        let (mime, payload) = split_data_uri(encoded)?;
        let bytes = decode_base64(payload)?;
        if bytes.is_empty() {
            return Err(ImageDecodeError::Empty);
        }

        Ok(Self::from_bytes(mime.unwrap_or(DEFAULT_IMAGE_MIME), bytes))
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Base64 payload without a header.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// `data:<mime>;base64,<payload>`
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    /// Conventional file extension for the mime type.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

/// Guess a mime type from magic bytes. Falls back to PNG.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    detect_mime(bytes).unwrap_or(DEFAULT_IMAGE_MIME)
}

/// Mime type of a recognised image signature, `None` for anything else.
pub fn detect_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else if bytes.starts_with(b"GIF8") {
        Some("image/gif")
    } else {
        None
    }
}

fn split_data_uri(encoded: &str) -> Result<(Option<&str>, &str), ImageDecodeError> {
    let Some(rest) = encoded.strip_prefix("data:") else {
        return Ok((None, encoded));
    };
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ImageDecodeError::BadHeader("missing ','".into()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| ImageDecodeError::BadHeader(format!("not base64: {}", header)))?;
    if !mime.starts_with("image/") {
        return Err(ImageDecodeError::BadHeader(format!("not an image type: {}", mime)));
    }
    Ok((Some(mime), payload))
}

fn decode_base64(payload: &str) -> Result<Vec<u8>, ImageDecodeError> {
    // Payloads pasted from browsers sometimes carry line breaks
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ImageDecodeError::Base64(e.to_string()))
}

fn normalize_mime(mime: &str) -> String {
    match mime.trim().to_ascii_lowercase().as_str() {
        "" => DEFAULT_IMAGE_MIME.to_string(),
        "image/jpg" => "image/jpeg".to_string(),
        other => other.to_string(),
    }
}
