//! Tolerant JSON decoding of model output.
//!
//! Models asked for raw JSON still wrap it in markdown fences or add a
//! sentence before it. Every structured decode in this crate goes through
//! [`decode_tolerant`] so format drift is handled in one place.

use serde::de::DeserializeOwned;
use serde::Deserialize;

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";

/// Opening positions tried when looking for a value embedded in prose.
const MAX_EMBEDDED_STARTS: usize = 32;

/// Top-level JSON shape a caller expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Object,
    Array,
}

impl JsonShape {
    fn delimiters(self) -> (char, char) {
        match self {
            JsonShape::Object => ('{', '}'),
            JsonShape::Array => ('[', ']'),
        }
    }
}

/// Remove every "```json" and "```" marker, then trim.
///
/// Idempotent: the result never contains a fence marker.
pub fn strip_markdown_fences(text: &str) -> String {
    let mut out = text.replace(JSON_FENCE, "").replace(FENCE, "");
    // Removing one marker can splice two backtick runs into a new one
    while out.contains(FENCE) {
        out = out.replace(FENCE, "");
    }
    out.trim().to_string()
}

/// Strip fences and decode. When the model surrounded the JSON with prose,
/// falls back to an embedded value, trying the shape that opens first and
/// then the other one.
///
/// On failure returns the error from the first (whole-text) attempt.
pub fn decode_tolerant<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    let object_at = text.find('{').unwrap_or(usize::MAX);
    let array_at = text.find('[').unwrap_or(usize::MAX);
    if array_at < object_at {
        decode_with(text, &[JsonShape::Array, JsonShape::Object])
    } else {
        decode_with(text, &[JsonShape::Object, JsonShape::Array])
    }
}

/// Like [`decode_tolerant`], but only looks for an embedded value of
/// `shape`. Search-grounded prose often carries `[1]` citation markers that
/// would otherwise be mistaken for the start of an array.
pub fn decode_tolerant_as<T: DeserializeOwned>(
    text: &str,
    shape: JsonShape,
) -> Result<T, serde_json::Error> {
    decode_with(text, &[shape])
}

fn decode_with<T: DeserializeOwned>(text: &str, shapes: &[JsonShape]) -> Result<T, serde_json::Error> {
    let cleaned = strip_markdown_fences(text);
    let first_err = match serde_json::from_str(&cleaned) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    for &shape in shapes {
        if let Some(value) = embedded_value(&cleaned, shape) {
            log::warn!("Model response contained extra text around JSON");
            return Ok(value);
        }
    }

    Err(first_err)
}

/// Outermost span of `shape` first, then a value read from each opener
/// with trailing text ignored.
fn embedded_value<T: DeserializeOwned>(text: &str, shape: JsonShape) -> Option<T> {
    if let Some(span) = json_span(text, shape) {
        if span.len() < text.len() {
            if let Ok(value) = serde_json::from_str(span) {
                return Some(value);
            }
        }
    }

    let (open, _) = shape.delimiters();
    text.match_indices(open)
        .take(MAX_EMBEDDED_STARTS)
        .find_map(|(start, _)| {
            let mut de = serde_json::Deserializer::from_str(&text[start..]);
            T::deserialize(&mut de).ok()
        })
}

/// From the first opener of `shape` to its last closer.
fn json_span(text: &str, shape: JsonShape) -> Option<&str> {
    let (open, close) = shape.delimiters();
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}
