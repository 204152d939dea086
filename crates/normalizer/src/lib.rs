//! AI response normalization.
//!
//! Turns a natural-language request into one of three typed results
//! (species profile, quiz, image) while absorbing the ways the upstream
//! model bends its output: markdown fences, prose around JSON, and the
//! split between search-grounded free text and schema-constrained JSON.
//!
//! Error policy differs per operation and is part of the contract:
//! species and image calls propagate every failure, the quiz call degrades
//! to an empty list.

mod error;
pub mod fences;
mod normalizer;
pub mod prompts;
mod validate;

pub use error::NormalizeError;
pub use fences::{decode_tolerant, decode_tolerant_as, strip_markdown_fences, JsonShape};
pub use normalizer::{NormalizerOptions, ResponseNormalizer, DEFAULT_QUIZ_TOPIC};
