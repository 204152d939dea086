//! Generative model client. The only seam between the normalizer and the
//! network.
//!
//! `GenerativeModel` is the abstract capability: one text-completion call and
//! one image call. `GeminiClient` implements it over the Gemini REST API;
//! `testing::ScriptedModel` replays canned responses.
//!
//! No retries. No streaming. No prompt logic (that lives in the normalizer).

mod error;
mod gemini;
mod model;
pub mod testing;
mod wire;

pub use error::GenAiError;
pub use gemini::{GeminiClient, GENERATE_CONTENT_PATH};
pub use model::{
    Citation, GenerativeModel, ImageRequest, ImageResponse, OutputMode, ResponsePart,
    TextRequest, TextResponse,
};
