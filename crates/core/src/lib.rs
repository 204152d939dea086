//! Core result shapes handed from the normalizer to callers.
//!
//! Every value here is created by one normalizer call and owned by the
//! caller afterwards. Nothing is cached or mutated in place.

pub mod image;
pub mod quiz;
pub mod species;

pub use image::{detect_mime, sniff_mime, ImageArtifact, ImageDecodeError, DEFAULT_IMAGE_MIME};
pub use quiz::{QuizQuestion, OPTIONS_PER_QUESTION};
pub use species::{ConservationStatus, DietItem, SpeciesProfile, UnknownStatus};
