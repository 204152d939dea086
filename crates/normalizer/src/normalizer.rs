//! The four normalizer operations.

use serde_json::Value;
use wildlens_core::{ImageArtifact, QuizQuestion, SpeciesProfile};
use wildlens_genai::{
    GenerativeModel, ImageRequest, ImageResponse, OutputMode, TextRequest,
};

use crate::fences::{decode_tolerant_as, JsonShape};
use crate::{prompts, validate, NormalizeError};

/// Topic used when a caller has no specific quiz topic.
pub const DEFAULT_QUIZ_TOPIC: &str = "Endangered Species and Habitat Conservation";

/// Model names and sampling knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizerOptions {
    pub text_model: String,
    pub edit_model: String,
    pub create_model: String,
    /// Species lookups only; low to keep the JSON shape stable
    pub species_temperature: f32,
    pub image_aspect_ratio: String,
    pub image_size: String,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            text_model: "gemini-2.5-flash".to_string(),
            edit_model: "gemini-2.5-flash-image".to_string(),
            create_model: "gemini-3-pro-image-preview".to_string(),
            species_temperature: 0.3,
            image_aspect_ratio: "4:3".to_string(),
            image_size: "1K".to_string(),
        }
    }
}

/// Builds prompts, calls the model, and hands back typed results.
///
/// Stateless between calls; share it freely across threads when `M` allows.
pub struct ResponseNormalizer<M> {
    model: M,
    options: NormalizerOptions,
}

impl<M: GenerativeModel> ResponseNormalizer<M> {
    pub fn new(model: M, options: NormalizerOptions) -> Self {
        Self { model, options }
    }

    pub fn with_defaults(model: M) -> Self {
        Self::new(model, NormalizerOptions::default())
    }

    pub fn options(&self) -> &NormalizerOptions {
        &self.options
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Look up a species with search grounding.
    ///
    /// Returns a fully populated profile or an error; never a partial object.
    /// `grounding_urls` lists the cited web sources in service order.
    pub fn fetch_species_profile(&self, animal_name: &str) -> Result<SpeciesProfile, NormalizeError> {
        let animal_name = animal_name.trim();
        if animal_name.is_empty() {
            return Err(NormalizeError::InvalidArgument("animal name is required".into()));
        }

        let request = TextRequest::new(&self.options.text_model, prompts::species_profile(animal_name))
            .with_search()
            .with_temperature(self.options.species_temperature);

        let response = self.model.generate_text(&request).map_err(|e| {
            log::error!("Species lookup for {:?} failed: {}", animal_name, e);
            NormalizeError::from(e)
        })?;

        let raw = if response.text.trim().is_empty() { "{}" } else { response.text.as_str() };

        let mut profile: SpeciesProfile = decode_tolerant_as(raw, JsonShape::Object).map_err(|e| {
            log::error!("Species response for {:?} is not a profile: {}", animal_name, e);
            NormalizeError::upstream(e.to_string(), raw)
        })?;

        validate::check_diet(&profile).map_err(|msg| NormalizeError::upstream(msg, raw))?;

        profile.grounding_urls = response
            .citations
            .into_iter()
            .filter_map(|c| c.uri)
            .filter(|u| !u.is_empty())
            .collect();

        log::debug!(
            "Species profile for {:?}: {} grounding url(s)",
            animal_name,
            profile.grounding_urls.len()
        );
        Ok(profile)
    }

    /// Generate a three-question quiz.
    ///
    /// Never fails: any upstream problem yields an empty list, which callers
    /// show as "could not load".
    pub fn fetch_quiz(&self, topic: &str) -> Vec<QuizQuestion> {
        let topic = topic.trim();
        if topic.is_empty() {
            log::warn!("Quiz requested without a topic");
            return Vec::new();
        }

        let request = TextRequest::new(&self.options.text_model, prompts::quiz(topic))
            .with_output(OutputMode::Json);

        let response = match self.model.generate_text(&request) {
            Ok(r) => r,
            Err(e) => {
                log::error!("Error generating quiz: {}", e);
                return Vec::new();
            }
        };

        let raw = if response.text.trim().is_empty() { "[]" } else { response.text.as_str() };

        match decode_tolerant_as::<Vec<Value>>(raw, JsonShape::Array) {
            Ok(items) => validate::well_formed_questions(items),
            Err(e) => {
                log::error!("Error decoding quiz: {}", e);
                Vec::new()
            }
        }
    }

    /// Edit an image given as base64 or a data URI.
    pub fn edit_image(&self, source: &str, instruction: &str) -> Result<ImageArtifact, NormalizeError> {
        let source = ImageArtifact::from_encoded(source)
            .map_err(|e| NormalizeError::InvalidArgument(format!("source image: {}", e)))?;
        self.edit_image_artifact(&source, instruction)
    }

    /// Edit an already decoded image.
    pub fn edit_image_artifact(
        &self,
        source: &ImageArtifact,
        instruction: &str,
    ) -> Result<ImageArtifact, NormalizeError> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(NormalizeError::InvalidArgument("edit instruction is required".into()));
        }
        if source.is_empty() {
            return Err(NormalizeError::InvalidArgument("source image is empty".into()));
        }

        let mut request = ImageRequest::new(&self.options.edit_model, prompts::image_edit(instruction));
        request.source = Some(source.clone());

        let response = self.model.generate_image(&request).map_err(|e| {
            log::error!("Error editing image: {}", e);
            NormalizeError::from(e)
        })?;
        first_image(response)
    }

    /// Generate an image from a text prompt.
    pub fn create_image(&self, prompt: &str) -> Result<ImageArtifact, NormalizeError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(NormalizeError::InvalidArgument("image prompt is required".into()));
        }

        let mut request = ImageRequest::new(&self.options.create_model, prompt);
        request.aspect_ratio = Some(self.options.image_aspect_ratio.clone());
        request.image_size = Some(self.options.image_size.clone());

        let response = self.model.generate_image(&request).map_err(|e| {
            log::error!("Error generating image: {}", e);
            NormalizeError::from(e)
        })?;
        first_image(response)
    }
}

/// First part carrying non-empty image data.
fn first_image(response: ImageResponse) -> Result<ImageArtifact, NormalizeError> {
    let image = response
        .parts
        .into_iter()
        .filter_map(|p| p.image)
        .find(|img| !img.is_empty());

    image.ok_or_else(|| {
        log::error!("Image model returned no image part");
        NormalizeError::NoImageProduced
    })
}
