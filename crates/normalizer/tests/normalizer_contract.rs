//! Contract tests for the four normalizer operations, driven by a scripted model.
//! Run with: cargo test -p wildlens-normalizer --test normalizer_contract

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::sync::Arc;
use wildlens_core::{ConservationStatus, ImageArtifact};
use wildlens_genai::testing::ScriptedModel;
use wildlens_genai::{GenAiError, OutputMode, ResponsePart};
use wildlens_normalizer::{NormalizeError, ResponseNormalizer, DEFAULT_QUIZ_TOPIC};

const PANGOLIN: &str = r##"{"commonName":"Pangolin","scientificName":"Manis","habitat":"Savanna","diet":[{"name":"Ants","percentage":80,"color":"#000"}],"conservationStatus":"Endangered","populationEstimate":"Unknown","geographicRange":"Africa, Asia","funFacts":["Scaly"],"description":"A scaly mammal."}"##;

const QUIZ: &str = r#"[
  {"question": "What do pangolins eat?", "options": ["Ants", "Fish", "Grass", "Berries"], "correctAnswer": 0, "explanation": "Mostly ants and termites."},
  {"question": "Where do snow leopards live?", "options": ["Desert", "Mountains", "Ocean", "Swamp"], "correctAnswer": 1, "explanation": "High in the mountains."},
  {"question": "Which is extinct?", "options": ["Dodo", "Tiger", "Panda", "Koala"], "correctAnswer": 0, "explanation": "The dodo died out in the 1600s."}
]"#;

fn normalizer(model: ScriptedModel) -> ResponseNormalizer<Arc<ScriptedModel>> {
    ResponseNormalizer::with_defaults(Arc::new(model))
}

// ── Species profile ─────────────────────────────────────────────────

#[test]
fn test_pangolin_fenced_with_grounding() {
    let fenced = format!("```json\n{}\n```", PANGOLIN);
    let n = normalizer(ScriptedModel::new().with_text(fenced, &["https://example.com"]));

    let profile = n.fetch_species_profile("Pangolin").unwrap();

    assert_eq!(profile.common_name, "Pangolin");
    assert_eq!(profile.scientific_name, "Manis");
    assert_eq!(profile.habitat, "Savanna");
    assert_eq!(profile.diet.len(), 1);
    assert_eq!(profile.diet[0].name, "Ants");
    assert_eq!(profile.diet[0].percentage, 80.0);
    assert_eq!(profile.diet[0].color, "#000");
    assert_eq!(profile.conservation_status, ConservationStatus::Endangered);
    assert_eq!(profile.population_estimate, "Unknown");
    assert_eq!(profile.geographic_range, "Africa, Asia");
    assert_eq!(profile.fun_facts, vec!["Scaly".to_string()]);
    assert_eq!(profile.description, "A scaly mammal.");
    assert_eq!(profile.grounding_urls, vec!["https://example.com".to_string()]);
}

#[test]
fn test_species_request_uses_search_and_low_temperature() {
    let model = Arc::new(ScriptedModel::new().with_text(PANGOLIN, &[]));
    let n = ResponseNormalizer::with_defaults(Arc::clone(&model));
    n.fetch_species_profile("  Pangolin ").unwrap();

    let requests = model.text_requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert!(req.search);
    assert_eq!(req.output, OutputMode::FreeText);
    assert_eq!(req.temperature, Some(0.3));
    assert_eq!(req.model, "gemini-2.5-flash");
    assert!(req.prompt.contains("\"Pangolin\""));
}

#[test]
fn test_species_without_grounding_has_empty_urls() {
    let n = normalizer(ScriptedModel::new().with_text(PANGOLIN, &[]));
    let profile = n.fetch_species_profile("Pangolin").unwrap();
    assert!(profile.grounding_urls.is_empty());
}

#[test]
fn test_grounding_order_kept_without_dedup() {
    let urls = ["https://b.example", "https://a.example", "https://b.example"];
    let n = normalizer(ScriptedModel::new().with_text(PANGOLIN, &urls));
    let profile = n.fetch_species_profile("Pangolin").unwrap();
    assert_eq!(profile.grounding_urls, urls.iter().map(|s| s.to_string()).collect::<Vec<_>>());
}

#[test]
fn test_species_empty_name_is_invalid_argument() {
    let model = Arc::new(ScriptedModel::new());
    let n = ResponseNormalizer::with_defaults(Arc::clone(&model));
    assert!(matches!(n.fetch_species_profile(""), Err(NormalizeError::InvalidArgument(_))));
    assert!(matches!(n.fetch_species_profile("   "), Err(NormalizeError::InvalidArgument(_))));
    assert_eq!(model.call_count(), 0);
}

#[test]
fn test_species_malformed_body_is_upstream_format() {
    let n = normalizer(ScriptedModel::new().with_text("Sorry, I can't help with that animal.", &[]));
    match n.fetch_species_profile("Pangolin") {
        Err(NormalizeError::UpstreamFormat { raw, .. }) => {
            assert!(raw.contains("Sorry"));
        }
        other => panic!("expected UpstreamFormat, got {:?}", other),
    }
}

#[test]
fn test_species_prose_with_citation_markers() {
    let body = format!(
        "Based on the search results [1], here is the profile:\n{}\nSee also [2].",
        PANGOLIN
    );
    let n = normalizer(ScriptedModel::new().with_text(body, &["https://example.com"]));

    let profile = n.fetch_species_profile("Pangolin").unwrap();
    assert_eq!(profile.common_name, "Pangolin");
    assert_eq!(profile.fun_facts, vec!["Scaly".to_string()]);
    assert_eq!(profile.grounding_urls, vec!["https://example.com".to_string()]);
}

#[test]
fn test_species_empty_body_is_upstream_format() {
    let n = normalizer(ScriptedModel::new().with_text("", &["https://example.com"]));
    assert!(matches!(
        n.fetch_species_profile("Pangolin"),
        Err(NormalizeError::UpstreamFormat { .. })
    ));
}

#[test]
fn test_species_partial_object_rejected() {
    let n = normalizer(ScriptedModel::new().with_text(r#"{"commonName": "Pangolin"}"#, &[]));
    assert!(matches!(
        n.fetch_species_profile("Pangolin"),
        Err(NormalizeError::UpstreamFormat { .. })
    ));
}

#[test]
fn test_species_out_of_range_diet_rejected() {
    let body = PANGOLIN.replace("\"percentage\":80", "\"percentage\":180");
    let n = normalizer(ScriptedModel::new().with_text(body, &[]));
    assert!(matches!(
        n.fetch_species_profile("Pangolin"),
        Err(NormalizeError::UpstreamFormat { .. })
    ));
}

#[test]
fn test_species_transport_error_propagates() {
    let n = normalizer(ScriptedModel::new().with_text_error(GenAiError::Network("connection refused".into())));
    assert_eq!(
        n.fetch_species_profile("Pangolin"),
        Err(NormalizeError::Transport(GenAiError::Network("connection refused".into())))
    );
}

#[test]
fn test_species_no_retry() {
    let model = Arc::new(ScriptedModel::new()
        .with_text_error(GenAiError::Http { status: 500, message: "x".into() })
        .with_text(PANGOLIN, &[]));
    let n = ResponseNormalizer::with_defaults(Arc::clone(&model));
    assert!(n.fetch_species_profile("Pangolin").is_err());
    assert_eq!(model.call_count(), 1);
}

// ── Quiz ────────────────────────────────────────────────────────────

#[test]
fn test_quiz_decodes_three_questions() {
    let model = Arc::new(ScriptedModel::new().with_text(QUIZ, &[]));
    let n = ResponseNormalizer::with_defaults(Arc::clone(&model));

    let quiz = n.fetch_quiz(DEFAULT_QUIZ_TOPIC);
    assert_eq!(quiz.len(), 3);
    for q in &quiz {
        assert_eq!(q.options.len(), 4);
        assert!(q.correct_answer <= 3);
    }
    assert_eq!(quiz[1].correct_option(), Some("Mountains"));

    let req = &model.text_requests()[0];
    assert_eq!(req.output, OutputMode::Json);
    assert!(!req.search);
    assert!(req.prompt.contains(DEFAULT_QUIZ_TOPIC));
}

#[test]
fn test_quiz_transport_error_is_empty() {
    let n = normalizer(ScriptedModel::new().with_text_error(GenAiError::Http { status: 429, message: "quota".into() }));
    assert!(n.fetch_quiz("Sharks").is_empty());
}

#[test]
fn test_quiz_garbage_is_empty() {
    let n = normalizer(ScriptedModel::new().with_text("here are some questions: none", &[]));
    assert!(n.fetch_quiz("Sharks").is_empty());
}

#[test]
fn test_quiz_object_instead_of_array_is_empty() {
    let n = normalizer(ScriptedModel::new().with_text(r#"{"question": "q"}"#, &[]));
    assert!(n.fetch_quiz("Sharks").is_empty());
}

#[test]
fn test_quiz_empty_body_is_empty() {
    let n = normalizer(ScriptedModel::new().with_text("", &[]));
    assert!(n.fetch_quiz("Sharks").is_empty());
}

#[test]
fn test_quiz_drops_malformed_questions() {
    let body = r#"```json
[
  {"question": "good", "options": ["a","b","c","d"], "correctAnswer": 2, "explanation": "e"},
  {"question": "bad index", "options": ["a","b","c","d"], "correctAnswer": 7, "explanation": "e"},
  {"question": "two options", "options": ["a","b"], "correctAnswer": 0, "explanation": "e"}
]
```"#;
    let n = normalizer(ScriptedModel::new().with_text(body, &[]));
    let quiz = n.fetch_quiz("Owls");
    assert_eq!(quiz.len(), 1);
    assert_eq!(quiz[0].question, "good");
}

#[test]
fn test_quiz_empty_topic_makes_no_call() {
    let model = Arc::new(ScriptedModel::new().with_text(QUIZ, &[]));
    let n = ResponseNormalizer::with_defaults(Arc::clone(&model));
    assert!(n.fetch_quiz("  ").is_empty());
    assert_eq!(model.call_count(), 0);
}

// ── Images ──────────────────────────────────────────────────────────

fn png(bytes: &[u8]) -> ImageArtifact {
    ImageArtifact::from_bytes("image/png", bytes.to_vec())
}

#[test]
fn test_create_image_returns_first_image() {
    let model = Arc::new(ScriptedModel::new().with_image_parts(vec![
        ResponsePart { text: Some("Here is your fox".into()), image: None },
        ResponsePart { text: None, image: Some(png(&[1, 2, 3])) },
    ]));
    let n = ResponseNormalizer::with_defaults(Arc::clone(&model));

    let image = n.create_image("a red fox").unwrap();
    assert_eq!(image.bytes(), &[1, 2, 3]);
    assert_eq!(image.to_data_uri(), "data:image/png;base64,AQID");

    let req = &model.image_requests()[0];
    assert_eq!(req.model, "gemini-3-pro-image-preview");
    assert_eq!(req.prompt, "a red fox");
    assert!(req.source.is_none());
    assert_eq!(req.aspect_ratio.as_deref(), Some("4:3"));
    assert_eq!(req.image_size.as_deref(), Some("1K"));
}

#[test]
fn test_create_image_without_image_part() {
    let n = normalizer(ScriptedModel::new().with_image_parts(vec![
        ResponsePart { text: Some("I can't draw that.".into()), image: None },
    ]));
    assert_eq!(n.create_image("a red fox"), Err(NormalizeError::NoImageProduced));
}

#[test]
fn test_create_image_empty_prompt() {
    let n = normalizer(ScriptedModel::new());
    assert!(matches!(n.create_image(" "), Err(NormalizeError::InvalidArgument(_))));
}

#[test]
fn test_create_image_transport_error() {
    let n = normalizer(ScriptedModel::new().with_image_error(GenAiError::Blocked("SAFETY".into())));
    assert_eq!(
        n.create_image("a red fox"),
        Err(NormalizeError::Transport(GenAiError::Blocked("SAFETY".into())))
    );
}

#[test]
fn test_edit_image_strips_data_uri_header() {
    let model = Arc::new(ScriptedModel::new().with_image(png(&[9, 9])));
    let n = ResponseNormalizer::with_defaults(Arc::clone(&model));

    let source = format!("data:image/jpeg;base64,{}", STANDARD.encode([0xFF, 0xD8, 0xFF]));
    let edited = n.edit_image(&source, "add a sunset").unwrap();
    assert_eq!(edited.bytes(), &[9, 9]);

    let req = &model.image_requests()[0];
    assert_eq!(req.model, "gemini-2.5-flash-image");
    assert_eq!(req.prompt, "Edit this image: add a sunset. Make it look high quality and realistic.");
    let sent = req.source.as_ref().unwrap();
    assert_eq!(sent.bytes(), &[0xFF, 0xD8, 0xFF]);
    assert_eq!(sent.mime_type(), "image/jpeg");
    assert!(req.aspect_ratio.is_none());
}

#[test]
fn test_edit_image_bare_base64() {
    let model = Arc::new(ScriptedModel::new().with_image(png(&[1])));
    let n = ResponseNormalizer::with_defaults(Arc::clone(&model));
    n.edit_image(&STANDARD.encode(b"pixels"), "make it snow").unwrap();
    assert_eq!(model.image_requests()[0].source.as_ref().unwrap().bytes(), b"pixels");
}

#[test]
fn test_edit_image_invalid_inputs() {
    let model = Arc::new(ScriptedModel::new());
    let n = ResponseNormalizer::with_defaults(Arc::clone(&model));
    let source = STANDARD.encode(b"pixels");

    assert!(matches!(n.edit_image(&source, ""), Err(NormalizeError::InvalidArgument(_))));
    assert!(matches!(n.edit_image("", "add a hat"), Err(NormalizeError::InvalidArgument(_))));
    assert!(matches!(n.edit_image("@@not-base64@@", "add a hat"), Err(NormalizeError::InvalidArgument(_))));
    assert_eq!(model.call_count(), 0);
}

#[test]
fn test_edit_image_no_image() {
    let n = normalizer(ScriptedModel::new().with_image_parts(vec![]));
    assert_eq!(
        n.edit_image(&STANDARD.encode(b"pixels"), "add a hat"),
        Err(NormalizeError::NoImageProduced)
    );
}

// ── Concurrency ─────────────────────────────────────────────────────

#[test]
fn test_concurrent_lookups_share_normalizer() {
    let model = ScriptedModel::new();
    for _ in 0..4 {
        model.push_text(Ok(wildlens_genai::TextResponse { text: PANGOLIN.to_string(), citations: vec![] }));
    }
    let n = Arc::new(normalizer(model));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let n = Arc::clone(&n);
            std::thread::spawn(move || n.fetch_species_profile("Pangolin"))
        })
        .collect();

    for h in handles {
        assert_eq!(h.join().unwrap().unwrap().common_name, "Pangolin");
    }
    assert_eq!(n.model().call_count(), 4);
}
