//! Prompt templates.

/// Species profile prompt. Search grounding is on for this call, so the
/// JSON contract lives in the prompt rather than in a response schema.
pub fn species_profile(animal_name: &str) -> String {
    format!(
        r##"Generate detailed educational information about the animal: "{animal_name}".

You MUST return the result as a valid JSON object strictly following this structure:
{{
  "commonName": "string",
  "scientificName": "string",
  "habitat": "string",
  "diet": [
    {{"name": "Food Source 1", "percentage": 40, "color": "#hexcode"}},
    {{"name": "Food Source 2", "percentage": 30, "color": "#hexcode"}}
  ],
  "conservationStatus": "one of: Least Concern, Near Threatened, Vulnerable, Endangered, Critically Endangered, Extinct",
  "populationEstimate": "string (include source/year if possible)",
  "geographicRange": "string description of where they live",
  "funFacts": ["fact 1", "fact 2", "fact 3"],
  "description": "A short, child-friendly description (approx 50 words)."
}}

Diet percentages are numbers between 0 and 100.
Use the Google Search tool to find the most up-to-date conservation status and population numbers.
Do not include markdown formatting like ```json or ```. Just return the raw JSON string."##
    )
}

/// Quiz prompt. Sent in JSON output mode.
pub fn quiz(topic: &str) -> String {
    format!(
        r#"Create a fun, educational 3-question quiz about: {topic}.
Target audience: Kids aged 8-12.
Return strictly a JSON array of objects. No markdown.
Each question has exactly 4 options.
Structure:
[
  {{
    "question": "string",
    "options": ["string", "string", "string", "string"],
    "correctAnswer": number (0-3),
    "explanation": "string"
  }}
]"#
    )
}

/// Image edit instruction sent next to the source image.
pub fn image_edit(instruction: &str) -> String {
    format!("Edit this image: {instruction}. Make it look high quality and realistic.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_prompt_names_animal_and_fields() {
        let p = species_profile("Pangolin");
        assert!(p.contains("\"Pangolin\""));
        for field in ["commonName", "scientificName", "diet", "conservationStatus", "funFacts", "groundingUrls"] {
            if field == "groundingUrls" {
                // Filled from grounding metadata, never asked of the model
                assert!(!p.contains(field));
            } else {
                assert!(p.contains(field), "missing {}", field);
            }
        }
        assert!(p.contains(r##""color": "#hexcode""##));
        assert!(p.contains("Google Search"));
        assert!(p.contains("Do not include markdown"));
    }

    #[test]
    fn test_quiz_prompt() {
        let p = quiz("Rainforest frogs");
        assert!(p.contains("about: Rainforest frogs."));
        assert!(p.contains("3-question"));
        assert!(p.contains("correctAnswer"));
        assert!(p.contains("No markdown"));
    }

    #[test]
    fn test_image_edit_prompt() {
        assert_eq!(
            image_edit("add a sunset"),
            "Edit this image: add a sunset. Make it look high quality and realistic."
        );
    }
}
