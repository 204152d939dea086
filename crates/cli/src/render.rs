// Plain-text rendering for species profiles and quizzes.

use std::fmt::Write as _;

use wildlens_core::{QuizQuestion, SpeciesProfile};

const BAR_WIDTH: usize = 30;
const OPTION_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

pub fn species_profile(profile: &SpeciesProfile) -> String {
    let mut out = String::new();
    let status = profile.conservation_status;

    let _ = writeln!(out, "{} ({})", profile.common_name, profile.scientific_name);
    let _ = writeln!(out, "{}", "─".repeat(40));
    let _ = writeln!(
        out,
        "Status:      {}{}",
        status.label(),
        if status.is_threatened() { "  [threatened]" } else { "" }
    );
    let _ = writeln!(out, "Habitat:     {}", profile.habitat);
    let _ = writeln!(out, "Range:       {}", profile.geographic_range);
    let _ = writeln!(out, "Population:  {}", profile.population_estimate);

    if !profile.diet.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Diet:");
        let name_width = profile.diet.iter().map(|d| d.name.chars().count()).max().unwrap_or(0);
        for item in &profile.diet {
            let filled = ((item.percentage / 100.0) * BAR_WIDTH as f64).round() as usize;
            let _ = writeln!(
                out,
                "  {:<width$}  {:>5.1}%  {}",
                item.name,
                item.percentage,
                "█".repeat(filled.min(BAR_WIDTH)),
                width = name_width
            );
        }
        let total = profile.diet_total();
        if (total - 100.0).abs() > 0.5 {
            let _ = writeln!(out, "  (shares add up to {:.1}%)", total);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", profile.description);

    if !profile.fun_facts.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Fun facts:");
        for fact in &profile.fun_facts {
            let _ = writeln!(out, "  * {}", fact);
        }
    }

    if !profile.grounding_urls.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Sources:");
        for (i, url) in profile.grounding_urls.iter().enumerate() {
            let _ = writeln!(out, "  [{}] {}", i + 1, url);
        }
    }

    out
}

/// Numbered questions with lettered options. Answers are shown only when
/// `reveal` is set.
pub fn quiz(questions: &[QuizQuestion], reveal: bool) -> String {
    let mut out = String::new();
    for (n, q) in questions.iter().enumerate() {
        if n > 0 {
            let _ = writeln!(out);
        }
        let _ = writeln!(out, "{}. {}", n + 1, q.question);
        for (label, option) in OPTION_LABELS.iter().zip(&q.options) {
            let _ = writeln!(out, "   {}) {}", label, option);
        }
        if reveal {
            if let Some(label) = OPTION_LABELS.get(q.correct_answer) {
                let _ = writeln!(out, "   Answer: {}. {}", label, q.explanation);
            }
        }
    }
    out
}
