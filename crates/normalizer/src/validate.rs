//! Boundary checks on decoded model output.

use serde_json::Value;
use wildlens_core::{QuizQuestion, SpeciesProfile};

/// Diet totals within this distance of 100 are not reported.
const DIET_TOTAL_SLACK: f64 = 0.5;

/// Reject out-of-range diet slices. A total other than 100 is logged, not
/// corrected.
pub(crate) fn check_diet(profile: &SpeciesProfile) -> Result<(), String> {
    for item in &profile.diet {
        if !item.percentage.is_finite() || !(0.0..=100.0).contains(&item.percentage) {
            return Err(format!(
                "diet item '{}' has percentage {} outside 0-100",
                item.name, item.percentage
            ));
        }
    }

    if !profile.diet.is_empty() {
        let total = profile.diet_total();
        if (total - 100.0).abs() > DIET_TOTAL_SLACK {
            log::warn!(
                "Diet percentages for {} sum to {} instead of 100",
                profile.common_name, total
            );
        }
    }

    Ok(())
}

/// Decode each element separately and keep the well-formed questions, in order.
pub(crate) fn well_formed_questions(items: Vec<Value>) -> Vec<QuizQuestion> {
    let total = items.len();
    let questions: Vec<QuizQuestion> = items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value::<QuizQuestion>(item) {
            Ok(q) if q.is_well_formed() => Some(q),
            Ok(q) => {
                log::warn!(
                    "Dropping quiz question {} ({} options, answer {})",
                    i, q.options.len(), q.correct_answer
                );
                None
            }
            Err(e) => {
                log::warn!("Dropping quiz question {}: {}", i, e);
                None
            }
        })
        .collect();

    if questions.len() < total {
        log::warn!("Kept {} of {} quiz questions", questions.len(), total);
    }
    questions
}
