use serde::{Deserialize, Serialize};

/// Every question carries exactly this many options.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// One multiple-choice quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`
    pub correct_answer: usize,
    pub explanation: String,
}

impl QuizQuestion {
    /// True when the question has four options and the answer indexes one of them.
    pub fn is_well_formed(&self) -> bool {
        self.options.len() == OPTIONS_PER_QUESTION && self.correct_answer < self.options.len()
    }

    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_answer).map(String::as_str)
    }

    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct_answer
    }
}
