use serde::{Deserialize, Serialize};

/// A single gradable item of a test.
///
/// The answer-bearing part lives in [`QuestionKind`], keyed by the wire
/// field `type`, so handling every question shape is enforced by `match`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    #[serde(alias = "_id")]
    pub id: String,
    pub text: String,
    pub points: u32,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// Type-specific question payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuestionKind {
    /// Exactly one option is expected to be correct.
    Single {
        options: Vec<String>,
        #[serde(rename = "correctAnswers")]
        correct_answers: Vec<String>,
    },

    /// One or more options are correct.
    Multiple {
        options: Vec<String>,
        #[serde(rename = "correctAnswers")]
        correct_answers: Vec<String>,
    },

    /// Free-text answer, compared server-side.
    Text {
        #[serde(rename = "correctAnswerText")]
        correct_answer_text: String,
    },
}

impl QuestionKind {
    /// Human-readable label for the question type.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Single { .. } => "single choice",
            Self::Multiple { .. } => "multiple choice",
            Self::Text { .. } => "free text",
        }
    }

    /// Options to render, empty for free-text questions.
    pub fn options(&self) -> &[String] {
        match self {
            Self::Single { options, .. } | Self::Multiple { options, .. } => options,
            Self::Text { .. } => &[],
        }
    }

    /// The marked correct answers, joined for display.
    pub fn correct_answer_display(&self) -> String {
        match self {
            Self::Single { correct_answers, .. } | Self::Multiple { correct_answers, .. } => {
                correct_answers.join(", ")
            }
            Self::Text { correct_answer_text } => correct_answer_text.clone(),
        }
    }
}

/// Payload for creating or updating a question.
///
/// Same wire shape as [`Question`] without the server-assigned id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub text: String,
    pub points: u32,
    #[serde(flatten)]
    pub kind: QuestionKind,
}
