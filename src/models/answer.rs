use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::QuestionKind;

/// Answers keyed by question id, as submitted to the scoring endpoint.
pub type AnswerMap = HashMap<String, AnswerValue>;

/// The shape of one answer slot, mirroring the question type.
///
/// On the wire this is untagged: a plain string for single-choice and
/// free-text answers, an array of strings for multiple-choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// Selected options of a multiple-choice question.
    Multiple(Vec<String>),
    /// Selected option of a single-choice question.
    Single(String),
    /// Free-text input.
    Text(String),
}

impl AnswerValue {
    /// The empty slot for a question of the given kind.
    pub fn empty_for(kind: &QuestionKind) -> Self {
        match kind {
            QuestionKind::Single { .. } => Self::Single(String::new()),
            QuestionKind::Multiple { .. } => Self::Multiple(Vec::new()),
            QuestionKind::Text { .. } => Self::Text(String::new()),
        }
    }

    /// Whether this slot counts as answered.
    ///
    /// Single: non-empty selection. Multiple: at least one option still
    /// checked. Text: non-empty after trimming.
    pub fn is_answered(&self) -> bool {
        match self {
            Self::Single(s) => !s.is_empty(),
            Self::Multiple(v) => !v.is_empty(),
            Self::Text(s) => !s.trim().is_empty(),
        }
    }

    /// String content, for single/text slots.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Single(s) | Self::Text(s) => Some(s),
            Self::Multiple(_) => None,
        }
    }

    /// Selected options, for multiple-choice slots.
    pub fn selections(&self) -> Option<&[String]> {
        match self {
            Self::Multiple(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_untagged() {
        let single = AnswerValue::Single("Paris".into());
        assert_eq!(serde_json::to_string(&single).unwrap(), r#""Paris""#);

        let multiple = AnswerValue::Multiple(vec!["a".into(), "b".into()]);
        assert_eq!(serde_json::to_string(&multiple).unwrap(), r#"["a","b"]"#);
    }

    #[test]
    fn answered_rules_per_kind() {
        assert!(!AnswerValue::Single(String::new()).is_answered());
        assert!(AnswerValue::Single("x".into()).is_answered());

        assert!(!AnswerValue::Multiple(vec![]).is_answered());
        assert!(AnswerValue::Multiple(vec!["x".into()]).is_answered());

        assert!(!AnswerValue::Text("   ".into()).is_answered());
        assert!(AnswerValue::Text(" answer ".into()).is_answered());
    }
}
