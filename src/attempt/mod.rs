//! Attempt controller.
//!
//! Owns the ephemeral state of one in-progress test run: per-question
//! answer slots, answered flags, the cursor, and the phase machine. Nothing
//! here is persisted; the attempt is discarded on navigation away and
//! replaced wholesale when a different test is loaded.

use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{AnswerMap, AnswerValue, Question, QuestionKind, Test};

/// Lifecycle of an attempt.
///
/// `Loading` precedes the test being available; `Empty` is terminal for a
/// test without questions. Submission is reachable only through
/// `Reviewing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptPhase {
    Loading,
    Empty,
    Answering,
    Reviewing,
    Submitting,
    Submitted,
}

/// One in-progress run of a test.
pub struct Attempt {
    id: Uuid,
    test_id: String,
    questions: Vec<Question>,
    answers: AnswerMap,
    answered: HashMap<String, bool>,
    current_index: usize,
    phase: AttemptPhase,
}

impl Attempt {
    /// Placeholder while the target test is being fetched.
    pub fn loading(test_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            test_id: test_id.into(),
            questions: Vec::new(),
            answers: AnswerMap::new(),
            answered: HashMap::new(),
            current_index: 0,
            phase: AttemptPhase::Loading,
        }
    }

    /// Fresh attempt over a loaded test, every slot empty.
    pub fn new(test: &Test) -> Self {
        let mut answers = AnswerMap::new();
        let mut answered = HashMap::new();
        for question in &test.questions {
            answers.insert(question.id.clone(), AnswerValue::empty_for(&question.kind));
            answered.insert(question.id.clone(), false);
        }

        let phase = if test.questions.is_empty() {
            AttemptPhase::Empty
        } else {
            AttemptPhase::Answering
        };

        let attempt = Self {
            id: Uuid::new_v4(),
            test_id: test.id.clone(),
            questions: test.questions.clone(),
            answers,
            answered,
            current_index: 0,
            phase,
        };
        tracing::info!(attempt = %attempt.id, test = %attempt.test_id, questions = attempt.questions.len(), "attempt started");
        attempt
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    pub fn phase(&self) -> AttemptPhase {
        self.phase
    }

    /// Whether this attempt belongs to the given test id. A mismatch means
    /// the attempt is stale and must be replaced, never reused.
    pub fn matches(&self, test_id: &str) -> bool {
        self.test_id == test_id
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn answer_for(&self, question_id: &str) -> Option<&AnswerValue> {
        self.answers.get(question_id)
    }

    pub fn is_answered(&self, question_id: &str) -> bool {
        self.answered.get(question_id).copied().unwrap_or(false)
    }

    pub fn answered_count(&self) -> usize {
        self.answered.values().filter(|&&a| a).count()
    }

    pub fn all_answered(&self) -> bool {
        !self.questions.is_empty() && self.answered.values().all(|&a| a)
    }

    /// Completion percentage, rounded to the nearest integer: 1 of 3
    /// answered is 33, 2 of 3 is 67.
    pub fn progress_percent(&self) -> u8 {
        if self.questions.is_empty() {
            return 0;
        }
        let ratio = 100.0 * self.answered_count() as f64 / self.questions.len() as f64;
        ratio.round() as u8
    }

    /// A copy of the answer map, in submission shape.
    pub fn answers(&self) -> AnswerMap {
        self.answers.clone()
    }

    /// Overwrite one answer slot and recompute its answered flag by the
    /// per-type rule. This is the single write path for all answer input.
    pub fn answer(&mut self, question_id: &str, value: AnswerValue) {
        if !self.answers.contains_key(question_id) {
            return;
        }
        let answered = value.is_answered();
        self.answers.insert(question_id.to_string(), value);
        self.answered.insert(question_id.to_string(), answered);
    }

    /// Select an option of the current single-choice question.
    pub fn select_option(&mut self, option: &str) {
        let Some(question) = self.current_question() else { return };
        if !matches!(question.kind, QuestionKind::Single { .. }) {
            return;
        }
        let id = question.id.clone();
        self.answer(&id, AnswerValue::Single(option.to_string()));
    }

    /// Toggle an option of the current multiple-choice question. Unchecking
    /// the last selected option flips the slot back to unanswered.
    pub fn toggle_option(&mut self, option: &str) {
        let Some(question) = self.current_question() else { return };
        if !matches!(question.kind, QuestionKind::Multiple { .. }) {
            return;
        }
        let id = question.id.clone();

        let mut selections = match self.answers.get(&id) {
            Some(AnswerValue::Multiple(v)) => v.clone(),
            _ => Vec::new(),
        };
        if let Some(pos) = selections.iter().position(|s| s == option) {
            selections.remove(pos);
        } else {
            selections.push(option.to_string());
        }
        self.answer(&id, AnswerValue::Multiple(selections));
    }

    /// Replace the free-text answer of the current question.
    pub fn set_text(&mut self, text: String) {
        let Some(question) = self.current_question() else { return };
        if !matches!(question.kind, QuestionKind::Text { .. }) {
            return;
        }
        let id = question.id.clone();
        self.answer(&id, AnswerValue::Text(text));
    }

    /// Advance the cursor; from the last question this enters review.
    pub fn next(&mut self) {
        if self.phase != AttemptPhase::Answering {
            return;
        }
        if self.current_index + 1 >= self.questions.len() {
            self.phase = AttemptPhase::Reviewing;
        } else {
            self.current_index += 1;
        }
    }

    /// Step back, stopping at the first question.
    pub fn previous(&mut self) {
        if self.phase == AttemptPhase::Answering {
            self.current_index = self.current_index.saturating_sub(1);
        }
    }

    /// Move the cursor directly, leaving review if active.
    pub fn jump_to(&mut self, index: usize) {
        if index >= self.questions.len() {
            return;
        }
        if matches!(self.phase, AttemptPhase::Answering | AttemptPhase::Reviewing) {
            self.current_index = index;
            self.phase = AttemptPhase::Answering;
        }
    }

    pub fn begin_review(&mut self) {
        if self.phase == AttemptPhase::Answering {
            self.phase = AttemptPhase::Reviewing;
        }
    }

    /// Enter `Submitting`. Refused outside `Reviewing`, which is what makes
    /// a second submit while one is in flight impossible.
    pub fn begin_submit(&mut self) -> bool {
        if self.phase != AttemptPhase::Reviewing {
            return false;
        }
        self.phase = AttemptPhase::Submitting;
        tracing::info!(attempt = %self.id, test = %self.test_id, answered = self.answered_count(), "attempt submitted");
        true
    }

    /// Scoring failed: back to review, the store carries the error.
    pub fn submit_failed(&mut self) {
        if self.phase == AttemptPhase::Submitting {
            self.phase = AttemptPhase::Reviewing;
        }
    }

    /// Scoring succeeded: the attempt is done and will be discarded.
    pub fn submitted(&mut self) {
        if self.phase == AttemptPhase::Submitting {
            self.phase = AttemptPhase::Submitted;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_question_test() -> Test {
        Test {
            id: "t1".into(),
            title: "Mixed".into(),
            description: String::new(),
            tags: vec![],
            questions: vec![
                Question {
                    id: "q1".into(),
                    text: "Pick one".into(),
                    points: 1,
                    kind: QuestionKind::Single {
                        options: vec!["a".into(), "b".into()],
                        correct_answers: vec!["a".into()],
                    },
                },
                Question {
                    id: "q2".into(),
                    text: "Pick some".into(),
                    points: 2,
                    kind: QuestionKind::Multiple {
                        options: vec!["x".into(), "y".into(), "z".into()],
                        correct_answers: vec!["x".into(), "z".into()],
                    },
                },
                Question {
                    id: "q3".into(),
                    text: "Write it".into(),
                    points: 1,
                    kind: QuestionKind::Text { correct_answer_text: "ok".into() },
                },
            ],
            created_at: None,
        }
    }

    #[test]
    fn fresh_attempt_has_empty_slots() {
        let attempt = Attempt::new(&three_question_test());
        assert_eq!(attempt.phase(), AttemptPhase::Answering);
        assert_eq!(attempt.answered_count(), 0);
        assert_eq!(attempt.progress_percent(), 0);
        assert_eq!(
            attempt.answer_for("q2"),
            Some(&AnswerValue::Multiple(vec![]))
        );
    }

    #[test]
    fn empty_test_is_terminal() {
        let mut test = three_question_test();
        test.questions.clear();
        let attempt = Attempt::new(&test);
        assert_eq!(attempt.phase(), AttemptPhase::Empty);
        assert_eq!(attempt.progress_percent(), 0);
    }

    #[test]
    fn progress_rounds_to_nearest_integer() {
        let mut attempt = Attempt::new(&three_question_test());

        attempt.select_option("a");
        assert_eq!(attempt.progress_percent(), 33);

        attempt.jump_to(2);
        attempt.set_text("answer".into());
        assert_eq!(attempt.progress_percent(), 67);
    }

    #[test]
    fn unchecking_last_option_flips_answered_off() {
        let mut attempt = Attempt::new(&three_question_test());
        attempt.jump_to(1);

        attempt.toggle_option("y");
        assert!(attempt.is_answered("q2"));

        attempt.toggle_option("y");
        assert!(!attempt.is_answered("q2"));
        assert_eq!(attempt.answer_for("q2"), Some(&AnswerValue::Multiple(vec![])));
    }

    #[test]
    fn clearing_text_flips_answered_off() {
        let mut attempt = Attempt::new(&three_question_test());
        attempt.jump_to(2);

        attempt.set_text("draft".into());
        assert!(attempt.is_answered("q3"));

        attempt.set_text("   ".into());
        assert!(!attempt.is_answered("q3"));
    }

    #[test]
    fn next_from_last_question_enters_review() {
        let mut attempt = Attempt::new(&three_question_test());
        attempt.next();
        attempt.next();
        assert_eq!(attempt.current_index(), 2);

        attempt.next();
        assert_eq!(attempt.phase(), AttemptPhase::Reviewing);

        attempt.jump_to(0);
        assert_eq!(attempt.phase(), AttemptPhase::Answering);
        assert_eq!(attempt.current_index(), 0);
    }

    #[test]
    fn previous_floors_at_zero() {
        let mut attempt = Attempt::new(&three_question_test());
        attempt.previous();
        assert_eq!(attempt.current_index(), 0);
    }

    #[test]
    fn submit_only_from_review() {
        let mut attempt = Attempt::new(&three_question_test());
        assert!(!attempt.begin_submit());

        attempt.begin_review();
        assert!(attempt.begin_submit());
        assert_eq!(attempt.phase(), AttemptPhase::Submitting);

        // Already submitting: a second confirm is refused.
        assert!(!attempt.begin_submit());

        attempt.submit_failed();
        assert_eq!(attempt.phase(), AttemptPhase::Reviewing);
    }

    #[test]
    fn partial_attempt_still_submits() {
        let mut attempt = Attempt::new(&three_question_test());

        attempt.select_option("b");
        attempt.jump_to(2);
        attempt.set_text("something".into());

        assert_eq!(attempt.progress_percent(), 67);
        assert!(!attempt.is_answered("q2"));
        assert!(!attempt.all_answered());

        attempt.begin_review();
        assert!(attempt.begin_submit());
        attempt.submitted();
        assert_eq!(attempt.phase(), AttemptPhase::Submitted);

        let answers = attempt.answers();
        assert_eq!(answers["q1"], AnswerValue::Single("b".into()));
        assert_eq!(answers["q2"], AnswerValue::Multiple(vec![]));
    }

    #[test]
    fn new_attempt_for_other_test_starts_clean() {
        let mut attempt = Attempt::new(&three_question_test());
        attempt.select_option("a");
        assert!(attempt.is_answered("q1"));

        let mut other = three_question_test();
        other.id = "t2".into();
        assert!(!attempt.matches(&other.id));

        let fresh = Attempt::new(&other);
        assert!(!fresh.is_answered("q1"));
        assert_eq!(fresh.answered_count(), 0);
        assert_eq!(fresh.current_index(), 0);
    }
}
