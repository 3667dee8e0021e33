//! Form state for the authoring screens.
//!
//! Validation here is client-side only: a failed check blocks submission
//! locally and never touches the store's shared `error` field.

use std::collections::HashMap;

use crate::models::{Question, QuestionDraft, QuestionKind, Test, TestDraft, TestPatch};

/// Editable kind selector of the question form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindChoice {
    Single,
    Multiple,
    Text,
}

impl KindChoice {
    pub fn label(self) -> &'static str {
        match self {
            Self::Single => "single choice",
            Self::Multiple => "multiple choice",
            Self::Text => "free text",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Single => Self::Multiple,
            Self::Multiple => Self::Text,
            Self::Text => Self::Single,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Self::Single => Self::Text,
            Self::Multiple => Self::Single,
            Self::Text => Self::Multiple,
        }
    }
}

/// Focusable fields of the test form, in cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestFocus {
    Title,
    Description,
    TagInput,
    Save,
}

/// Create/edit form for a test's metadata.
pub struct TestForm {
    /// Set when editing an existing test.
    pub test_id: Option<String>,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub tag_input: String,
    pub focus: TestFocus,
    pub errors: HashMap<&'static str, &'static str>,
}

impl TestForm {
    pub fn create() -> Self {
        Self {
            test_id: None,
            title: String::new(),
            description: String::new(),
            tags: Vec::new(),
            tag_input: String::new(),
            focus: TestFocus::Title,
            errors: HashMap::new(),
        }
    }

    pub fn edit(test: &Test) -> Self {
        Self {
            test_id: Some(test.id.clone()),
            title: test.title.clone(),
            description: test.description.clone(),
            tags: test.tags.clone(),
            tag_input: String::new(),
            focus: TestFocus::Title,
            errors: HashMap::new(),
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            TestFocus::Title => TestFocus::Description,
            TestFocus::Description => TestFocus::TagInput,
            TestFocus::TagInput => TestFocus::Save,
            TestFocus::Save => TestFocus::Title,
        };
    }

    pub fn focus_previous(&mut self) {
        self.focus = match self.focus {
            TestFocus::Title => TestFocus::Save,
            TestFocus::Description => TestFocus::Title,
            TestFocus::TagInput => TestFocus::Description,
            TestFocus::Save => TestFocus::TagInput,
        };
    }

    pub fn push_char(&mut self, c: char) {
        match self.focus {
            TestFocus::Title => self.title.push(c),
            TestFocus::Description => self.description.push(c),
            TestFocus::TagInput => self.tag_input.push(c),
            TestFocus::Save => {}
        }
    }

    pub fn pop_char(&mut self) {
        match self.focus {
            TestFocus::Title => {
                self.title.pop();
            }
            TestFocus::Description => {
                self.description.pop();
            }
            TestFocus::TagInput => {
                self.tag_input.pop();
            }
            TestFocus::Save => {}
        }
    }

    /// Enter commits the pending tag, submits from the save button, and
    /// otherwise advances focus. Returns true when submission is asked for.
    pub fn on_enter(&mut self) -> bool {
        match self.focus {
            TestFocus::TagInput => {
                self.commit_tag();
                false
            }
            TestFocus::Save => true,
            _ => {
                self.focus_next();
                false
            }
        }
    }

    pub fn is_editing(&self) -> bool {
        self.test_id.is_some()
    }

    /// Add the pending tag input: trimmed, deduplicated, ignored if blank.
    pub fn commit_tag(&mut self) {
        let tag = self.tag_input.trim().to_string();
        if !tag.is_empty() && !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self.tag_input.clear();
    }

    pub fn remove_last_tag(&mut self) {
        self.tags.pop();
    }

    pub fn validate(&mut self) -> bool {
        self.errors.clear();
        if self.title.trim().is_empty() {
            self.errors.insert("title", "title is required");
        }
        if self.description.trim().is_empty() {
            self.errors.insert("description", "description is required");
        }
        self.errors.is_empty()
    }

    pub fn as_draft(&self) -> TestDraft {
        TestDraft {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            tags: self.tags.clone(),
        }
    }

    pub fn as_patch(&self) -> TestPatch {
        TestPatch {
            title: Some(self.title.trim().to_string()),
            description: Some(self.description.trim().to_string()),
            tags: Some(self.tags.clone()),
        }
    }
}

/// Focusable fields of the question form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionFocus {
    Kind,
    Text,
    Points,
    Option(usize),
    CorrectText,
    Save,
}

/// Create/edit form for a question.
///
/// The kind is frozen while editing; authors create a new question to
/// change a question's type.
pub struct QuestionForm {
    pub test_id: String,
    /// Set when editing an existing question.
    pub question_id: Option<String>,
    pub kind: KindChoice,
    pub text: String,
    pub points: u32,
    pub options: Vec<String>,
    pub correct_answers: Vec<String>,
    pub correct_answer_text: String,
    pub focus: QuestionFocus,
    pub errors: HashMap<&'static str, &'static str>,
}

pub const MIN_OPTIONS: usize = 2;
pub const MAX_POINTS: u32 = 10;

impl QuestionForm {
    pub fn create(test_id: impl Into<String>) -> Self {
        Self {
            test_id: test_id.into(),
            question_id: None,
            kind: KindChoice::Single,
            text: String::new(),
            points: 1,
            options: vec![String::new(), String::new()],
            correct_answers: Vec::new(),
            correct_answer_text: String::new(),
            focus: QuestionFocus::Kind,
            errors: HashMap::new(),
        }
    }

    pub fn edit(test_id: impl Into<String>, question: &Question) -> Self {
        let (kind, options, correct_answers, correct_answer_text) = match &question.kind {
            QuestionKind::Single { options, correct_answers } => (
                KindChoice::Single,
                options.clone(),
                correct_answers.clone(),
                String::new(),
            ),
            QuestionKind::Multiple { options, correct_answers } => (
                KindChoice::Multiple,
                options.clone(),
                correct_answers.clone(),
                String::new(),
            ),
            QuestionKind::Text { correct_answer_text } => (
                KindChoice::Text,
                Vec::new(),
                Vec::new(),
                correct_answer_text.clone(),
            ),
        };

        Self {
            test_id: test_id.into(),
            question_id: Some(question.id.clone()),
            kind,
            text: question.text.clone(),
            points: question.points,
            options,
            correct_answers,
            correct_answer_text,
            focus: QuestionFocus::Text,
            errors: HashMap::new(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.question_id.is_some()
    }

    /// Focus ring: kind, text, points, then the type-specific answer
    /// fields, then save.
    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            QuestionFocus::Kind => QuestionFocus::Text,
            QuestionFocus::Text => QuestionFocus::Points,
            QuestionFocus::Points => match self.kind {
                KindChoice::Text => QuestionFocus::CorrectText,
                _ => QuestionFocus::Option(0),
            },
            QuestionFocus::Option(i) if i + 1 < self.options.len() => {
                QuestionFocus::Option(i + 1)
            }
            QuestionFocus::Option(_) => QuestionFocus::Save,
            QuestionFocus::CorrectText => QuestionFocus::Save,
            QuestionFocus::Save => QuestionFocus::Kind,
        };
    }

    pub fn focus_previous(&mut self) {
        self.focus = match self.focus {
            QuestionFocus::Kind => QuestionFocus::Save,
            QuestionFocus::Text => QuestionFocus::Kind,
            QuestionFocus::Points => QuestionFocus::Text,
            QuestionFocus::Option(0) => QuestionFocus::Points,
            QuestionFocus::Option(i) => QuestionFocus::Option(i - 1),
            QuestionFocus::CorrectText => QuestionFocus::Points,
            QuestionFocus::Save => match self.kind {
                KindChoice::Text => QuestionFocus::CorrectText,
                _ => QuestionFocus::Option(self.options.len().saturating_sub(1)),
            },
        };
    }

    /// Keep focus valid after options were added or removed, or after the
    /// kind changed under it.
    pub fn clamp_focus(&mut self) {
        match self.focus {
            QuestionFocus::Option(i) => {
                if self.kind == KindChoice::Text {
                    self.focus = QuestionFocus::CorrectText;
                } else if i >= self.options.len() {
                    self.focus = QuestionFocus::Option(self.options.len().saturating_sub(1));
                }
            }
            QuestionFocus::CorrectText if self.kind != KindChoice::Text => {
                self.focus = QuestionFocus::Option(0);
            }
            _ => {}
        }
    }

    pub fn focused_option(&self) -> Option<usize> {
        match self.focus {
            QuestionFocus::Option(i) => Some(i),
            _ => None,
        }
    }

    pub fn push_char(&mut self, c: char) {
        match self.focus {
            QuestionFocus::Text => self.text.push(c),
            QuestionFocus::Points => {
                if let Some(digit) = c.to_digit(10) {
                    self.set_points(digit);
                }
            }
            QuestionFocus::Option(i) => {
                if let Some(option) = self.options.get_mut(i) {
                    option.push(c);
                }
            }
            QuestionFocus::CorrectText => self.correct_answer_text.push(c),
            QuestionFocus::Kind | QuestionFocus::Save => {}
        }
    }

    pub fn pop_char(&mut self) {
        match self.focus {
            QuestionFocus::Text => {
                self.text.pop();
            }
            QuestionFocus::Option(i) => {
                if let Some(option) = self.options.get_mut(i) {
                    option.pop();
                }
            }
            QuestionFocus::CorrectText => {
                self.correct_answer_text.pop();
            }
            QuestionFocus::Kind | QuestionFocus::Points | QuestionFocus::Save => {}
        }
    }

    /// Left/right cycles the kind or nudges the points, depending on focus.
    pub fn on_left(&mut self) {
        match self.focus {
            QuestionFocus::Kind => {
                self.cycle_kind(false);
                self.clamp_focus();
            }
            QuestionFocus::Points => self.set_points(self.points.saturating_sub(1)),
            _ => {}
        }
    }

    pub fn on_right(&mut self) {
        match self.focus {
            QuestionFocus::Kind => {
                self.cycle_kind(true);
                self.clamp_focus();
            }
            QuestionFocus::Points => self.set_points(self.points + 1),
            _ => {}
        }
    }

    /// Enter marks the focused option correct, submits from the save
    /// button, and otherwise advances focus. Returns true on submission.
    pub fn on_enter(&mut self) -> bool {
        match self.focus {
            QuestionFocus::Option(i) => {
                self.mark_correct(i);
                false
            }
            QuestionFocus::Save => true,
            _ => {
                self.focus_next();
                false
            }
        }
    }

    /// Cycle the question type; ignored when editing.
    pub fn cycle_kind(&mut self, forward: bool) {
        if self.is_editing() {
            return;
        }
        self.kind = if forward { self.kind.next() } else { self.kind.previous() };
        if self.kind != KindChoice::Text && self.options.is_empty() {
            self.options = vec![String::new(), String::new()];
        }
    }

    pub fn set_points(&mut self, points: u32) {
        self.points = points.clamp(1, MAX_POINTS);
    }

    pub fn add_option(&mut self) {
        self.options.push(String::new());
    }

    /// Remove an option, reconciling the correct-answer set by exact text
    /// match. Renaming an option deliberately leaves a previously-correct
    /// answer orphaned; only removal cleans it up.
    pub fn remove_option(&mut self, index: usize) {
        if self.options.len() <= MIN_OPTIONS || index >= self.options.len() {
            return;
        }
        let removed = self.options.remove(index);
        self.correct_answers.retain(|a| a != &removed);
    }

    /// Mark an option correct. Single-choice keeps exactly one mark;
    /// multiple-choice toggles.
    pub fn mark_correct(&mut self, index: usize) {
        let Some(option) = self.options.get(index) else { return };
        if option.trim().is_empty() {
            return;
        }
        let option = option.clone();
        match self.kind {
            KindChoice::Single => self.correct_answers = vec![option],
            KindChoice::Multiple => {
                if let Some(pos) = self.correct_answers.iter().position(|a| a == &option) {
                    self.correct_answers.remove(pos);
                } else {
                    self.correct_answers.push(option);
                }
            }
            KindChoice::Text => {}
        }
    }

    pub fn is_correct(&self, index: usize) -> bool {
        self.options
            .get(index)
            .is_some_and(|o| self.correct_answers.iter().any(|a| a == o))
    }

    pub fn validate(&mut self) -> bool {
        self.errors.clear();

        if self.text.trim().is_empty() {
            self.errors.insert("text", "question text is required");
        }

        match self.kind {
            KindChoice::Single | KindChoice::Multiple => {
                if self.options.len() < MIN_OPTIONS {
                    self.errors.insert("options", "at least 2 options are required");
                } else if self.options.iter().any(|o| o.trim().is_empty()) {
                    self.errors.insert("options", "every option needs content");
                }

                if self.kind == KindChoice::Single && self.correct_answers.len() != 1 {
                    self.errors.insert("correct", "mark exactly one correct option");
                } else if self.kind == KindChoice::Multiple && self.correct_answers.is_empty() {
                    self.errors.insert("correct", "mark at least one correct option");
                }
            }
            KindChoice::Text => {
                if self.correct_answer_text.trim().is_empty() {
                    self.errors.insert("correct", "the correct answer is required");
                }
            }
        }

        self.errors.is_empty()
    }

    pub fn as_draft(&self) -> QuestionDraft {
        let kind = match self.kind {
            KindChoice::Single => QuestionKind::Single {
                options: self.options.clone(),
                correct_answers: self.correct_answers.clone(),
            },
            KindChoice::Multiple => QuestionKind::Multiple {
                options: self.options.clone(),
                correct_answers: self.correct_answers.clone(),
            },
            KindChoice::Text => QuestionKind::Text {
                correct_answer_text: self.correct_answer_text.trim().to_string(),
            },
        };
        QuestionDraft { text: self.text.trim().to_string(), points: self.points, kind }
    }
}
