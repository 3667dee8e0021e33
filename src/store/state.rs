use crate::models::{AnswerMap, Pagination, Question, ScoringResult, Test};

/// Snapshot of everything the store owns.
///
/// Mutated only by the store's operations; consumers read it through an
/// immutable guard.
#[derive(Default)]
pub struct StoreState {
    /// Cached catalog page.
    pub tests: Vec<Test>,
    /// Test currently loaded for viewing, editing, or taking.
    pub current_test: Option<Test>,
    /// Paging counters of the cached catalog page.
    pub pagination: Pagination,
    /// Verdict of the last submitted attempt, until cleared.
    pub results: Option<ScoringResult>,
    /// Answers of the last submitted attempt.
    pub answers: AnswerMap,
    /// An operation is in flight.
    pub loading: bool,
    /// Human-readable failure of the last operation, if any.
    pub error: Option<String>,
}

/// Reducer-style transitions over a `Test` snapshot.
///
/// Cache patching goes through these instead of mutating in place, so the
/// "only the loaded test's cache is patched" rule stays a single guarded
/// call site in the store.
pub(super) fn with_question_appended(test: &Test, question: Question) -> Test {
    let mut next = test.clone();
    next.questions.push(question);
    next
}

pub(super) fn with_question_replaced(test: &Test, question: Question) -> Test {
    let mut next = test.clone();
    for slot in &mut next.questions {
        if slot.id == question.id {
            *slot = question;
            break;
        }
    }
    next
}

pub(super) fn without_question(test: &Test, question_id: &str) -> Test {
    let mut next = test.clone();
    next.questions.retain(|q| q.id != question_id);
    next
}
