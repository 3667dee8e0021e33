use std::ops::Deref;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::api::{ApiClient, ApiError, QuizApi};
use crate::models::{
    AnswerMap, Pagination, Question, QuestionDraft, ScoringResult, Test, TestDraft, TestListQuery,
    TestPage, TestPatch,
};

use super::state::{with_question_appended, with_question_replaced, without_question};
use super::{StoreContext, StoreState};

/// Read-only view of the store state.
///
/// Holds the store lock; keep it short-lived.
pub struct StateSnapshot<'a>(MutexGuard<'a, StoreState>);

impl Deref for StateSnapshot<'_> {
    type Target = StoreState;

    fn deref(&self) -> &StoreState {
        &self.0
    }
}

/// The shared test store.
///
/// Generic over the API so tests can run against an in-memory backend.
/// The internal mutex is never held across a network await: operations
/// lock to flip `loading`, release, perform the request, then lock again
/// to apply the outcome. The UI therefore observes `loading` mid-flight,
/// which is what gates double submission.
pub struct TestStore<A: QuizApi = ApiClient> {
    api: A,
    state: Mutex<StoreState>,
}

impl<A: QuizApi> TestStore<A> {
    pub fn new(api: A) -> Arc<Self> {
        Arc::new(Self { api, state: Mutex::new(StoreState::default()) })
    }

    /// Weak handle for spawned tasks.
    pub fn context(self: &Arc<Self>) -> StoreContext<A> {
        StoreContext::new(Arc::downgrade(self))
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Current state, read-only.
    pub async fn state(&self) -> StateSnapshot<'_> {
        StateSnapshot(self.state.lock().await)
    }

    async fn begin(&self, op: &'static str) {
        tracing::info!(op, "store operation");
        let mut state = self.state.lock().await;
        state.loading = true;
        state.error = None;
    }

    async fn settle(&self) -> MutexGuard<'_, StoreState> {
        let mut state = self.state.lock().await;
        state.loading = false;
        state
    }

    fn fail(state: &mut StoreState, op: &'static str, err: &ApiError) {
        tracing::error!(op, error = %err, "store operation failed");
        state.error = Some(err.to_string());
    }

    /// Replace the cached catalog page with the server's.
    ///
    /// On any failure, including a response missing the expected shape,
    /// the prior catalog stays untouched.
    pub async fn fetch_tests(&self, query: TestListQuery) -> Option<TestPage> {
        self.begin("fetch_tests").await;
        let result = self.api.list_tests(&query).await;
        let mut state = self.settle().await;
        match result {
            Ok(page) => {
                state.tests = page.tests.clone();
                state.pagination = Pagination::from(&page);
                Some(page)
            }
            Err(err) => {
                Self::fail(&mut state, "fetch_tests", &err);
                None
            }
        }
    }

    /// Load one test into `current_test`.
    pub async fn fetch_test_by_id(&self, id: &str) -> Option<Test> {
        self.begin("fetch_test_by_id").await;
        let result = self.api.get_test(id).await;
        let mut state = self.settle().await;
        match result {
            Ok(test) => {
                state.current_test = Some(test.clone());
                Some(test)
            }
            Err(err) => {
                Self::fail(&mut state, "fetch_test_by_id", &err);
                None
            }
        }
    }

    /// Persist a new test and append it to the cached catalog. Returns the
    /// created entity so the caller can navigate to its id.
    pub async fn create_test(&self, draft: TestDraft) -> Option<Test> {
        self.begin("create_test").await;
        let result = self.api.create_test(&draft).await;
        let mut state = self.settle().await;
        match result {
            Ok(test) => {
                state.tests.push(test.clone());
                Some(test)
            }
            Err(err) => {
                Self::fail(&mut state, "create_test", &err);
                None
            }
        }
    }

    /// Persist changes to a test, patching the catalog entry and, when it
    /// is the loaded one, `current_test`.
    pub async fn update_test(&self, id: &str, patch: TestPatch) -> Option<Test> {
        self.begin("update_test").await;
        let result = self.api.update_test(id, &patch).await;
        let mut state = self.settle().await;
        match result {
            Ok(updated) => {
                for slot in &mut state.tests {
                    if slot.id == id {
                        *slot = updated.clone();
                    }
                }
                if state.current_test.as_ref().is_some_and(|t| t.id == id) {
                    state.current_test = Some(updated.clone());
                }
                Some(updated)
            }
            Err(err) => {
                Self::fail(&mut state, "update_test", &err);
                None
            }
        }
    }

    /// Remove a test from the backend and the cached catalog; clears
    /// `current_test` if it was the deleted one.
    pub async fn delete_test(&self, id: &str) -> bool {
        self.begin("delete_test").await;
        let result = self.api.delete_test(id).await;
        let mut state = self.settle().await;
        match result {
            Ok(()) => {
                state.tests.retain(|t| t.id != id);
                if state.current_test.as_ref().is_some_and(|t| t.id == id) {
                    state.current_test = None;
                }
                true
            }
            Err(err) => {
                Self::fail(&mut state, "delete_test", &err);
                false
            }
        }
    }

    /// Add a question on the backend, then append it to the cached
    /// `current_test` if, and only if, that is the parent test.
    pub async fn add_question(&self, test_id: &str, draft: QuestionDraft) -> Option<Question> {
        self.begin("add_question").await;
        let result = self.api.add_question(test_id, &draft).await;
        let mut state = self.settle().await;
        match result {
            Ok(question) => {
                if let Some(current) = &state.current_test {
                    if current.id == test_id {
                        state.current_test =
                            Some(with_question_appended(current, question.clone()));
                    }
                }
                Some(question)
            }
            Err(err) => {
                Self::fail(&mut state, "add_question", &err);
                None
            }
        }
    }

    /// Update a question on the backend and replace it in the cached
    /// `current_test` when that test contains it.
    pub async fn update_question(&self, id: &str, draft: QuestionDraft) -> Option<Question> {
        self.begin("update_question").await;
        let result = self.api.update_question(id, &draft).await;
        let mut state = self.settle().await;
        match result {
            Ok(question) => {
                if let Some(current) = &state.current_test {
                    if current.question_by_id(&question.id).is_some() {
                        state.current_test =
                            Some(with_question_replaced(current, question.clone()));
                    }
                }
                Some(question)
            }
            Err(err) => {
                Self::fail(&mut state, "update_question", &err);
                None
            }
        }
    }

    /// Delete a question on the backend and drop it from the cached
    /// `current_test` when present.
    pub async fn delete_question(&self, id: &str) -> bool {
        self.begin("delete_question").await;
        let result = self.api.delete_question(id).await;
        let mut state = self.settle().await;
        match result {
            Ok(()) => {
                if let Some(current) = &state.current_test {
                    if current.question_by_id(id).is_some() {
                        state.current_test = Some(without_question(current, id));
                    }
                }
                true
            }
            Err(err) => {
                Self::fail(&mut state, "delete_question", &err);
                false
            }
        }
    }

    /// Submit an attempt's answers for scoring.
    ///
    /// The submitted map is stored up front and re-attached to the result,
    /// since the backend's response may omit the echo.
    pub async fn check_answers(&self, test_id: &str, answers: AnswerMap) -> Option<ScoringResult> {
        self.begin("check_answers").await;
        {
            let mut state = self.state.lock().await;
            state.answers = answers.clone();
        }
        let result = self.api.check_answers(test_id, &answers).await;
        let mut state = self.settle().await;
        match result {
            Ok(mut scoring) => {
                scoring.answers = answers;
                state.results = Some(scoring.clone());
                Some(scoring)
            }
            Err(err) => {
                Self::fail(&mut state, "check_answers", &err);
                None
            }
        }
    }

    /// Discard the current scoring result and the last-submitted answers.
    pub async fn clear_results(&self) {
        let mut state = self.state.lock().await;
        state.results = None;
        state.answers = AnswerMap::new();
    }

    pub async fn clear_error(&self) {
        let mut state = self.state.lock().await;
        state.error = None;
    }
}
