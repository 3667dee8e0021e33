use std::sync::{Arc, Weak};

use thiserror::Error;

use crate::api::{ApiClient, QuizApi};

use super::TestStore;

/// Raised when a [`StoreContext`] outlives the store it points at.
#[derive(Debug, Error)]
#[error("test store is no longer available")]
pub struct ContextUnavailableError;

/// Weak handle to the store for spawned tasks.
///
/// The store is owned by the application root. A task that completes after
/// shutdown gets [`ContextUnavailableError`] from [`get`](Self::get) and
/// must drop its result, instead of silently extending the store's life.
pub struct StoreContext<A: QuizApi = ApiClient> {
    inner: Weak<TestStore<A>>,
}

impl<A: QuizApi> StoreContext<A> {
    pub(super) fn new(inner: Weak<TestStore<A>>) -> Self {
        Self { inner }
    }

    pub fn get(&self) -> Result<Arc<TestStore<A>>, ContextUnavailableError> {
        self.inner.upgrade().ok_or(ContextUnavailableError)
    }
}

impl<A: QuizApi> Clone for StoreContext<A> {
    fn clone(&self) -> Self {
        Self { inner: Weak::clone(&self.inner) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::models::*;
    use async_trait::async_trait;

    struct NoopApi;

    #[async_trait]
    impl QuizApi for NoopApi {
        async fn list_tests(&self, _: &TestListQuery) -> Result<TestPage, ApiError> {
            unimplemented!()
        }
        async fn get_test(&self, _: &str) -> Result<Test, ApiError> {
            unimplemented!()
        }
        async fn create_test(&self, _: &TestDraft) -> Result<Test, ApiError> {
            unimplemented!()
        }
        async fn update_test(&self, _: &str, _: &TestPatch) -> Result<Test, ApiError> {
            unimplemented!()
        }
        async fn delete_test(&self, _: &str) -> Result<(), ApiError> {
            unimplemented!()
        }
        async fn check_answers(&self, _: &str, _: &AnswerMap) -> Result<ScoringResult, ApiError> {
            unimplemented!()
        }
        async fn add_question(&self, _: &str, _: &QuestionDraft) -> Result<Question, ApiError> {
            unimplemented!()
        }
        async fn update_question(&self, _: &str, _: &QuestionDraft) -> Result<Question, ApiError> {
            unimplemented!()
        }
        async fn delete_question(&self, _: &str) -> Result<(), ApiError> {
            unimplemented!()
        }
    }

    #[test]
    fn context_fails_loudly_after_store_drop() {
        let store = TestStore::new(NoopApi);
        let ctx = store.context();
        assert!(ctx.get().is_ok());

        drop(store);
        assert!(ctx.get().is_err());
    }
}
