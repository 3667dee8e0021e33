use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::models::{
    AnswerMap, Question, QuestionDraft, ScoringResult, Test, TestDraft, TestListQuery, TestPage,
    TestPatch,
};

use super::ApiError;

/// Base URL used when neither the CLI flag nor the environment sets one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// The backend surface the store depends on.
///
/// `ApiClient` is the production implementation; tests substitute an
/// in-memory one.
#[async_trait]
pub trait QuizApi: Send + Sync {
    async fn list_tests(&self, query: &TestListQuery) -> Result<TestPage, ApiError>;
    async fn get_test(&self, id: &str) -> Result<Test, ApiError>;
    async fn create_test(&self, draft: &TestDraft) -> Result<Test, ApiError>;
    async fn update_test(&self, id: &str, patch: &TestPatch) -> Result<Test, ApiError>;
    async fn delete_test(&self, id: &str) -> Result<(), ApiError>;
    async fn check_answers(
        &self,
        test_id: &str,
        answers: &AnswerMap,
    ) -> Result<ScoringResult, ApiError>;
    async fn add_question(
        &self,
        test_id: &str,
        draft: &QuestionDraft,
    ) -> Result<Question, ApiError>;
    async fn update_question(&self, id: &str, draft: &QuestionDraft)
        -> Result<Question, ApiError>;
    async fn delete_question(&self, id: &str) -> Result<(), ApiError>;
}

/// HTTP client for the quiz backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http: reqwest::Client::new(), base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&impl Serialize>,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, ?query, "api request");

        let mut req = self.http.request(method.clone(), &url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        let decoded = decode(status, &bytes);
        match &decoded {
            Ok(_) => tracing::debug!(%method, %url, %status, "api response"),
            Err(err) => tracing::warn!(%method, %url, %status, error = %err, "api failure"),
        }
        decoded
    }

    /// DELETE endpoints answer 204 with no body; anything else 2xx is
    /// accepted too.
    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(method = "DELETE", %url, "api request");

        let response = self.http.delete(&url).send().await?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT || status.is_success() {
            tracing::debug!(method = "DELETE", %url, %status, "api response");
            return Ok(());
        }

        let bytes = response.bytes().await?;
        let err = decode::<serde_json::Value>(status, &bytes)
            .err()
            .unwrap_or(ApiError::Application {
                status: status.as_u16(),
                message: GENERIC_FAILURE.to_string(),
            });
        tracing::warn!(method = "DELETE", %url, %status, error = %err, "api failure");
        Err(err)
    }
}

const NO_BODY: Option<&()> = None;
const GENERIC_FAILURE: &str = "something went wrong";

/// Turn a `(status, body)` pair into a typed result.
///
/// A body that is not JSON is a format error regardless of status; a
/// non-2xx JSON body yields an application error with its `message`.
fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, ApiError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(ApiError::Format)?;

    if !status.is_success() {
        let message = value
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or(GENERIC_FAILURE)
            .to_string();
        return Err(ApiError::Application { status: status.as_u16(), message });
    }

    serde_json::from_value(value).map_err(ApiError::Format)
}

#[async_trait]
impl QuizApi for ApiClient {
    async fn list_tests(&self, query: &TestListQuery) -> Result<TestPage, ApiError> {
        self.request(Method::GET, "/tests", &query.as_pairs(), NO_BODY)
            .await
    }

    async fn get_test(&self, id: &str) -> Result<Test, ApiError> {
        self.request(Method::GET, &format!("/tests/{id}"), &[], NO_BODY)
            .await
    }

    async fn create_test(&self, draft: &TestDraft) -> Result<Test, ApiError> {
        self.request(Method::POST, "/tests", &[], Some(draft)).await
    }

    async fn update_test(&self, id: &str, patch: &TestPatch) -> Result<Test, ApiError> {
        self.request(Method::PUT, &format!("/tests/{id}"), &[], Some(patch))
            .await
    }

    async fn delete_test(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/tests/{id}")).await
    }

    async fn check_answers(
        &self,
        test_id: &str,
        answers: &AnswerMap,
    ) -> Result<ScoringResult, ApiError> {
        #[derive(Serialize)]
        struct CheckBody<'a> {
            answers: &'a AnswerMap,
        }
        self.request(
            Method::POST,
            &format!("/tests/{test_id}/check"),
            &[],
            Some(&CheckBody { answers }),
        )
        .await
    }

    async fn add_question(
        &self,
        test_id: &str,
        draft: &QuestionDraft,
    ) -> Result<Question, ApiError> {
        self.request(
            Method::POST,
            &format!("/tests/{test_id}/questions"),
            &[],
            Some(draft),
        )
        .await
    }

    async fn update_question(
        &self,
        id: &str,
        draft: &QuestionDraft,
    ) -> Result<Question, ApiError> {
        self.request(Method::PUT, &format!("/questions/{id}"), &[], Some(draft))
            .await
    }

    async fn delete_question(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/questions/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_non_json_bodies() {
        let err = decode::<TestPage>(StatusCode::OK, b"<html>oops</html>").unwrap_err();
        assert!(matches!(err, ApiError::Format(_)));
    }

    #[test]
    fn decode_surfaces_backend_message() {
        let err = decode::<Test>(
            StatusCode::NOT_FOUND,
            br#"{"message": "test not found"}"#,
        )
        .unwrap_err();
        match err {
            ApiError::Application { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "test not found");
            }
            other => panic!("expected application error, got {other:?}"),
        }
    }

    #[test]
    fn decode_falls_back_to_generic_message() {
        let err = decode::<Test>(StatusCode::BAD_REQUEST, br#"{"detail": "?"}"#).unwrap_err();
        assert_eq!(err.to_string(), GENERIC_FAILURE);
    }

    #[test]
    fn decode_shape_mismatch_is_format_error() {
        // 2xx but not the promised shape.
        let err = decode::<TestPage>(StatusCode::OK, br#"{"page": 3}"#).unwrap_err();
        assert!(matches!(err, ApiError::Format(_)));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:5000/api/");
        assert_eq!(client.base_url(), "http://localhost:5000/api");
    }
}
