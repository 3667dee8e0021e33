//! REST client for the quiz backend.
//!
//! All requests are JSON over HTTP against a configurable base URL. The
//! client normalizes every failure into [`ApiError`]; callers never see a
//! raw `reqwest` or `serde_json` error.

mod client;
mod error;

pub use client::{ApiClient, QuizApi, DEFAULT_BASE_URL};
pub use error::ApiError;
