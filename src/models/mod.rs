//! Wire types shared between the API client, the store, and the UI.
//!
//! Everything here is serialized as JSON in the shape the backend speaks;
//! field names are camelCase on the wire and snake_case in Rust.

mod answer;
mod question;
mod result;

pub use answer::{AnswerMap, AnswerValue};
pub use question::{Question, QuestionDraft, QuestionKind};
pub use result::{grade, QuestionResult, ScoreSummary, ScoringResult};
pub use test::{Pagination, Test, TestDraft, TestListQuery, TestPage, TestPatch};
