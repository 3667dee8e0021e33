//! # quizdeck
//!
//! Terminal client for a quiz-authoring and quiz-taking platform.
//!
//! The library is three layers deep: an [`api`] client that speaks the
//! backend's REST contract, a shared [`store`] that caches server-backed
//! entities and exposes exception-free operations, and an [`attempt`]
//! controller that owns the ephemeral state of one test run. The binary
//! wires those into a ratatui front end.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use quizdeck::{ApiClient, TestStore};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let store = TestStore::new(ApiClient::new("http://localhost:5000/api"));
//!     quizdeck::run(store).await
//! }
//! ```

pub mod api;
mod app;
pub mod attempt;
pub mod forms;
pub mod models;
pub mod store;
pub mod terminal;
mod ui;

pub use api::{ApiClient, ApiError, QuizApi, DEFAULT_BASE_URL};
pub use app::run;
pub use attempt::{Attempt, AttemptPhase};
pub use store::{ContextUnavailableError, StoreContext, StoreState, TestStore};
