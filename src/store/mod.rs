//! Shared test store.
//!
//! Single source of truth for server-backed entities: the catalog page,
//! the currently loaded test, the last scoring result, and the transient
//! `loading`/`error` flags. Constructed once at startup and handed to every
//! consumer by `Arc`; background tasks hold a weak [`StoreContext`] instead
//! so a finished app cannot be resurrected by a late response.
//!
//! Every operation is exception-free: failures land in `error` as a
//! human-readable string and the operation returns `None`/`false`.

mod context;
mod state;
mod store;

pub use context::{ContextUnavailableError, StoreContext};
pub use state::StoreState;
pub use store::{StateSnapshot, TestStore};
