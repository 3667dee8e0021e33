use thiserror::Error;

/// Failure taxonomy of the API boundary.
///
/// Transport and format errors come from this side of the wire; an
/// `Application` error is a well-formed rejection from the backend,
/// carrying its `{message}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level failure: connect, send, or body read.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the JSON shape the contract promises.
    #[error("could not parse the server response")]
    Format(#[source] serde_json::Error),

    /// Non-2xx response with a backend-supplied message.
    #[error("{message}")]
    Application { status: u16, message: String },
}

impl ApiError {
    /// True for errors produced by the backend rather than the wire.
    pub fn is_application(&self) -> bool {
        matches!(self, Self::Application { .. })
    }
}
