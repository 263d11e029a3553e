use std::fmt;

use reqwest::StatusCode;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Response(#[from] ErrorResponse),

    #[error(transparent)]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    HttpMiddleware(#[from] reqwest_middleware::Error),

    /// A response body that could not be decoded.
    #[error(transparent)]
    Deserialize(#[from] serde_json::Error),

    /// A non-success status whose body carried no service error.
    #[error("did not get OK, got {0}")]
    UnexpectedStatus(StatusCode),

    /// The upload initiation response carried no session location.
    #[error("no Location header in resumable upload response")]
    MissingLocation,

    #[error("invalid upload location {0}")]
    InvalidLocation(String),

    #[error("token source failed: {0}")]
    TokenSource(Box<dyn std::error::Error + Send + Sync>),
}

/// The `error` object of a failed call, e.g. `{"code": 404, "message": "Not found: Dataset p:d"}`.
#[derive(Debug, serde::Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

impl std::error::Error for ErrorResponse {}

#[derive(serde::Deserialize)]
pub(crate) struct ErrorWrapper {
    pub(crate) error: ErrorResponse,
}
