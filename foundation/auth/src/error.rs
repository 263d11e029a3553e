use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("scopes are required to exchange service account credentials")]
    ScopeRequired,

    #[error("unsupported account type {0}, only service_account keys are accepted")]
    UnsupportedAccountType(String),

    #[error("failed to read credentials file {path}: {source}")]
    CredentialsIO {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed credentials: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    HttpError(#[from] reqwest::Error),

    #[error("token endpoint responded {status}: {error} ({error_description:?})")]
    TokenErrorResponse {
        status: u16,
        error: String,
        error_description: Option<String>,
    },

    #[error("client_email is required")]
    NoClientEmailFound,

    #[error("private key is required")]
    NoPrivateKeyFound,

    #[error("invalid token")]
    InvalidToken,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct TokenErrorResponse {
    pub(crate) error: String,
    #[serde(default)]
    pub(crate) error_description: Option<String>,
}
