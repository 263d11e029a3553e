use std::path::PathBuf;

use crate::record::DecodeError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output file could not be written. The destination is left untouched.
    #[error("failed to write output {path}: {message}")]
    Output { path: PathBuf, message: String },

    #[cfg(feature = "auth")]
    #[error(transparent)]
    Credentials(#[from] bqxfer_auth::error::Error),

    #[error(transparent)]
    Http(#[from] crate::http::error::Error),

    #[error("malformed schema {path}: {source}")]
    Schema {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The service reported errors for the job or query.
    #[error("{count} errors returned: {message}")]
    Job { count: usize, message: String },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("returned project id {returned} != configured id {configured}")]
    ProjectMismatch { returned: String, configured: String },

    #[error("query returned {retrieved} of {total} rows")]
    IncompleteResults { retrieved: i64, total: i64 },

    #[error("unknown job status returned - {state} ({job})")]
    UnknownJobState { state: String, job: String },

    #[error("job {0} did not finish in time")]
    Timeout(String),

    #[error("{0} cancelled")]
    Cancelled(String),

    #[error("no schema data returned")]
    NoSchema,
}

impl Error {
    pub(crate) fn from_errors<'a, I>(errors: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a crate::http::types::ErrorProto>,
    {
        let messages: Vec<&str> = errors.into_iter().map(|e| e.message.as_str()).collect();
        if messages.is_empty() {
            None
        } else {
            Some(Error::Job {
                count: messages.len(),
                message: messages.join("; "),
            })
        }
    }
}
