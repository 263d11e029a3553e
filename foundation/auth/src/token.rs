use std::fmt::{Debug, Formatter};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use token_source::{TokenSource, TokenSourceProvider};

use crate::credentials::CredentialsFile;
use crate::error::Error;
use crate::project::{create_token_source_from_credentials, Config};
use crate::token_source::TokenSource as InternalTokenSource;

pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Clone)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub expiry: Option<time::OffsetDateTime>,
}

impl Token {
    pub fn value(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    pub fn valid(&self) -> bool {
        !self.access_token.is_empty() && !self.expired()
    }

    fn expired(&self) -> bool {
        match self.expiry {
            None => false,
            Some(s) => {
                let now = time::OffsetDateTime::now_utc();
                let exp = s + time::Duration::seconds(-10);
                now > exp
            }
        }
    }
}

/// Token source provider backed by a service account key file.
pub struct DefaultTokenSourceProvider {
    ts: Arc<DefaultTokenSource>,
    pub project_id: Option<String>,
}

impl Debug for DefaultTokenSourceProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultTokenSourceProvider")
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

impl DefaultTokenSourceProvider {
    /// Reads the key at `path` and performs the first token exchange, so a bad key fails here.
    pub async fn new_with_credentials_file(config: Config<'_>, path: impl AsRef<Path>) -> Result<Self, Error> {
        let credentials = CredentialsFile::new_from_file(path).await?;
        Self::new_with_credentials(config, Box::new(credentials)).await
    }

    /// Same as [`Self::new_with_credentials_file`] for an already parsed key.
    pub async fn new_with_credentials(config: Config<'_>, credentials: Box<CredentialsFile>) -> Result<Self, Error> {
        let inner = create_token_source_from_credentials(&credentials, &config).await?.into();
        Ok(Self {
            ts: Arc::new(DefaultTokenSource { inner }),
            project_id: credentials.project_id.clone(),
        })
    }
}

impl TokenSourceProvider for DefaultTokenSourceProvider {
    fn token_source(&self) -> Arc<dyn TokenSource> {
        self.ts.clone()
    }
}

#[derive(Debug, Clone)]
pub struct DefaultTokenSource {
    inner: Arc<dyn InternalTokenSource>,
}

#[async_trait]
impl TokenSource for DefaultTokenSource {
    async fn token(&self) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.inner.token().await?.value())
    }
}
