use std::fmt::Debug;

use async_trait::async_trait;
use reqwest::Response;
use serde::Serialize;
use time::OffsetDateTime;

use crate::credentials;
use crate::error::{Error, TokenErrorResponse};
use crate::token::{Token, TOKEN_URL};
use crate::token_source::{InternalToken, TokenSource};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

#[derive(Clone, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

impl Claims<'_> {
    fn token(&self, pk: &jsonwebtoken::EncodingKey, pk_id: &str) -> Result<String, Error> {
        let mut header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256);
        header.kid = Some(pk_id.to_string());
        Ok(jsonwebtoken::encode(&header, self, pk)?)
    }
}

/// Exchanges a signed JWT assertion for an access token (OAuth 2.0 JWT bearer grant).
pub struct OAuth2ServiceAccountTokenSource {
    pub email: String,
    pub pk: jsonwebtoken::EncodingKey,
    pub pk_id: String,
    pub scopes: String,
    pub token_url: String,
    pub client: reqwest::Client,
}

impl Debug for OAuth2ServiceAccountTokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // jwt::EncodingKey does not implement Debug
        f.debug_struct("OAuth2ServiceAccountTokenSource")
            .field("email", &self.email)
            .field("pk_id", &self.pk_id)
            .field("scopes", &self.scopes)
            .field("token_url", &self.token_url)
            .finish()
    }
}

impl OAuth2ServiceAccountTokenSource {
    pub(crate) fn new(
        cred: &credentials::CredentialsFile,
        scopes: &str,
        client: reqwest::Client,
    ) -> Result<OAuth2ServiceAccountTokenSource, Error> {
        Ok(OAuth2ServiceAccountTokenSource {
            email: cred.client_email.clone().ok_or(Error::NoClientEmailFound)?,
            pk: cred.try_to_private_key()?,
            pk_id: cred.private_key_id.clone().unwrap_or_default(),
            scopes: scopes.to_string(),
            token_url: cred.token_uri.clone().unwrap_or_else(|| TOKEN_URL.to_string()),
            client,
        })
    }

    /// Maps a non-2xx token response to `TokenErrorResponse` when the body has one.
    async fn check_response_status(response: Response) -> Result<Response, Error> {
        let error = match response.error_for_status_ref() {
            Ok(_) => return Ok(response),
            Err(error) => error,
        };

        // the OAuth2 error body when present, else the bare status
        let status = response.status();
        Err(response
            .json::<TokenErrorResponse>()
            .await
            .map(|response| Error::TokenErrorResponse {
                status: status.as_u16(),
                error: response.error,
                error_description: response.error_description,
            })
            .unwrap_or(Error::HttpError(error)))
    }
}

#[async_trait]
impl TokenSource for OAuth2ServiceAccountTokenSource {
    async fn token(&self) -> Result<Token, Error> {
        let iat = OffsetDateTime::now_utc();
        let exp = iat + time::Duration::hours(1);

        let request_token = Claims {
            iss: self.email.as_ref(),
            scope: self.scopes.as_ref(),
            aud: self.token_url.as_ref(),
            exp: exp.unix_timestamp(),
            iat: iat.unix_timestamp(),
        }
        .token(&self.pk, &self.pk_id)?;

        let form = [("grant_type", JWT_BEARER_GRANT), ("assertion", request_token.as_str())];
        let response = self.client.post(self.token_url.as_str()).form(&form).send().await?;
        let token = Self::check_response_status(response)
            .await?
            .json::<InternalToken>()
            .await?
            .to_token(iat);
        tracing::debug!("access token issued for {}", self.email);
        Ok(token)
    }
}
