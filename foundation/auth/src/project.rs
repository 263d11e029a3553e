use crate::credentials::CredentialsFile;
use crate::error;
use crate::token_source::reuse_token_source::ReuseTokenSource;
use crate::token_source::service_account_token_source::OAuth2ServiceAccountTokenSource;
use crate::token_source::{default_http_client, TokenSource};

pub(crate) const SERVICE_ACCOUNT_KEY: &str = "service_account";

#[derive(Debug, Clone, Default)]
pub struct Config<'a> {
    scopes: Option<&'a [&'a str]>,
    http: Option<reqwest::Client>,
}

impl<'a> Config<'a> {
    pub fn scopes_to_string(&self, sep: &str) -> String {
        match self.scopes {
            Some(s) => s.join(sep),
            None => String::new(),
        }
    }

    pub fn with_scopes(mut self, value: &'a [&'a str]) -> Self {
        self.scopes = Some(value);
        self
    }

    /// Client used for the token exchange, e.g. one that routes through a proxy.
    pub fn with_http_client(mut self, value: reqwest::Client) -> Self {
        self.http = Some(value);
        self
    }
}

/// Exchanges the key once up front so bad credentials fail here, then caches the token.
pub async fn create_token_source_from_credentials(
    credentials: &CredentialsFile,
    config: &Config<'_>,
) -> Result<Box<dyn TokenSource>, error::Error> {
    let ts = credentials_from_json_with_params(credentials, config)?;
    let token = ts.token().await?;
    Ok(Box::new(ReuseTokenSource::new(ts, token)))
}

fn credentials_from_json_with_params(
    credentials: &CredentialsFile,
    config: &Config<'_>,
) -> Result<Box<dyn TokenSource>, error::Error> {
    match credentials.tp.as_str() {
        SERVICE_ACCOUNT_KEY => {
            if config.scopes.is_none() {
                return Err(error::Error::ScopeRequired);
            }
            let client = config.http.clone().unwrap_or_else(default_http_client);
            let source =
                OAuth2ServiceAccountTokenSource::new(credentials, config.scopes_to_string(" ").as_str(), client)?;
            Ok(Box::new(source))
        }
        _ => Err(error::Error::UnsupportedAccountType(credentials.tp.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scopes_to_string() {
        let scopes = ["a", "b"];
        let config = Config::default().with_scopes(&scopes);
        assert_eq!(config.scopes_to_string(" "), "a b");
        assert_eq!(Config::default().scopes_to_string(" "), "");
    }

    #[tokio::test]
    async fn test_unsupported_account_type() {
        let cred = CredentialsFile::new_from_str(r#"{"type":"authorized_user","refresh_token":"x"}"#).unwrap();
        let scopes = ["a"];
        let result = create_token_source_from_credentials(&cred, &Config::default().with_scopes(&scopes)).await;
        match result {
            Err(error::Error::UnsupportedAccountType(tp)) => assert_eq!(tp, "authorized_user"),
            _ => panic!("expected unsupported account type"),
        }
    }
}
