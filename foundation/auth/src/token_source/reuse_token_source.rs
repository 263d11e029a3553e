use async_trait::async_trait;

use crate::error::Error;
use crate::token::Token;
use crate::token_source::TokenSource;

/// Hands out the cached token until it is about to expire, then refreshes it once.
#[derive(Debug)]
pub struct ReuseTokenSource {
    target: Box<dyn TokenSource>,
    current_token: tokio::sync::RwLock<Token>,
    guard: tokio::sync::Mutex<()>,
}

impl ReuseTokenSource {
    pub(crate) fn new(target: Box<dyn TokenSource>, token: Token) -> ReuseTokenSource {
        ReuseTokenSource {
            target,
            current_token: tokio::sync::RwLock::new(token),
            guard: tokio::sync::Mutex::new(()),
        }
    }

    async fn r_lock_token(&self) -> Option<Token> {
        let token = self.current_token.read().await;
        token.valid().then(|| token.clone())
    }
}

#[async_trait]
impl TokenSource for ReuseTokenSource {
    async fn token(&self) -> Result<Token, Error> {
        if let Some(token) = self.r_lock_token().await {
            return Ok(token);
        }

        // Only single task can refresh token
        let _locking = self.guard.lock().await;

        if let Some(token) = self.r_lock_token().await {
            return Ok(token);
        }

        let token = self.target.token().await?;
        tracing::debug!(expiry = ?token.expiry, "refreshed access token");
        *self.current_token.write().await = token.clone();
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use time::OffsetDateTime;

    use super::*;

    #[derive(Debug, Default)]
    struct CountingSource {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TokenSource for CountingSource {
        async fn token(&self) -> Result<Token, Error> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Token {
                access_token: format!("fresh_{n}"),
                token_type: "Bearer".to_string(),
                expiry: Some(OffsetDateTime::now_utc() + time::Duration::hours(1)),
            })
        }
    }

    #[tokio::test]
    async fn test_reuse_valid_token() {
        let calls = Arc::new(AtomicUsize::new(0));
        let initial = Token {
            access_token: "initial".to_string(),
            token_type: "Bearer".to_string(),
            expiry: Some(OffsetDateTime::now_utc() + time::Duration::hours(1)),
        };
        let ts = ReuseTokenSource::new(Box::new(CountingSource { calls: calls.clone() }), initial);
        assert_eq!(ts.token().await.unwrap().access_token, "initial");
        assert_eq!(ts.token().await.unwrap().access_token, "initial");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_refresh_expired_token() {
        let calls = Arc::new(AtomicUsize::new(0));
        let expired = Token {
            access_token: "expired".to_string(),
            token_type: "Bearer".to_string(),
            expiry: Some(OffsetDateTime::now_utc() - time::Duration::minutes(1)),
        };
        let ts = ReuseTokenSource::new(Box::new(CountingSource { calls: calls.clone() }), expired);
        assert_eq!(ts.token().await.unwrap().access_token, "fresh_0");
        assert_eq!(ts.token().await.unwrap().access_token, "fresh_0");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
