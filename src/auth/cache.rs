use super::{Clock, MintToken, ServiceAccountCredential};
use crate::error::AuthError;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Cached tokens are served for 55 minutes of their 60 minute lifetime.
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 55 * 60;

#[derive(Clone)]
struct AccessToken {
    secret: String,
    /// Instant after which the token is no longer served.
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Lazily minted, single-slot access token cache.
///
/// The slot lock is held across a mint, so flows that find the token stale while a mint is
/// in flight wait for it and reuse its result instead of exchanging their own assertion.
pub struct TokenCache<M> {
    minter: M,
    clock: Arc<dyn Clock>,
    slot: Mutex<Option<AccessToken>>,
}

impl<M: MintToken> TokenCache<M> {
    pub fn new(minter: M, clock: Arc<dyn Clock>) -> Self {
        Self {
            minter,
            clock,
            slot: Mutex::new(None),
        }
    }

    pub async fn get_token(&self, credential: &ServiceAccountCredential) -> Result<String, AuthError> {
        let mut slot = self.slot.lock().await;

        if let Some(token) = slot.as_ref().filter(|t| t.is_fresh_at(self.clock.now())) {
            debug!("Using cached access token");
            return Ok(token.secret.clone());
        }

        debug!("Access token missing or stale, minting");
        let minted_at = self.clock.now();
        let secret = self.minter.mint(credential).await?;

        *slot = Some(AccessToken {
            secret: secret.clone(),
            expires_at: minted_at + TimeDelta::seconds(TOKEN_REFRESH_MARGIN_SECS),
        });

        Ok(secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_helpers::{MockClock, mock_credential};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Minter returning `token-<n>` for the n-th mint.
    #[derive(Default)]
    struct CountingMinter {
        mints: AtomicUsize,
        fail: bool,
    }

    impl CountingMinter {
        fn mints(&self) -> usize {
            self.mints.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MintToken for Arc<CountingMinter> {
        async fn mint(&self, _credential: &ServiceAccountCredential) -> Result<String, AuthError> {
            // Give concurrent callers a chance to pile up behind the slot lock.
            for _ in 0..5 {
                tokio::task::yield_now().await;
            }
            let n = self.mints.fetch_add(1, Ordering::SeqCst) + 1;
            match self.fail {
                true => Err(AuthError::TokenExchangeFailed("{\"error\":\"invalid_grant\"}".to_string())),
                false => Ok(format!("token-{n}")),
            }
        }
    }

    fn cache() -> (TokenCache<Arc<CountingMinter>>, Arc<CountingMinter>, Arc<MockClock>) {
        let minter = Arc::new(CountingMinter::default());
        let clock = Arc::new(MockClock::new());
        (TokenCache::new(minter.clone(), clock.clone()), minter, clock)
    }

    #[tokio::test]
    async fn test_token_reused_within_margin() {
        let (cache, minter, clock) = cache();
        let credential = mock_credential();

        let first = cache.get_token(&credential).await.unwrap();
        clock.advance(TimeDelta::minutes(54));
        let second = cache.get_token(&credential).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(minter.mints(), 1);
    }

    #[tokio::test]
    async fn test_token_reminted_after_margin() {
        let (cache, minter, clock) = cache();
        let credential = mock_credential();

        let first = cache.get_token(&credential).await.unwrap();
        clock.advance(TimeDelta::minutes(55));
        let second = cache.get_token(&credential).await.unwrap();
        let third = cache.get_token(&credential).await.unwrap();

        assert_eq!(first, "token-1");
        assert_eq!(second, "token-2");
        assert_eq!(third, "token-2");
        assert_eq!(minter.mints(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_mint() {
        let (cache, minter, _clock) = cache();
        let credential = mock_credential();

        let (a, b, c, d) = tokio::join!(
            cache.get_token(&credential),
            cache.get_token(&credential),
            cache.get_token(&credential),
            cache.get_token(&credential),
        );

        for token in [a, b, c, d] {
            assert_eq!(token.unwrap(), "token-1");
        }
        assert_eq!(minter.mints(), 1);
    }

    #[tokio::test]
    async fn test_failed_mint_is_not_cached() {
        let minter = Arc::new(CountingMinter {
            fail: true,
            ..Default::default()
        });
        let cache = TokenCache::new(minter.clone(), Arc::new(MockClock::new()));
        let credential = mock_credential();

        let err = cache.get_token(&credential).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenExchangeFailed(detail) if detail.contains("invalid_grant")));

        assert!(cache.get_token(&credential).await.is_err());
        assert_eq!(minter.mints(), 2);
    }
}
