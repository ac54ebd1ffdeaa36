use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use vastra_core::error::CarrierError;

/// A cached carrier auth token. Never persisted; reconstructed on first use
/// after a restart.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Tokens are refreshed once they are within a day of expiring.
const REFRESH_MARGIN_DAYS: i64 = 1;

/// In-memory, process-wide session cache.
///
/// The mutex is held across the login call, so concurrent callers that all
/// find a stale token share a single refresh instead of racing logins.
pub struct SessionCache {
    inner: Mutex<Option<Session>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    /// Return the cached token while it is more than a day from expiry,
    /// otherwise run `login` and cache its result.
    pub async fn get_or_refresh<F, Fut>(&self, login: F) -> Result<String, CarrierError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Session, CarrierError>>,
    {
        let mut guard = self.inner.lock().await;

        if let Some(session) = guard.as_ref() {
            if session.expires_at - Utc::now() > Duration::days(REFRESH_MARGIN_DAYS) {
                return Ok(session.token.clone());
            }
        }

        tracing::debug!("Carrier session missing or near expiry, logging in");
        let fresh = login().await?;
        let token = fresh.token.clone();
        *guard = Some(fresh);
        Ok(token)
    }

    /// Drop the cached token so the next call re-authenticates. Used when the
    /// provider answers 401 to a token we thought was valid.
    pub async fn invalidate(&self) {
        let mut guard = self.inner.lock().await;
        *guard = None;
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn session_expiring_in(days: i64) -> Session {
        Session {
            token: format!("token-{}", days),
            expires_at: Utc::now() + Duration::days(days),
        }
    }

    #[tokio::test]
    async fn test_fresh_token_is_reused() {
        let cache = SessionCache::new();
        let logins = AtomicUsize::new(0);

        for _ in 0..3 {
            let token = cache
                .get_or_refresh(|| async {
                    logins.fetch_add(1, Ordering::SeqCst);
                    Ok(session_expiring_in(10))
                })
                .await
                .unwrap();
            assert_eq!(token, "token-10");
        }

        assert_eq!(logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_near_expiry_token_is_refreshed() {
        let cache = SessionCache::new();

        // Seed a token that expires within the refresh margin
        cache
            .get_or_refresh(|| async { Ok(session_expiring_in(0)) })
            .await
            .unwrap();

        let token = cache
            .get_or_refresh(|| async { Ok(session_expiring_in(10)) })
            .await
            .unwrap();
        assert_eq!(token, "token-10");
    }

    #[tokio::test]
    async fn test_invalidate_forces_login() {
        let cache = SessionCache::new();
        let logins = AtomicUsize::new(0);

        cache
            .get_or_refresh(|| async {
                logins.fetch_add(1, Ordering::SeqCst);
                Ok(session_expiring_in(10))
            })
            .await
            .unwrap();

        cache.invalidate().await;

        cache
            .get_or_refresh(|| async {
                logins.fetch_add(1, Ordering::SeqCst);
                Ok(session_expiring_in(10))
            })
            .await
            .unwrap();

        assert_eq!(logins.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_login_failure_leaves_cache_empty() {
        let cache = SessionCache::new();

        let result = cache
            .get_or_refresh(|| async { Err(CarrierError::Auth("bad credentials".to_string())) })
            .await;
        assert!(result.is_err());

        // A later successful login still works
        let token = cache
            .get_or_refresh(|| async { Ok(session_expiring_in(10)) })
            .await
            .unwrap();
        assert_eq!(token, "token-10");
    }
}
