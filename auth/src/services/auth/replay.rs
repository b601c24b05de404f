use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::services::auth::grant::BoxFuture;

/// One-time-use check for grant identifiers (code and refresh token `jti`s).
///
/// - `Ok(true)`: first use, now recorded
/// - `Ok(false)`: already used
/// - `Err(_)`: store failure; callers fail closed
pub trait ReplayStore: Send + Sync + std::fmt::Debug {
    fn check_and_store<'a>(
        &'a self,
        key: &'a str,
        ttl_secs: u64,
    ) -> BoxFuture<'a, Result<bool, ReplayError>>;
}

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("replay store unavailable: {0}")]
    Unavailable(String),
}

/// Process-local replay store. Entries are dropped once their TTL passes, so
/// the map only holds grants that could still verify.
#[derive(Debug, Default)]
pub struct InMemoryReplayStore {
    seen: Mutex<HashMap<String, Instant>>,
}

impl InMemoryReplayStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_and_store_at(&self, key: &str, ttl_secs: u64, now: Instant) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        seen.retain(|_, expires_at| *expires_at > now);

        if seen.contains_key(key) {
            return false;
        }
        let expires_at = now
            .checked_add(Duration::from_secs(ttl_secs))
            .unwrap_or(now);
        seen.insert(key.to_string(), expires_at);
        true
    }

    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReplayStore for InMemoryReplayStore {
    fn check_and_store<'a>(
        &'a self,
        key: &'a str,
        ttl_secs: u64,
    ) -> BoxFuture<'a, Result<bool, ReplayError>> {
        let first = self.check_and_store_at(key, ttl_secs, Instant::now());
        Box::pin(async move { Ok(first) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_second_use_is_replay() {
        let store = InMemoryReplayStore::new();

        assert!(store.check_and_store("jti-1", 300).await.unwrap());
        assert!(!store.check_and_store("jti-1", 300).await.unwrap());
        assert!(store.check_and_store("jti-2", 300).await.unwrap());
    }

    #[test]
    fn test_expired_entries_are_pruned() {
        let store = InMemoryReplayStore::new();
        let start = Instant::now();

        assert!(store.check_and_store_at("jti-1", 60, start));
        assert_eq!(store.len(), 1);

        let later = start + Duration::from_secs(61);
        assert!(store.check_and_store_at("jti-2", 60, later));
        // jti-1 outlived its TTL and was dropped
        assert_eq!(store.len(), 1);
    }
}
