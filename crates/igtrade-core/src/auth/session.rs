use std::sync::Arc;

use chrono::Duration;
use tracing::debug;

use crate::cache::{CacheError, CredentialStore, MemoryStore};

use super::{Clock, Credentials, SystemClock};

/// Default lead time before expiry at which a cached session is discarded (5 minutes)
pub const DEFAULT_EXPIRY_MARGIN_SECONDS: i64 = 5 * 60;

/// Expiry-aware view over a `CredentialStore`.
///
/// Stale entries are reported as absent but left in place; the next
/// successful login overwrites them, which saves a write on the common path.
#[derive(Clone)]
pub struct SessionCache {
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    margin: Duration,
}

impl SessionCache {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            margin: Duration::seconds(DEFAULT_EXPIRY_MARGIN_SECONDS),
        }
    }

    /// Cache backed by a fresh `MemoryStore`
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn with_margin(mut self, margin: Duration) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn margin(&self) -> Duration {
        self.margin
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Cached credentials that stay valid for at least the margin, or `None`
    pub fn get_valid(&self) -> Result<Option<Credentials>, CacheError> {
        let Some(credentials) = self.store.load()? else {
            debug!("No cached session");
            return Ok(None);
        };

        let now = self.clock.now();
        if credentials.is_valid_at(now, self.margin) {
            debug!(
                minutes_left = credentials.minutes_until_expiry(now),
                "Using cached session"
            );
            Ok(Some(credentials))
        } else {
            debug!(expiry = %credentials.expiry(), "Cached session expired or about to");
            Ok(None)
        }
    }

    pub fn put(&self, credentials: &Credentials) -> Result<(), CacheError> {
        self.store.save(credentials)
    }

    pub fn clear(&self) -> Result<(), CacheError> {
        self.store.clear()
    }
}

impl std::fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCache")
            .field("margin", &self.margin)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::tests::credentials_expiring_at;
    use crate::auth::ManualClock;
    use crate::cache::{CacheKey, FileStore};
    use chrono::Utc;
    use tempfile::TempDir;

    fn cache_at(clock: &Arc<ManualClock>) -> SessionCache {
        SessionCache::in_memory()
            .with_margin(Duration::minutes(5))
            .with_clock(clock.clone())
    }

    #[test]
    fn test_empty_cache_misses() {
        let cache = SessionCache::in_memory();
        assert!(cache.get_valid().unwrap().is_none());
    }

    #[test]
    fn test_returns_credentials_beyond_margin() {
        let now = Utc::now();
        let clock = Arc::new(ManualClock::new(now));
        let cache = cache_at(&clock);
        let credentials = credentials_expiring_at(now + Duration::minutes(5) + Duration::seconds(1));

        cache.put(&credentials).unwrap();
        assert_eq!(cache.get_valid().unwrap(), Some(credentials));
    }

    #[test]
    fn test_treats_credentials_within_margin_as_absent() {
        let now = Utc::now();
        let clock = Arc::new(ManualClock::new(now));
        let cache = cache_at(&clock);

        cache.put(&credentials_expiring_at(now + Duration::minutes(5))).unwrap();
        assert!(cache.get_valid().unwrap().is_none());

        cache.put(&credentials_expiring_at(now + Duration::minutes(1))).unwrap();
        assert!(cache.get_valid().unwrap().is_none());
    }

    #[test]
    fn test_expires_as_clock_advances() {
        let now = Utc::now();
        let clock = Arc::new(ManualClock::new(now));
        let cache = cache_at(&clock);
        cache.put(&credentials_expiring_at(now + Duration::hours(6))).unwrap();

        clock.advance(Duration::hours(5) + Duration::minutes(54));
        assert!(cache.get_valid().unwrap().is_some());

        clock.advance(Duration::minutes(1));
        assert!(cache.get_valid().unwrap().is_none());
    }

    #[test]
    fn test_stale_entry_is_not_cleared() {
        let now = Utc::now();
        let clock = Arc::new(ManualClock::new(now));
        let cache = cache_at(&clock);
        let stale = credentials_expiring_at(now - Duration::minutes(1));
        cache.put(&stale).unwrap();

        assert!(cache.get_valid().unwrap().is_none());
        assert_eq!(cache.store().load().unwrap(), Some(stale));
    }

    #[test]
    fn test_zero_margin_uses_raw_expiry() {
        let now = Utc::now();
        let clock = Arc::new(ManualClock::new(now));
        let cache = cache_at(&clock).with_margin(Duration::zero());

        cache.put(&credentials_expiring_at(now + Duration::seconds(1))).unwrap();
        assert!(cache.get_valid().unwrap().is_some());

        cache.put(&credentials_expiring_at(now)).unwrap();
        assert!(cache.get_valid().unwrap().is_none());
    }

    #[test]
    fn test_corruption_is_surfaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "garbage").unwrap();

        let cache = SessionCache::new(Arc::new(FileStore::encrypted(&path, CacheKey::generate())));
        assert!(matches!(cache.get_valid(), Err(CacheError::Corrupted { .. })));

        // Clearing is the caller's way to start fresh
        cache.clear().unwrap();
        assert!(cache.get_valid().unwrap().is_none());
    }
}
