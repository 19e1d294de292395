use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::auth::Credentials;

use super::CacheError;

/// Persists and retrieves the credentials of one session.
///
/// Implementations do no expiry checks; that is `SessionCache`'s job.
pub trait CredentialStore: Send + Sync {
    /// `Ok(None)` means "no session stored yet", never "store is broken".
    fn load(&self) -> Result<Option<Credentials>, CacheError>;

    fn save(&self, credentials: &Credentials) -> Result<(), CacheError>;

    fn clear(&self) -> Result<(), CacheError>;
}

/// Volatile single-slot store. Content lives as long as the value does.
///
/// The mutex only provides interior mutability for `&self` access; it does not
/// serialize logins between callers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Credentials>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<Credentials>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Result<Option<Credentials>, CacheError> {
        Ok(self.slot().clone())
    }

    fn save(&self, credentials: &Credentials) -> Result<(), CacheError> {
        *self.slot() = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        *self.slot() = None;
        Ok(())
    }
}
