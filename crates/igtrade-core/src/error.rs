use thiserror::Error;

use crate::api::RequestError;
use crate::auth::AuthenticationError;
use crate::cache::CacheError;
use crate::validation::ValidationError;

/// Every failure the library surfaces. Nothing is retried internally; each
/// variant carries enough detail (status, rule ids, cause) for the caller to
/// pick a policy.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Request(#[from] RequestError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// True when the session store itself is unreadable, as opposed to empty.
    /// Callers typically answer this with `clear_cache()` and a fresh login.
    pub fn is_cache_corruption(&self) -> bool {
        matches!(self, Error::Cache(CacheError::Corrupted { .. }))
    }
}
