//! Storage backends for session credentials.
//!
//! This module provides:
//! - `CredentialStore`: the load/save/clear contract every backend implements
//! - `MemoryStore`: a single in-process slot, gone when the process exits
//! - `FileStore`: one JSON file per cache, either plaintext or sealed with
//!   XChaCha20-Poly1305 under a caller-supplied `CacheKey`
//!
//! Whether a file store encrypts is fixed by its type (`FileStore<Plaintext>`
//! vs `FileStore<Sealed>`). A store never reinterprets a file written the
//! other way; it reports `CacheError::Corrupted` instead.

pub mod crypto;
pub mod error;
pub mod file;
pub mod store;

pub use crypto::{CacheFile, CacheKey, Plaintext, Protection, Sealed};
pub use error::CacheError;
pub use file::FileStore;
pub use store::{CredentialStore, MemoryStore};
