//! On-disk layout of a cached session and the two ways of protecting it.

use std::fmt;

use argon2::Argon2;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::auth::Credentials;

use super::CacheError;

/// Length in bytes of a cache key (XChaCha20-Poly1305 uses 256-bit keys)
pub const KEY_LEN: usize = 32;

/// XChaCha20 extended nonce length
const NONCE_LEN: usize = 24;

/// The JSON document stored in a cache file. The `format` tag lets a store
/// tell at a glance whether the file was written by the other variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format")]
pub enum CacheFile {
    #[serde(rename = "plaintext")]
    Plaintext { credentials: Credentials },

    /// `ciphertext` carries the Poly1305 tag appended by the AEAD.
    #[serde(rename = "xchacha20poly1305")]
    Sealed { nonce: String, ciphertext: String },
}

/// Symmetric key for an encrypted file store.
#[derive(Clone, PartialEq, Eq)]
pub struct CacheKey([u8; KEY_LEN]);

impl CacheKey {
    /// Fresh random key from the OS generator
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Decode a standard base64 key, as printed by `to_base64`
    pub fn from_base64(encoded: &str) -> Result<Self, CacheError> {
        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CacheError::InvalidKey(format!("not valid base64: {}", e)))?;
        let bytes: [u8; KEY_LEN] = decoded.try_into().map_err(|bytes: Vec<u8>| {
            CacheError::InvalidKey(format!("expected {} bytes, got {}", KEY_LEN, bytes.len()))
        })?;
        Ok(Self(bytes))
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Stretch a passphrase into a key with Argon2id. The salt must be at
    /// least 8 bytes and must be the same on every run that reads the cache.
    pub fn derive(passphrase: &str, salt: &[u8]) -> Result<Self, CacheError> {
        let mut bytes = [0u8; KEY_LEN];
        Argon2::default()
            .hash_password_into(passphrase.as_bytes(), salt, &mut bytes)
            .map_err(|e| CacheError::InvalidKey(format!("key derivation failed: {}", e)))?;
        Ok(Self(bytes))
    }

    fn cipher(&self) -> XChaCha20Poly1305 {
        XChaCha20Poly1305::new(Key::from_slice(&self.0))
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CacheKey([REDACTED])")
    }
}

/// How a `FileStore` turns credentials into a `CacheFile` and back.
///
/// `open` returns a plain reason on failure; the store attaches its path and
/// reports it as `CacheError::Corrupted`.
pub trait Protection: Send + Sync {
    fn seal(&self, credentials: &Credentials) -> Result<CacheFile, CacheError>;

    fn open(&self, file: CacheFile) -> Result<Credentials, String>;
}

/// Credentials stored in clear text. An explicit choice made by constructing
/// `FileStore::plaintext`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plaintext;

impl Protection for Plaintext {
    fn seal(&self, credentials: &Credentials) -> Result<CacheFile, CacheError> {
        Ok(CacheFile::Plaintext {
            credentials: credentials.clone(),
        })
    }

    fn open(&self, file: CacheFile) -> Result<Credentials, String> {
        match file {
            CacheFile::Plaintext { credentials } => Ok(credentials),
            CacheFile::Sealed { .. } => {
                Err("file is encrypted but no cache key was configured".to_string())
            }
        }
    }
}

/// Credentials encrypted with XChaCha20-Poly1305 under a `CacheKey`.
#[derive(Debug, Clone)]
pub struct Sealed {
    key: CacheKey,
}

impl Sealed {
    pub fn new(key: CacheKey) -> Self {
        Self { key }
    }
}

impl Protection for Sealed {
    fn seal(&self, credentials: &Credentials) -> Result<CacheFile, CacheError> {
        let plaintext =
            serde_json::to_vec(credentials).map_err(|e| CacheError::Encode(e.to_string()))?;
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .key
            .cipher()
            .encrypt(&nonce, plaintext.as_ref())
            .map_err(|_| CacheError::Encode("encryption failed".to_string()))?;

        Ok(CacheFile::Sealed {
            nonce: STANDARD.encode(nonce.as_slice()),
            ciphertext: STANDARD.encode(ciphertext),
        })
    }

    fn open(&self, file: CacheFile) -> Result<Credentials, String> {
        let (nonce, ciphertext) = match file {
            CacheFile::Sealed { nonce, ciphertext } => (nonce, ciphertext),
            CacheFile::Plaintext { .. } => {
                return Err("file is plaintext but a cache key was configured".to_string())
            }
        };

        let nonce = STANDARD
            .decode(nonce)
            .map_err(|e| format!("nonce is not valid base64: {}", e))?;
        if nonce.len() != NONCE_LEN {
            return Err(format!(
                "nonce must be {} bytes, got {}",
                NONCE_LEN,
                nonce.len()
            ));
        }
        let ciphertext = STANDARD
            .decode(ciphertext)
            .map_err(|e| format!("ciphertext is not valid base64: {}", e))?;

        let plaintext = self
            .key
            .cipher()
            .decrypt(XNonce::from_slice(&nonce), ciphertext.as_ref())
            .map_err(|_| "decryption failed (wrong key or tampered data)".to_string())?;

        serde_json::from_slice(&plaintext)
            .map_err(|e| format!("decrypted payload is not a session: {}", e))
    }
}
