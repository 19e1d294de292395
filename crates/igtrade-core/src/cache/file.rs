use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::auth::Credentials;

use super::crypto::{CacheFile, CacheKey, Plaintext, Protection, Sealed};
use super::{CacheError, CredentialStore};

/// Durable credential store backed by a single JSON file.
///
/// Writes go to a temp file in the same directory which is then persisted over
/// the target, so readers see either the previous or the new content in full.
/// The temp file is created owner-only, and the cache file keeps that mode.
/// Two processes saving to the same path race; the last rename wins.
#[derive(Debug)]
pub struct FileStore<P: Protection> {
    path: PathBuf,
    protection: P,
}

impl FileStore<Plaintext> {
    /// Store credentials in clear text at `path`
    pub fn plaintext(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            protection: Plaintext,
        }
    }
}

impl FileStore<Sealed> {
    /// Store credentials at `path`, encrypted under `key`
    pub fn encrypted(path: impl Into<PathBuf>, key: CacheKey) -> Self {
        Self {
            path: path.into(),
            protection: Sealed::new(key),
        }
    }
}

impl<P: Protection> FileStore<P> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn corrupted(&self, reason: impl Into<String>) -> CacheError {
        CacheError::Corrupted {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }

    /// Serialize and write the new content next to the target without
    /// replacing it yet. Dropping the result removes the temp file.
    fn stage(&self, credentials: &Credentials) -> Result<NamedTempFile, CacheError> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent)
                    .map_err(|e| CacheError::io(parent, "create cache directory", e))?;
                parent
            }
            None => Path::new("."),
        };

        let file = self.protection.seal(credentials)?;
        let contents =
            serde_json::to_vec_pretty(&file).map_err(|e| CacheError::Encode(e.to_string()))?;

        let mut temp = tempfile::Builder::new()
            .prefix(&format!(".{}.tmp.", self.file_name()))
            .tempfile_in(dir)
            .map_err(|e| CacheError::io(dir, "create temp cache file", e))?;
        if let Err(e) = temp.write_all(&contents).and_then(|()| temp.as_file().sync_all()) {
            return Err(CacheError::io(temp.path(), "write temp cache file", e));
        }
        Ok(temp)
    }

    fn commit(&self, staged: NamedTempFile) -> Result<(), CacheError> {
        staged
            .persist(&self.path)
            .map_err(|e| CacheError::io(&self.path, "replace cache file", e.error))?;
        Ok(())
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "session".to_string())
    }
}

impl<P: Protection> CredentialStore for FileStore<P> {
    fn load(&self) -> Result<Option<Credentials>, CacheError> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::io(&self.path, "read cache file", e)),
        };

        let file: CacheFile = serde_json::from_slice(&contents)
            .map_err(|e| self.corrupted(format!("unreadable cache file: {}", e)))?;
        let credentials = self
            .protection
            .open(file)
            .map_err(|reason| self.corrupted(reason))?;

        debug!(path = %self.path.display(), "Loaded session from cache file");
        Ok(Some(credentials))
    }

    fn save(&self, credentials: &Credentials) -> Result<(), CacheError> {
        let staged = self.stage(credentials)?;
        self.commit(staged)?;
        debug!(path = %self.path.display(), "Saved session to cache file");
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Removed cache file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::io(&self.path, "remove cache file", e)),
        }
    }
}
