//! Application configuration management.
//!
//! Non-secret settings (gateway URL, account identifier, cache mode and
//! timings) live in `~/.config/igtrade/config.json`. Secrets never touch that
//! file: the API key, password and cache key come from the environment.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Duration;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::{
    LoginConfig, SessionCache, DEFAULT_EXPIRY_MARGIN_SECONDS, DEFAULT_SESSION_LIFETIME_MINUTES,
};
use crate::cache::{CacheKey, CredentialStore, FileStore, MemoryStore};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "igtrade";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Session cache file name
const SESSION_FILE: &str = "session.json";

/// Longest accepted session lifetime (one year)
const MAX_SESSION_LIFETIME_MINUTES: i64 = 365 * 24 * 60;

/// Longest accepted expiry margin (one year)
const MAX_EXPIRY_MARGIN_SECONDS: i64 = 365 * 24 * 60 * 60;

/// Demo gateway; live accounts use `https://api.ig.com`
pub const DEMO_BASE_URL: &str = "https://demo-api.ig.com";

pub const ENV_BASE_URL: &str = "IG_BASE_URL";
pub const ENV_IDENTIFIER: &str = "IG_IDENTIFIER";
pub const ENV_API_KEY: &str = "IG_API_KEY";
pub const ENV_PASSWORD: &str = "IG_PASSWORD";
pub const ENV_CACHE_KEY: &str = "IG_CACHE_KEY";

/// Where sessions are kept between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheMode {
    /// Process lifetime only
    Memory,
    /// JSON file, owner-readable only
    #[default]
    File,
    /// JSON file encrypted under `IG_CACHE_KEY`
    EncryptedFile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub identifier: Option<String>,
    pub cache: CacheMode,
    pub cache_path: Option<PathBuf>,
    pub session_lifetime_minutes: i64,
    pub expiry_margin_seconds: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEMO_BASE_URL.to_string(),
            identifier: None,
            cache: CacheMode::default(),
            cache_path: None,
            session_lifetime_minutes: DEFAULT_SESSION_LIFETIME_MINUTES,
            expiry_margin_seconds: DEFAULT_EXPIRY_MARGIN_SECONDS,
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply `IG_BASE_URL` / `IG_IDENTIFIER` from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            self.base_url = base_url;
        }
        if let Some(identifier) = lookup(ENV_IDENTIFIER).filter(|v| !v.is_empty()) {
            self.identifier = Some(identifier);
        }
        self
    }

    pub fn session_cache_path(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.cache_path {
            return Ok(path.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME).join(SESSION_FILE))
    }

    pub fn session_lifetime(&self) -> Result<Duration> {
        let minutes = self.session_lifetime_minutes;
        if !(1..=MAX_SESSION_LIFETIME_MINUTES).contains(&minutes) {
            bail!(
                "session_lifetime_minutes must be between 1 and {}, got {}",
                MAX_SESSION_LIFETIME_MINUTES,
                minutes
            );
        }
        Duration::try_minutes(minutes)
            .with_context(|| format!("session_lifetime_minutes out of range: {}", minutes))
    }

    pub fn expiry_margin(&self) -> Result<Duration> {
        let seconds = self.expiry_margin_seconds;
        if !(0..=MAX_EXPIRY_MARGIN_SECONDS).contains(&seconds) {
            bail!(
                "expiry_margin_seconds must be between 0 and {}, got {}",
                MAX_EXPIRY_MARGIN_SECONDS,
                seconds
            );
        }
        Duration::try_seconds(seconds)
            .with_context(|| format!("expiry_margin_seconds out of range: {}", seconds))
    }

    /// Build the store the configured cache mode names
    pub fn credential_store(&self, secrets: &Secrets) -> Result<Arc<dyn CredentialStore>> {
        Ok(match self.cache {
            CacheMode::Memory => Arc::new(MemoryStore::new()),
            CacheMode::File => Arc::new(FileStore::plaintext(self.session_cache_path()?)),
            CacheMode::EncryptedFile => {
                let Some(key) = secrets.cache_key.clone() else {
                    bail!(
                        "Cache mode encrypted-file needs a key: set {} (generate one with `igtrade generate-key`)",
                        ENV_CACHE_KEY
                    );
                };
                Arc::new(FileStore::encrypted(self.session_cache_path()?, key))
            }
        })
    }

    pub fn session_cache(&self, secrets: &Secrets) -> Result<SessionCache> {
        Ok(SessionCache::new(self.credential_store(secrets)?).with_margin(self.expiry_margin()?))
    }

    /// Login settings for the configured account. The password must already
    /// be present in `secrets`.
    pub fn login_config(&self, secrets: &Secrets) -> Result<LoginConfig> {
        let Some(identifier) = self.identifier.clone() else {
            bail!("No account identifier: set {} or `identifier` in the config file", ENV_IDENTIFIER);
        };
        let Some(api_key) = secrets.api_key.clone() else {
            bail!("No API key: set {}", ENV_API_KEY);
        };
        let Some(password) = secrets.password.clone() else {
            bail!("No password: set {}", ENV_PASSWORD);
        };
        Ok(LoginConfig::new(self.base_url.clone(), api_key, identifier, password)
            .with_session_lifetime(self.session_lifetime()?))
    }
}

/// Secrets read from the environment. Debug output never shows them.
#[derive(Clone, Default)]
pub struct Secrets {
    pub api_key: Option<String>,
    pub password: Option<SecretString>,
    pub cache_key: Option<CacheKey>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shown = |present: bool| if present { "[REDACTED]" } else { "None" };
        f.debug_struct("Secrets")
            .field("api_key", &format_args!("{}", shown(self.api_key.is_some())))
            .field("password", &format_args!("{}", shown(self.password.is_some())))
            .field("cache_key", &format_args!("{}", shown(self.cache_key.is_some())))
            .finish()
    }
}

impl Secrets {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let present = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let cache_key = present(ENV_CACHE_KEY)
            .map(|encoded| CacheKey::from_base64(encoded.trim()))
            .transpose()
            .with_context(|| format!("Invalid {}", ENV_CACHE_KEY))?;
        Ok(Self {
            api_key: present(ENV_API_KEY),
            password: present(ENV_PASSWORD).map(SecretString::from),
            cache_key,
        })
    }
}
