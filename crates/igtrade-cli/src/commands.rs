use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use chrono::Utc;
use tracing::warn;

use secrecy::SecretString;

use igtrade_core::config::{ENV_API_KEY, ENV_PASSWORD};
use igtrade_core::{
    AuthenticationService, CacheError, CacheKey, CacheMode, Config, Credentials, CredentialStore,
    FileStore, ReqwestTransport, RuleSet, Secrets, SessionCache, TradeRequest, TradingClient,
    Transport,
};

use crate::format;

/// Settings and secrets for commands that talk to the broker
pub struct Context {
    config: Config,
    secrets: Secrets,
}

impl Context {
    pub fn load() -> Result<Self> {
        Ok(Self {
            config: Config::load()?.with_env_overrides(),
            secrets: Secrets::from_env()?,
        })
    }

    fn api_key(&self) -> Result<String> {
        self.secrets
            .api_key
            .clone()
            .with_context(|| format!("No API key: set {}", ENV_API_KEY))
    }

    fn transport(&self) -> Result<Arc<dyn Transport>> {
        Ok(Arc::new(ReqwestTransport::new()?))
    }

    /// Login settings, prompting for the password when the environment has none
    fn auth_service(
        &self,
        transport: Arc<dyn Transport>,
        cache: SessionCache,
    ) -> Result<AuthenticationService> {
        let mut secrets = self.secrets.clone();
        if secrets.password.is_none() {
            let prompt = match &self.config.identifier {
                Some(identifier) => format!("IG password for {}: ", identifier),
                None => "IG password: ".to_string(),
            };
            let password = rpassword::prompt_password(prompt)
                .with_context(|| format!("Failed to read password (or set {})", ENV_PASSWORD))?;
            secrets.password = Some(SecretString::from(password));
        }
        let login = self.config.login_config(&secrets)?;
        Ok(AuthenticationService::new(login, transport).with_cache(cache))
    }

    /// Reuse the cached session or log in. An unreadable cache is cleared and
    /// replaced by a fresh login.
    async fn session(&self, transport: Arc<dyn Transport>) -> Result<Credentials> {
        let cache = self.config.session_cache(&self.secrets)?;
        if let Some(credentials) = cached_session(&cache)? {
            return Ok(credentials);
        }
        let service = self.auth_service(transport, cache)?;
        Ok(service.authenticate().await?)
    }

    async fn client(&self) -> Result<TradingClient> {
        let transport = self.transport()?;
        let credentials = self.session(Arc::clone(&transport)).await?;
        Ok(TradingClient::new(
            transport,
            self.config.base_url.clone(),
            self.api_key()?,
            credentials,
        ))
    }
}

/// Valid cached credentials, if any. An unreadable cache is discarded and
/// reads as empty.
fn cached_session(cache: &SessionCache) -> Result<Option<Credentials>> {
    match cache.get_valid() {
        Ok(credentials) => Ok(credentials),
        Err(e @ CacheError::Corrupted { .. }) => {
            warn!(error = %e, "Discarding unreadable session cache");
            eprintln!("Session cache unreadable ({}); discarded", e);
            cache.clear()?;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn login(ctx: &Context) -> Result<()> {
    let client = ctx.client().await?;
    let credentials = client.credentials();
    let account = credentials.account_info();

    println!("Account:  {} ({})", account.current_account_id, account.account_type);
    println!("Client:   {}", account.client_id);
    println!(
        "Balance:  {} {} (available {})",
        account.account_info.balance, account.currency_iso_code, account.account_info.available
    );
    println!("Session:  {}", format::session_expiry(credentials.expiry(), Utc::now()));
    Ok(())
}

pub async fn logout(ctx: &Context) -> Result<()> {
    let cache = ctx.config.session_cache(&ctx.secrets)?;
    let Some(credentials) = cached_session(&cache)? else {
        cache.clear()?;
        println!("No active session");
        return Ok(());
    };

    // Logout only needs the session tokens; the password is never sent
    let mut secrets = ctx.secrets.clone();
    secrets
        .password
        .get_or_insert_with(|| SecretString::from(String::new()));
    let service = AuthenticationService::new(ctx.config.login_config(&secrets)?, ctx.transport()?)
        .with_cache(cache);
    service.logout(&credentials).await?;
    println!("Logged out");
    Ok(())
}

pub fn clear_cache(ctx: &Context) -> Result<()> {
    match ctx.config.cache {
        CacheMode::Memory => println!("Memory cache selected; nothing to clear"),
        CacheMode::File | CacheMode::EncryptedFile => {
            // Deleting the file needs no key
            let path = ctx.config.session_cache_path()?;
            FileStore::plaintext(&path).clear()?;
            println!("Cleared {}", path.display());
        }
    }
    Ok(())
}

pub fn generate_key() -> Result<()> {
    println!("{}", CacheKey::generate().to_base64());
    Ok(())
}

pub async fn positions(ctx: &Context) -> Result<()> {
    let positions = ctx.client().await?.open_positions().await?;
    if positions.positions.is_empty() {
        println!("No open positions");
        return Ok(());
    }
    println!("{}", format::positions_table(&positions.positions));
    Ok(())
}

pub async fn orders(ctx: &Context) -> Result<()> {
    let orders = ctx.client().await?.working_orders().await?;
    if orders.working_orders.is_empty() {
        println!("No working orders");
        return Ok(());
    }
    println!("{}", format::orders_table(&orders.working_orders));
    Ok(())
}

pub async fn confirm(ctx: &Context, deal_reference: &str) -> Result<()> {
    let confirmation = ctx.client().await?.deal_confirmation(deal_reference).await?;
    println!("{}", format::confirmation(&confirmation));
    Ok(())
}

/// Check a request body offline and print every violation
pub fn validate(rule_set: RuleSet, path: &Path) -> Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let request = TradeRequest::from_json(rule_set, &json)
        .with_context(|| format!("{} is not a valid {} body", path.display(), rule_set))?;

    let violations = request.violations();
    if violations.is_empty() {
        println!("OK: {} is a valid {} request", path.display(), rule_set);
        return Ok(());
    }
    for violation in &violations {
        println!("{}", format::violation(violation));
    }
    bail!("{} rule violation(s) in {}", violations.len(), path.display())
}

pub fn rules(rule_sets: &[RuleSet]) -> Result<()> {
    for rule_set in rule_sets {
        println!("{}", rule_set);
        for (id, message) in rule_set.describe() {
            println!("  {:<40} {}", id, message);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_cached_session_discards_unreadable_cache() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not a session").unwrap();
        let cache = SessionCache::new(Arc::new(FileStore::plaintext(&path)));

        assert!(cached_session(&cache).unwrap().is_none());
        assert!(!path.exists());
        assert!(cache.get_valid().unwrap().is_none());
    }

    #[test]
    fn test_cached_session_empty_cache() {
        let dir = TempDir::new().unwrap();
        let cache = SessionCache::new(Arc::new(FileStore::plaintext(dir.path().join("session.json"))));
        assert!(cached_session(&cache).unwrap().is_none());
    }

    #[test]
    fn test_cached_session_other_errors_propagate() {
        // A directory where the cache file should be cannot be read
        let dir = TempDir::new().unwrap();
        let cache = SessionCache::new(Arc::new(FileStore::plaintext(dir.path())));
        assert!(cached_session(&cache).is_err());
    }
}
