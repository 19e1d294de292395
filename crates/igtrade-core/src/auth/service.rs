use std::sync::Arc;

use chrono::Duration;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::api::error::truncate_body;
use crate::api::transport::gateway_headers;
use crate::api::{HttpRequest, RequestError, Transport};
use crate::cache::CacheError;
use crate::error::Result;
use crate::models::AccountInfo;

use super::credentials::{CST_HEADER, SECURITY_TOKEN_HEADER};
use super::{AuthenticationError, Clock, Credentials, SessionCache, SystemClock};

/// IG sessions stay valid for six hours after login
pub const DEFAULT_SESSION_LIFETIME_MINUTES: i64 = 6 * 60;

/// Endpoint version used for login
const LOGIN_VERSION: u16 = 2;

/// Endpoint version used for logout
const LOGOUT_VERSION: u16 = 1;

/// Account and endpoint details needed to log in
pub struct LoginConfig {
    /// Gateway root, e.g. `https://demo-api.ig.com`
    pub base_url: String,
    pub api_key: String,
    pub identifier: String,
    pub password: SecretString,
    pub session_lifetime: Duration,
}

impl LoginConfig {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        identifier: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            identifier: identifier.into(),
            password,
            session_lifetime: Duration::minutes(DEFAULT_SESSION_LIFETIME_MINUTES),
        }
    }

    pub fn with_session_lifetime(mut self, lifetime: Duration) -> Self {
        self.session_lifetime = lifetime;
        self
    }

    fn session_url(&self) -> String {
        format!("{}/gateway/deal/session", self.base_url)
    }
}

impl std::fmt::Debug for LoginConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginConfig")
            .field("base_url", &self.base_url)
            .field("identifier", &self.identifier)
            .field("session_lifetime", &self.session_lifetime)
            .finish_non_exhaustive()
    }
}

/// Hands out a usable session, logging in only when the cache has none.
///
/// The service keeps no state between calls; the cache does. It takes no
/// locks either: if two callers sharing one service both miss the cache,
/// both log in and the later login's credentials end up cached.
pub struct AuthenticationService {
    config: LoginConfig,
    transport: Arc<dyn Transport>,
    cache: Option<SessionCache>,
    clock: Arc<dyn Clock>,
}

impl AuthenticationService {
    /// A service without a cache: every `authenticate` call logs in
    pub fn new(config: LoginConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            cache: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Reuse sessions from `cache`. The cache's clock also stamps new expiries.
    pub fn with_cache(mut self, cache: SessionCache) -> Self {
        self.clock = cache.clock();
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &LoginConfig {
        &self.config
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    pub fn cache(&self) -> Option<&SessionCache> {
        self.cache.as_ref()
    }

    /// Return a session valid for at least the cache margin.
    ///
    /// A cache hit costs no network call. A miss logs in once and stores the
    /// result. An unreadable cache surfaces as `Error::Cache`; call
    /// `clear_cache` and try again to start fresh.
    pub async fn authenticate(&self) -> Result<Credentials> {
        if let Some(cache) = &self.cache {
            if let Some(credentials) = cache.get_valid()? {
                return Ok(credentials);
            }
        }

        let credentials = self.login().await?;
        if let Some(cache) = &self.cache {
            cache.put(&credentials)?;
        }
        Ok(credentials)
    }

    /// Log in unconditionally, bypassing and not updating the cache
    pub async fn login(&self) -> Result<Credentials, AuthenticationError> {
        let headers = gateway_headers(&self.config.api_key, LOGIN_VERSION)?;
        let body = serde_json::json!({
            "identifier": self.config.identifier,
            "password": self.config.password.expose_secret(),
        });
        let request = HttpRequest::new(Method::POST, self.config.session_url(), headers).json(body);

        info!(identifier = %self.config.identifier, "Logging in");
        let response = self.transport.send(request).await.map_err(|e| {
            warn!(error = %e, "Login request failed");
            AuthenticationError::from(e)
        })?;

        if !response.is_success() {
            let status = response.status.as_u16();
            warn!(status, "Login rejected");
            return Err(AuthenticationError::Rejected {
                status,
                body: truncate_body(&response.body),
            });
        }

        let cst = response
            .header(CST_HEADER)
            .ok_or(AuthenticationError::MissingToken("CST"))?;
        let security_token = response
            .header(SECURITY_TOKEN_HEADER)
            .ok_or(AuthenticationError::MissingToken("X-SECURITY-TOKEN"))?;
        let account_info: AccountInfo = response
            .json()
            .map_err(|e| AuthenticationError::InvalidResponse(e.to_string()))?;

        let now = self.clock.now();
        let expiry = now
            .checked_add_signed(self.config.session_lifetime)
            .ok_or_else(|| {
                AuthenticationError::InvalidResponse(format!(
                    "session lifetime {} overflows the expiry from {}",
                    self.config.session_lifetime, now
                ))
            })?;
        debug!(account = %account_info.current_account_id, %expiry, "Login succeeded");
        Ok(Credentials::new(cst, security_token, expiry, account_info))
    }

    /// End the session on the broker side and drop it from the cache.
    ///
    /// The cache is cleared even if the broker call fails, since the caller
    /// has asked to stop using this session either way.
    pub async fn logout(&self, credentials: &Credentials) -> Result<()> {
        let mut headers =
            gateway_headers(&self.config.api_key, LOGOUT_VERSION).map_err(RequestError::from)?;
        credentials.apply(&mut headers).map_err(RequestError::from)?;
        let request = HttpRequest::new(Method::DELETE, self.config.session_url(), headers);

        let outcome = match self.transport.send(request).await {
            Ok(response) if response.is_success() => Ok(()),
            Ok(response) => Err(RequestError::from_status(
                response.status.as_u16(),
                &response.body,
            )),
            Err(e) => Err(RequestError::from(e)),
        };

        if let Err(e) = self.clear_cache() {
            if let Err(ref broker) = outcome {
                warn!(error = %broker, "Logout request failed");
            }
            return Err(e.into());
        }
        info!("Logged out");
        Ok(outcome?)
    }

    pub fn clear_cache(&self) -> Result<(), CacheError> {
        match &self.cache {
            Some(cache) => cache.clear(),
            None => Ok(()),
        }
    }
}
