use chrono::{DateTime, Duration, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::api::TransportError;
use crate::models::AccountInfo;

/// Header carrying the client session token (`CST`)
pub const CST_HEADER: &str = "cst";

/// Header carrying the account security token (`X-SECURITY-TOKEN`)
pub const SECURITY_TOKEN_HEADER: &str = "x-security-token";

/// Tokens granting access to the dealing API until `expiry`.
///
/// Built once per login and never patched: a new login replaces the whole
/// value. `expiry` is an absolute instant, so a session persisted to disk is
/// still judged correctly after a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    cst_token: String,
    security_token: String,
    expiry: DateTime<Utc>,
    account_info: AccountInfo,
}

impl Credentials {
    pub fn new(
        cst_token: impl Into<String>,
        security_token: impl Into<String>,
        expiry: DateTime<Utc>,
        account_info: AccountInfo,
    ) -> Self {
        Self {
            cst_token: cst_token.into(),
            security_token: security_token.into(),
            expiry,
            account_info,
        }
    }

    pub fn cst_token(&self) -> &str {
        &self.cst_token
    }

    pub fn security_token(&self) -> &str {
        &self.security_token
    }

    pub fn expiry(&self) -> DateTime<Utc> {
        self.expiry
    }

    pub fn account_info(&self) -> &AccountInfo {
        &self.account_info
    }

    /// Usable at `now` if it will still be valid once `margin` has passed.
    /// A margin reaching past the representable range never is.
    pub fn is_valid_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        now.checked_add_signed(margin)
            .is_some_and(|deadline| self.expiry > deadline)
    }

    pub fn time_until_expiry(&self, now: DateTime<Utc>) -> Duration {
        self.expiry - now
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        self.time_until_expiry(now).num_minutes().max(0)
    }

    /// Add the session token headers to an outgoing request
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<(), TransportError> {
        headers.insert(CST_HEADER, token_value(CST_HEADER, &self.cst_token)?);
        headers.insert(
            SECURITY_TOKEN_HEADER,
            token_value(SECURITY_TOKEN_HEADER, &self.security_token)?,
        );
        Ok(())
    }
}

fn token_value(name: &'static str, token: &str) -> Result<HeaderValue, TransportError> {
    let mut value = HeaderValue::from_str(token).map_err(|e| TransportError::InvalidHeader {
        name,
        reason: e.to_string(),
    })?;
    value.set_sensitive(true);
    Ok(value)
}
