//! Client library for the IG trading REST API.
//!
//! The crate is split the same way a request flows through it:
//! - [`cache`]: where session credentials live between logins (memory or file,
//!   optionally encrypted at rest)
//! - [`auth`]: credentials, the expiry-aware [`SessionCache`] and the
//!   [`AuthenticationService`] that decides between reuse and re-login
//! - [`models`]: serde types for every request and response shape
//! - [`validation`]: ordered cross-field rule-sets run before any request is sent
//! - [`api`]: the HTTP transport seam and the thin [`TradingClient`]
//!
//! Nothing in here retries, rate-limits or locks across calls. Those policies
//! belong to the caller.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod validation;

pub use api::{ReqwestTransport, RequestError, TradingClient, Transport, TransportError};
pub use auth::{
    AuthenticationError, AuthenticationService, Clock, Credentials, LoginConfig, ManualClock,
    SessionCache, SystemClock,
};
pub use cache::{CacheError, CacheKey, CredentialStore, FileStore, MemoryStore};
pub use config::{CacheMode, Config, Secrets};
pub use error::{Error, Result};
pub use validation::{RuleSet, RuleViolation, TradeRequest, Validate, ValidationError};
