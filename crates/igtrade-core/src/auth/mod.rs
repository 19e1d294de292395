//! Authentication module for managing broker sessions.
//!
//! This module provides:
//! - `Credentials`: the CST / X-SECURITY-TOKEN pair with its absolute expiry
//! - `SessionCache`: expiry-aware lookup over any `CredentialStore`
//! - `AuthenticationService`: reuses a still-valid cached session or logs in
//!
//! IG sessions last about six hours. Cached credentials are treated as
//! expired a configurable margin before that, so a request is never built
//! on a token that lapses mid-flight.

pub mod clock;
pub mod credentials;
pub mod error;
pub mod service;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use credentials::Credentials;
pub use error::AuthenticationError;
pub use service::{AuthenticationService, LoginConfig, DEFAULT_SESSION_LIFETIME_MINUTES};
pub use session::{SessionCache, DEFAULT_EXPIRY_MARGIN_SECONDS};
