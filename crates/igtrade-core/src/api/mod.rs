//! REST API plumbing for the IG dealing gateway.
//!
//! This module provides the `Transport` seam (one request in, status +
//! headers + body out), its reqwest implementation, and the thin
//! `TradingClient` that validates trade requests before sending them.
//!
//! Every call authenticates with the API key plus the CST and
//! X-SECURITY-TOKEN pair obtained at login.

pub mod client;
pub mod error;
pub mod transport;

pub use client::TradingClient;
pub use error::RequestError;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
