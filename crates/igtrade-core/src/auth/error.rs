use thiserror::Error;

use crate::api::TransportError;

/// The login call failed. Never retried by the library.
#[derive(Error, Debug)]
pub enum AuthenticationError {
    #[error("Login rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Login request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Login response is missing the {0} header")]
    MissingToken(&'static str),

    #[error("Invalid login response: {0}")]
    InvalidResponse(String),
}

impl AuthenticationError {
    /// HTTP status of a rejected login, if the broker answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthenticationError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
