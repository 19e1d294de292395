use thiserror::Error;

use super::TransportError;

/// An authenticated call failed after it was allowed onto the network.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Unauthorized - session may have expired")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error {status}: {body}")]
    Server { status: u16, body: String },

    #[error("Unexpected status {status}: {body}")]
    Unexpected { status: u16, body: String },

    #[error("Network error: {0}")]
    Transport(#[from] TransportError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Truncate a response body to avoid logging excessive data
pub(crate) fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}

impl RequestError {
    pub fn from_status(status: u16, body: &str) -> Self {
        let truncated = truncate_body(body);
        match status {
            401 => RequestError::Unauthorized,
            403 => RequestError::AccessDenied(truncated),
            404 => RequestError::NotFound(truncated),
            429 => RequestError::RateLimited,
            500..=599 => RequestError::Server {
                status,
                body: truncated,
            },
            _ => RequestError::Unexpected {
                status,
                body: truncated,
            },
        }
    }

    /// HTTP status behind the failure, when there was a response
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Unauthorized => Some(401),
            RequestError::AccessDenied(_) => Some(403),
            RequestError::NotFound(_) => Some(404),
            RequestError::RateLimited => Some(429),
            RequestError::Server { status, .. } | RequestError::Unexpected { status, .. } => {
                Some(*status)
            }
            RequestError::Transport(_) | RequestError::InvalidResponse(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(RequestError::from_status(401, ""), RequestError::Unauthorized));
        assert!(matches!(RequestError::from_status(403, "no"), RequestError::AccessDenied(_)));
        assert!(matches!(RequestError::from_status(404, ""), RequestError::NotFound(_)));
        assert!(matches!(RequestError::from_status(429, ""), RequestError::RateLimited));
        assert!(matches!(
            RequestError::from_status(503, ""),
            RequestError::Server { status: 503, .. }
        ));
        assert!(matches!(
            RequestError::from_status(400, "bad"),
            RequestError::Unexpected { status: 400, .. }
        ));
    }

    #[test]
    fn test_status_is_preserved() {
        for status in [400, 401, 403, 404, 429, 500, 502] {
            assert_eq!(RequestError::from_status(status, "").status(), Some(status));
        }
        assert_eq!(RequestError::InvalidResponse("x".into()).status(), None);
    }

    #[test]
    fn test_truncate_body() {
        let short = "error.service.invalid";
        assert_eq!(truncate_body(short), short);

        let long = "x".repeat(1200);
        let truncated = truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.ends_with("(truncated, 1200 total bytes)"));
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let long = "£".repeat(400);
        let truncated = truncate_body(&long);
        assert!(truncated.contains("truncated"));
    }
}
