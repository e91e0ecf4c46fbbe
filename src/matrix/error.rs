//! Errors returned by Matrix connector operations.

use thiserror::Error;

/// Errors that can occur while talking to the homeserver.
#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("{message} ({errcode})")]
    Api {
        status: u16,
        errcode: String,
        message: String,
    },

    #[error("Rate limited: retry after {0} ms")]
    RateLimited(u64),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl MatrixError {
    /// HTTP status code attached to the error, if any.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::RateLimited(_) => Some(429),
            Self::NotAuthorized(_) => Some(401),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Decode(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code() {
        let err = MatrixError::Api {
            status: 404,
            errcode: "M_NOT_FOUND".to_owned(),
            message: "Room alias not found".to_owned(),
        };
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.to_string(), "Room alias not found (M_NOT_FOUND)");
        assert_eq!(MatrixError::RateLimited(100).status_code(), Some(429));
        assert_eq!(MatrixError::Decode("x".to_owned()).status_code(), None);
    }
}
