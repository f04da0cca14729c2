//! Custom error types for rustscopus.
//!
//! Every library function returns `Result<T, ScopusError>`. The display form of
//! [`ScopusError::Api`] is the exact message shown to users when Scopus rejects
//! a request.

use thiserror::Error;

/// Main error type for rustscopus operations.
#[derive(Debug, Error)]
pub enum ScopusError {
    /// Scopus answered with a non-success HTTP status
    #[error("Error: {code} - {body}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Raw response body
        body: String,
    },

    /// Network/HTTP transport error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body did not have the expected `search-results` shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Search request failed validation before any request was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV export error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ScopusError {
    /// HTTP status to report when this error is surfaced by the server.
    pub fn status_code(&self) -> u16 {
        match self {
            ScopusError::Validation(_) => 400,
            ScopusError::Api { .. } | ScopusError::Network(_) | ScopusError::MalformedResponse(_) => 502,
            _ => 500,
        }
    }
}

/// Result type alias using `ScopusError`
pub type Result<T> = std::result::Result<T, ScopusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message() {
        let err = ScopusError::Api {
            code: 401,
            body: "{\"error\":\"Invalid API Key\"}".to_string(),
        };
        assert_eq!(err.to_string(), "Error: 401 - {\"error\":\"Invalid API Key\"}");
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn test_validation_status() {
        let err = ScopusError::Validation("empty query".to_string());
        assert_eq!(err.status_code(), 400);
    }
}
