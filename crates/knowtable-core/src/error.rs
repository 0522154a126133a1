//! Error types for knowtable

use thiserror::Error;

/// Result type alias using KnowtableError
pub type Result<T> = std::result::Result<T, KnowtableError>;

/// Error type alias for convenience
pub type Error = KnowtableError;

/// Main error type for knowtable
///
/// Only failures the caller has to act on end up here. A provider reply that
/// cannot be read against an output contract is not an error: the services
/// turn it into an absent result.
#[derive(Debug, Error)]
pub enum KnowtableError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("External service error: {0}")]
    ExternalError(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl KnowtableError {
    /// Build the error for a non-success HTTP status returned by the provider
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 => Self::Authentication(body),
            429 => Self::RateLimited(body),
            _ => Self::ExternalError(format!("LLM provider error (HTTP {}): {}", status, body)),
        }
    }

    /// Whether the provider rejected our credential
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_status_mapping() {
        let err = KnowtableError::from_status(StatusCode::UNAUTHORIZED, "bad key".to_string());
        assert!(err.is_auth_error());

        let err = KnowtableError::from_status(StatusCode::TOO_MANY_REQUESTS, "slow down".to_string());
        assert!(matches!(err, KnowtableError::RateLimited(ref body) if body == "slow down"));

        let err = KnowtableError::from_status(StatusCode::BAD_REQUEST, "nope".to_string());
        match err {
            KnowtableError::ExternalError(msg) => {
                assert!(msg.contains("400"));
                assert!(msg.contains("nope"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
