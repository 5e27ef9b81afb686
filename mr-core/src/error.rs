//! Global error types for meetrec.
//!
//! All error categories across the workspace are unified into a single
//! `MrError` enum with conversions from underlying library errors.

use thiserror::Error;

/// Convenience type alias for Results using MrError.
pub type MrResult<T> = Result<T, MrError>;

/// Unified error type covering all error categories in meetrec.
#[derive(Error, Debug)]
pub enum MrError {
    // -- Configuration errors --
    /// Failed to load or parse application configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required configuration value is missing.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    /// A server or socket address could not be parsed or resolved.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    // -- Network errors --
    /// HTTP request failed.
    #[error("http error: {0}")]
    Http(String),

    /// HTTP request timed out.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// WebSocket transport error.
    #[error("websocket error: {0}")]
    WebSocket(String),

    /// Server returned a 5xx response.
    #[error("server error (status {status}): {message}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// Server rejected the request with a `detail` message (4xx).
    #[error("request rejected (status {status}): {detail}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// The `detail` field of the error body.
        detail: String,
    },

    /// Authentication failed or the stored token expired.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// No stored session; the user has to log in first.
    #[error("not logged in")]
    NotLoggedIn,

    // -- Payload errors --
    /// An inbound event payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    // -- File/IO errors --
    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    // -- Generic --
    /// An unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Wrapping anyhow errors for interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MrError {
    /// Whether this error means the stored credentials are no longer usable.
    pub fn is_auth(&self) -> bool {
        matches!(self, MrError::AuthFailed(_) | MrError::NotLoggedIn)
    }
}

impl From<serde_json::Error> for MrError {
    fn from(e: serde_json::Error) -> Self {
        MrError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for MrError {
    fn from(e: toml::de::Error) -> Self {
        MrError::Config(e.to_string())
    }
}

impl From<url::ParseError> for MrError {
    fn from(e: url::ParseError) -> Self {
        MrError::InvalidAddress(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mr_error_display() {
        let err = MrError::Config("bad value".to_string());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }

    #[test]
    fn test_api_error_display() {
        let err = MrError::Api {
            status: 400,
            detail: "already recording".into(),
        };
        assert_eq!(
            err.to_string(),
            "request rejected (status 400): already recording"
        );
    }

    #[test]
    fn test_is_auth() {
        assert!(MrError::AuthFailed("401".into()).is_auth());
        assert!(MrError::NotLoggedIn.is_auth());
        assert!(!MrError::Timeout("slow".into()).is_auth());
    }

    #[test]
    fn test_url_parse_error_conversion() {
        let err: MrError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, MrError::InvalidAddress(_)));
    }
}
