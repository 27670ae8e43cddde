//! Domain error types
//!
//! This module defines the error hierarchy for Satchel. Vendor clients never
//! expose HTTP or SQL driver error types; everything is mapped into
//! [`VendorError`] with the vendor name attached.

use thiserror::Error;

/// Main Satchel error type
///
/// This is the primary error type used throughout the library.
#[derive(Debug, Error)]
pub enum SatchelError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Errors raised while talking to a vendor system
    #[error("Vendor error: {0}")]
    Vendor(#[from] VendorError),

    /// Errors raised by a record sink
    #[error("Sink error: {0}")]
    Sink(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Vendor-specific errors
///
/// Every variant names the vendor so that a log line is actionable without
/// the surrounding span.
#[derive(Debug, Error)]
pub enum VendorError {
    /// Credentials were rejected; carries the raw response text
    #[error("{vendor}: authentication failed: {message}")]
    AuthenticationFailed { vendor: String, message: String },

    /// A data call was attempted before `authenticate()`
    #[error("{vendor}: not authenticated, call authenticate() first")]
    NotAuthenticated { vendor: String },

    /// Transport-level failure (DNS, TLS, connection reset, timeout)
    #[error("{vendor}: connection failed: {message}")]
    ConnectionFailed { vendor: String, message: String },

    /// Client error (4xx)
    #[error("{vendor}: client error: {status} - {message}")]
    ClientError {
        vendor: String,
        status: u16,
        message: String,
    },

    /// Server error (5xx)
    #[error("{vendor}: server error: {status} - {message}")]
    ServerError {
        vendor: String,
        status: u16,
        message: String,
    },

    /// The body did not have the expected shape
    #[error("{vendor}: invalid response: {message}")]
    InvalidResponse { vendor: String, message: String },

    /// The vendor does not expose the requested collection
    #[error("{vendor}: unsupported collection '{collection}'")]
    UnsupportedCollection { vendor: String, collection: String },

    /// SQL execution failed
    #[error("{vendor}: query failed: {message}")]
    QueryFailed { vendor: String, message: String },
}

impl VendorError {
    /// Whether a retry has a chance of succeeding
    ///
    /// Transport failures, 5xx and 429 are retryable. Authentication and
    /// shape errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            VendorError::ConnectionFailed { .. } | VendorError::ServerError { .. } => true,
            VendorError::ClientError { status, .. } => *status == 429,
            _ => false,
        }
    }

    /// Build an invalid-response error
    pub fn invalid_response(vendor: impl Into<String>, message: impl Into<String>) -> Self {
        VendorError::InvalidResponse {
            vendor: vendor.into(),
            message: message.into(),
        }
    }

    /// Build the 4xx/5xx error matching `status`
    pub fn from_status(vendor: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        let vendor = vendor.into();
        let message = message.into();
        if status >= 500 {
            VendorError::ServerError {
                vendor,
                status,
                message,
            }
        } else {
            VendorError::ClientError {
                vendor,
                status,
                message,
            }
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for SatchelError {
    fn from(err: std::io::Error) -> Self {
        SatchelError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SatchelError {
    fn from(err: serde_json::Error) -> Self {
        SatchelError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SatchelError {
    fn from(err: toml::de::Error) -> Self {
        SatchelError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_satchel_error_display() {
        let err = SatchelError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_authentication_error_carries_response_text() {
        let err = VendorError::AuthenticationFailed {
            vendor: "edumate".to_string(),
            message: "{\"error\":\"invalid_client\"}".to_string(),
        };
        let text = err.to_string();
        assert!(text.starts_with("edumate: authentication failed"));
        assert!(text.contains("invalid_client"));
    }

    #[test]
    fn test_vendor_error_conversion() {
        let err: SatchelError = VendorError::invalid_response("sentral", "missing links").into();
        assert!(matches!(err, SatchelError::Vendor(_)));
    }

    #[test]
    fn test_from_status_splits_client_and_server() {
        assert!(matches!(
            VendorError::from_status("engage", 404, "nope"),
            VendorError::ClientError { status: 404, .. }
        ));
        assert!(matches!(
            VendorError::from_status("engage", 502, "bad gateway"),
            VendorError::ServerError { status: 502, .. }
        ));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(VendorError::from_status("x", 503, "").is_retryable());
        assert!(VendorError::from_status("x", 429, "").is_retryable());
        assert!(!VendorError::from_status("x", 400, "").is_retryable());
        assert!(!VendorError::AuthenticationFailed {
            vendor: "x".to_string(),
            message: String::new()
        }
        .is_retryable());
        assert!(VendorError::ConnectionFailed {
            vendor: "x".to_string(),
            message: "reset".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: SatchelError = io_err.into();
        assert!(matches!(err, SatchelError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: SatchelError = toml_err.into();
        assert!(err.to_string().contains("TOML parse error"));
    }
}
