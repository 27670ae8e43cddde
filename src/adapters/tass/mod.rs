//! TASS adapters
//!
//! Calendar and LMS are separate TASS applications sharing one RPC
//! convention: plaintext routing fields plus an AES-encrypted parameter
//! token in the query string.

pub mod calendar;
pub mod lms;
pub mod rpc;
pub mod token;

pub use calendar::TassCalendarClient;
pub use lms::TassLmsClient;
pub use token::TokenCipher;

#[cfg(test)]
pub(crate) fn test_config(endpoint: &str) -> crate::config::TassConfig {
    crate::config::TassConfig {
        endpoint: endpoint.to_string(),
        app_code: "APP".to_string(),
        company_code: "10".to_string(),
        token_key: crate::config::secret_string("MDEyMzQ1Njc4OWFiY2RlZg=="),
        calendar_version: "2".to_string(),
        lms_version: "3".to_string(),
        calendar_days_back: 90,
        calendar_days_forward: 1000,
        student_code: "all".to_string(),
    }
}
