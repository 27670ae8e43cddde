//! Credential wrappers
//!
//! Vendor passwords, client secrets, API keys and issued bearer tokens are
//! all held as [`SecretString`]. The inner value is zeroed on drop, `Debug`
//! prints `[REDACTED]`, and reading it requires an explicit
//! `expose_secret()` call at the point the credential goes on the wire.
//!
//! ```rust
//! use satchel::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let key = secret_string("sentral-api-key".to_string());
//! assert_eq!(key.expose_secret().as_str(), "sentral-api-key");
//! assert!(!format!("{key:?}").contains("sentral-api-key"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// String payload of a [`SecretString`]
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl SecretValue {
    /// Borrow the raw credential
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for an empty credential, which validation rejects
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl From<&str> for SecretValue {
    fn from(s: &str) -> Self {
        SecretValue(s.to_string())
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// A credential that is zeroized on drop and redacted in `Debug`
pub type SecretString = Secret<SecretValue>;

/// Wrap a plain string as a [`SecretString`]
#[inline]
pub fn secret_string(value: impl Into<String>) -> SecretString {
    Secret::new(SecretValue::from(value.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_string_exposes_value() {
        let secret = secret_string("client-secret");
        assert_eq!(secret.expose_secret().as_str(), "client-secret");
    }

    #[test]
    fn test_debug_is_redacted() {
        let secret = secret_string("do-not-log-me");
        let debug_output = format!("{secret:?}");
        assert!(!debug_output.contains("do-not-log-me"));
        assert!(debug_output.contains("REDACTED"));
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        assert!(secret_string("   ").expose_secret().is_empty());
        assert!(!secret_string("k").expose_secret().is_empty());
    }

    #[test]
    fn test_deserializes_from_plain_string() {
        #[derive(Deserialize)]
        struct VendorCreds {
            api_key: SecretString,
        }

        let creds: VendorCreds = toml::from_str("api_key = \"abc123\"").unwrap();
        assert_eq!(creds.api_key.expose_secret().as_str(), "abc123");
    }
}
