//! Request signing
//!
//! Every PCSchool call carries `ts` (unix milliseconds) and `hmac`, the
//! uppercase hex HMAC-SHA256 of `api_key || ts` under the private key. The
//! vendor hashes Latin-1 bytes, not UTF-8.

use crate::domain::{Result, SatchelError};
use hmac::{Hmac, Mac};
use serde_json::{Map, Value};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Encode `text` as Latin-1
///
/// Fails on any character above U+00FF.
pub fn latin1_bytes(text: &str, what: &str) -> Result<Vec<u8>> {
    text.chars()
        .map(|c| {
            u8::try_from(u32::from(c)).map_err(|_| {
                SatchelError::Configuration(format!(
                    "{what} contains '{c}', which is not representable in Latin-1"
                ))
            })
        })
        .collect()
}

/// Uppercase hex signature of `api_key || ts`
pub fn sign(private_key: &str, api_key: &str, ts: i64) -> Result<String> {
    let key = latin1_bytes(private_key, "pcschool private key")?;
    let message = latin1_bytes(&format!("{api_key}{ts}"), "pcschool api key")?;

    let mut mac = <HmacSha256 as Mac>::new_from_slice(&key)
        .map_err(|e| SatchelError::Configuration(format!("pcschool private key: {e}")))?;
    mac.update(&message);
    Ok(hex::encode_upper(mac.finalize().into_bytes()))
}

/// Current timestamp in the vendor's format
///
/// Milliseconds, truncated to the whole second.
pub fn timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp() * 1000
}

/// Add `ts` and `hmac` to a JSON object payload
pub fn sign_payload(
    payload: &Map<String, Value>,
    private_key: &str,
    api_key: &str,
    ts: i64,
) -> Result<Value> {
    let mut signed = payload.clone();
    signed.insert("ts".to_string(), Value::from(ts));
    signed.insert("hmac".to_string(), Value::from(sign(private_key, api_key, ts)?));
    Ok(Value::Object(signed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_known_vectors() {
        assert_eq!(
            sign("private-key", "api-key", 1_700_000_000_000).unwrap(),
            "AFA73747F354C18D59C9725E9052C2E0DA78461D359BE1B56274F2A7A8B541A5"
        );
        assert_eq!(
            sign("secret", "API123", 1_609_459_200_000).unwrap(),
            "FC391D4BA2A8236255613403ACDBE658FA019722AF570EFF2CE46A1798AC6C97"
        );
    }

    #[test]
    fn test_latin1_accepts_high_bytes() {
        assert_eq!(latin1_bytes("café", "k").unwrap(), vec![b'c', b'a', b'f', 0xE9]);
    }

    #[test]
    fn test_non_latin1_key_is_configuration_error() {
        let err = sign("kéy€", "api", 1).unwrap_err();
        assert!(matches!(err, SatchelError::Configuration(_)));
        assert!(err.to_string().contains('€'));
    }

    #[test]
    fn test_sign_payload_appends_fields() {
        let payload = json!({"Event": "HOUSE"});
        let signed =
            sign_payload(payload.as_object().unwrap(), "private-key", "api-key", 1_700_000_000_000)
                .unwrap();
        assert_eq!(signed["Event"], "HOUSE");
        assert_eq!(signed["ts"], 1_700_000_000_000_i64);
        assert_eq!(
            signed["hmac"],
            "AFA73747F354C18D59C9725E9052C2E0DA78461D359BE1B56274F2A7A8B541A5"
        );
    }

    #[test]
    fn test_timestamp_is_whole_seconds() {
        assert_eq!(timestamp_ms() % 1000, 0);
    }
}
