//! Encrypted request tokens
//!
//! TASS reads call parameters from a `token` query value: the parameter
//! string, PKCS#7-padded, encrypted with AES in ECB mode under the
//! pre-shared key and base64-encoded. The AES variant follows the decoded
//! key length.

use crate::domain::{Result, SatchelError};
use aes::cipher::{BlockDecrypt, BlockEncrypt, InvalidLength, KeyInit};
use aes::{Aes128, Aes192, Aes256, Block};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use url::form_urlencoded;

const BLOCK_SIZE: usize = 16;

enum Aes {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl Aes {
    fn encrypt_block(&self, block: &mut Block) {
        match self {
            Aes::Aes128(c) => c.encrypt_block(block),
            Aes::Aes192(c) => c.encrypt_block(block),
            Aes::Aes256(c) => c.encrypt_block(block),
        }
    }

    fn decrypt_block(&self, block: &mut Block) {
        match self {
            Aes::Aes128(c) => c.decrypt_block(block),
            Aes::Aes192(c) => c.decrypt_block(block),
            Aes::Aes256(c) => c.decrypt_block(block),
        }
    }
}

/// AES-ECB cipher built from the base64 token key
pub struct TokenCipher {
    cipher: Aes,
}

impl std::fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bits = match self.cipher {
            Aes::Aes128(_) => 128,
            Aes::Aes192(_) => 192,
            Aes::Aes256(_) => 256,
        };
        f.debug_struct("TokenCipher").field("bits", &bits).finish()
    }
}

impl TokenCipher {
    /// Decode `token_key` and pick AES-128, -192 or -256
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid base64 or a decoded key
    /// that is not 16, 24 or 32 bytes.
    pub fn from_base64_key(token_key: &str) -> Result<Self> {
        let key = BASE64.decode(token_key.trim()).map_err(|e| {
            SatchelError::Configuration(format!("tass.token_key is not valid base64: {e}"))
        })?;
        let invalid = |e: InvalidLength| SatchelError::Configuration(format!("tass.token_key: {e}"));
        let cipher = match key.len() {
            16 => Aes::Aes128(Aes128::new_from_slice(&key).map_err(invalid)?),
            24 => Aes::Aes192(Aes192::new_from_slice(&key).map_err(invalid)?),
            32 => Aes::Aes256(Aes256::new_from_slice(&key).map_err(invalid)?),
            n => {
                return Err(SatchelError::Configuration(format!(
                    "tass.token_key decodes to {n} bytes; expected 16, 24 or 32"
                )))
            }
        };
        Ok(Self { cipher })
    }

    /// Encrypt `params` into a base64 token
    pub fn encrypt(&self, params: &str) -> String {
        let mut data = pkcs7_pad(params.as_bytes());
        for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
            self.cipher.encrypt_block(Block::from_mut_slice(chunk));
        }
        BASE64.encode(data)
    }

    /// Reverse of [`TokenCipher::encrypt`]
    pub fn decrypt(&self, token: &str) -> Result<String> {
        let mut data = BASE64
            .decode(token)
            .map_err(|e| SatchelError::Validation(format!("token is not valid base64: {e}")))?;
        if data.is_empty() || data.len() % BLOCK_SIZE != 0 {
            return Err(SatchelError::Validation(format!(
                "token length {} is not a positive multiple of {BLOCK_SIZE}",
                data.len()
            )));
        }
        for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
            self.cipher.decrypt_block(Block::from_mut_slice(chunk));
        }
        let plain = pkcs7_unpad(&data)?;
        String::from_utf8(plain.to_vec())
            .map_err(|e| SatchelError::Validation(format!("token is not UTF-8: {e}")))
    }
}

/// Pad to a multiple of 16; a full block is added when already aligned
pub fn pkcs7_pad(data: &[u8]) -> Vec<u8> {
    let pad = BLOCK_SIZE - data.len() % BLOCK_SIZE;
    let mut padded = Vec::with_capacity(data.len() + pad);
    padded.extend_from_slice(data);
    padded.resize(data.len() + pad, pad as u8);
    padded
}

fn pkcs7_unpad(data: &[u8]) -> Result<&[u8]> {
    let pad = data.last().copied().unwrap_or(0) as usize;
    let valid = (1..=BLOCK_SIZE).contains(&pad)
        && pad <= data.len()
        && data[data.len() - pad..].iter().all(|&b| b as usize == pad);
    if !valid {
        return Err(SatchelError::Validation("invalid PKCS#7 padding".to_string()));
    }
    Ok(&data[..data.len() - pad])
}

/// Plaintext fields sent next to the token
#[derive(Debug, Clone)]
pub struct RpcEnvelope<'a> {
    pub method: &'a str,
    pub app_code: &'a str,
    pub company_code: &'a str,
    pub version: &'a str,
}

/// `endpoint?method=..&appcode=..&company=..&v=..&token=..`
pub fn request_url(endpoint: &str, envelope: &RpcEnvelope<'_>, token: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("method", envelope.method)
        .append_pair("appcode", envelope.app_code)
        .append_pair("company", envelope.company_code)
        .append_pair("v", envelope.version)
        .append_pair("token", token)
        .finish();
    format!("{endpoint}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const KEY_128: &str = "MDEyMzQ1Njc4OWFiY2RlZg==";
    const KEY_192: &str = "MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3";
    const KEY_256: &str = "MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY=";

    #[test_case(KEY_128, "{'code': 'all'}", "UiKcRZDL1uJ4uyHOeGBfmA==" ; "aes128")]
    #[test_case(KEY_128, "0123456789abcdef", "cnJ+iB7c/QEApxhoeQm1ZTdyIuBhqSTFkc2cJ+oWPtQ=" ; "aes128 full padding block")]
    #[test_case(KEY_192, "{'code': 'all'}", "OB7DD13WkyV65x6yfV9bbw==" ; "aes192")]
    #[test_case(KEY_256, "{'code': 'all'}", "M5Xs/H3L3r1iJng8tUx4HQ==" ; "aes256")]
    fn test_known_tokens(key: &str, params: &str, expected: &str) {
        let cipher = TokenCipher::from_base64_key(key).unwrap();
        assert_eq!(cipher.encrypt(params), expected);
    }

    #[test]
    fn test_token_round_trips() {
        let cipher = TokenCipher::from_base64_key(KEY_128).unwrap();
        let params = r"{'start_date':'1\/2\/2024', 'end_date':'28\/10\/2026'}";
        let token = cipher.encrypt(params);
        assert_eq!(
            token,
            "hmclQu68evoc+1zR8v2ZmtaGeT0UIzanoWt8ZD6DrHbz8lMgVFqYBEGZjVlymBKQL4cHVUnZDWFZ3LFxtsAXjQ=="
        );
        assert_eq!(cipher.decrypt(&token).unwrap(), params);
    }

    #[test]
    fn test_padding() {
        assert_eq!(pkcs7_pad(b"abc").len(), 16);
        assert_eq!(pkcs7_pad(b"abc")[15], 13);
        assert_eq!(pkcs7_pad(&[0u8; 16]), [vec![0u8; 16], vec![16u8; 16]].concat());
        assert!(pkcs7_unpad(&[0u8; 16]).is_err());
        assert_eq!(pkcs7_unpad(&[7u8; 16]).unwrap().len(), 9);
    }

    #[test_case("MTIzNDU2Nzg=" ; "eight byte key")]
    #[test_case("not base64!" ; "invalid base64")]
    fn test_bad_keys_are_configuration_errors(key: &str) {
        let err = TokenCipher::from_base64_key(key).unwrap_err();
        assert!(matches!(err, SatchelError::Configuration(_)));
    }

    #[test]
    fn test_request_url_order_and_encoding() {
        let cipher = TokenCipher::from_base64_key(KEY_128).unwrap();
        let envelope = RpcEnvelope {
            method: "getStudentSubjects",
            app_code: "APP",
            company_code: "10",
            version: "3",
        };
        let url = request_url(
            "https://tass.example.test/api",
            &envelope,
            &cipher.encrypt("{'code': 'all'}"),
        );
        assert_eq!(
            url,
            "https://tass.example.test/api?method=getStudentSubjects&appcode=APP&company=10&v=3&token=UiKcRZDL1uJ4uyHOeGBfmA%3D%3D"
        );
    }

    #[test]
    fn test_debug_hides_key() {
        let cipher = TokenCipher::from_base64_key(KEY_256).unwrap();
        assert_eq!(format!("{cipher:?}"), "TokenCipher { bits: 256 }");
    }
}
