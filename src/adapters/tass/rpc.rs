//! RPC-over-GET session shared by the TASS clients

use super::token::{request_url, RpcEnvelope, TokenCipher};
use crate::adapters::http::HttpSession;
use crate::config::{HttpConfig, TassConfig};
use crate::domain::{Result, VendorError, VendorKind};
use secrecy::ExposeSecret;
use serde_json::Value;

/// One TASS application endpoint plus the key that signs its calls
pub struct TassRpc {
    kind: VendorKind,
    session: HttpSession,
    config: TassConfig,
    cipher: Option<TokenCipher>,
}

impl TassRpc {
    pub fn new(kind: VendorKind, config: TassConfig, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            kind,
            session: HttpSession::new(kind, http)?,
            config,
            cipher: None,
        })
    }

    pub fn config(&self) -> &TassConfig {
        &self.config
    }

    /// Decode the token key; later calls reuse the cipher
    pub fn prepare(&mut self) -> Result<()> {
        self.cipher = Some(TokenCipher::from_base64_key(
            self.config.token_key.expose_secret().as_str(),
        )?);
        Ok(())
    }

    pub fn is_prepared(&self) -> bool {
        self.cipher.is_some()
    }

    /// URL for `method` with encrypted `params`
    pub fn url(&self, method: &str, version: &str, params: &str) -> Result<String> {
        let cipher = self
            .cipher
            .as_ref()
            .ok_or_else(|| crate::adapters::vendor::not_authenticated(self.kind))?;
        let envelope = RpcEnvelope {
            method,
            app_code: &self.config.app_code,
            company_code: &self.config.company_code,
            version,
        };
        Ok(request_url(
            &self.config.endpoint,
            &envelope,
            &cipher.encrypt(params),
        ))
    }

    /// Call `method` and return the decoded body
    pub async fn call(&self, method: &str, version: &str, params: &str) -> Result<Value> {
        let url = self.url(method, version, params)?;
        tracing::debug!(vendor = %self.kind, method = %method, version = %version, "TASS call");
        self.session.get_json(&url, &[]).await
    }

    /// Records from an RPC response
    ///
    /// A top-level array is the record list. An object with exactly one
    /// array-valued field carries its records there. Any other object is a
    /// single record, unless it reports a non-empty `error`.
    pub fn records(&self, method: &str, body: Value) -> Result<Vec<Value>> {
        extract_records(self.kind, method, body)
    }
}

pub(crate) fn extract_records(kind: VendorKind, method: &str, body: Value) -> Result<Vec<Value>> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(map) => {
            if let Some(error) = map
                .get("error")
                .and_then(Value::as_str)
                .filter(|e| !e.trim().is_empty())
            {
                return Err(VendorError::invalid_response(
                    kind.to_string(),
                    format!("{method}: {error}"),
                )
                .into());
            }
            let arrays: Vec<&Vec<Value>> = map.values().filter_map(Value::as_array).collect();
            match arrays.as_slice() {
                [only] => Ok(only.to_vec()),
                _ => Ok(vec![Value::Object(map)]),
            }
        }
        other => Err(VendorError::invalid_response(
            kind.to_string(),
            format!("{method} returned a non-JSON-object body: {other}"),
        )
        .into()),
    }
}
