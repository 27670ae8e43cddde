//! PCSchool client
//!
//! Basic-authenticated JSON POSTs to the enrolment handlers. Lookups share
//! one handler and differ only by the case-sensitive `Event` value.

use super::signing::{sign, sign_payload, timestamp_ms};
use crate::adapters::auth::AuthScheme;
use crate::adapters::http::{join_url, HttpSession};
use crate::adapters::vendor::{not_authenticated, unsupported, FetchOutcome, SisVendor};
use crate::config::{HttpConfig, PcSchoolConfig};
use crate::domain::fields::scalar_to_string;
use crate::domain::{Result, VendorError, VendorKind};
use crate::log_record_skipped;
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::{json, Value};

const KIND: VendorKind = VendorKind::PcSchool;

const HANDLER_BASE: &str = "Handlers/External/Enrolment.asmx";

/// A normalised lookup entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupEntry {
    pub code: String,
    pub description: String,
}

/// `Event` value for a lookup collection
pub fn lookup_event(collection: &str) -> Option<&'static str> {
    match collection {
        "houses" => Some("HOUSE"),
        "nationalities" => Some("NATIONALITY"),
        "ethnicities" => Some("ETHNICITY"),
        "languages" => Some("LANGUAGE"),
        "schools" => Some("SCHOOL"),
        "countries" => Some("COUNTRY"),
        "years" => Some("YEAR"),
        _ => None,
    }
}

/// Normalise a lookup response into entries
///
/// Houses and years map code to name (`{"Acacia": "Acacia - yellow"}`).
/// The other lookups key by an internal number and carry `Code` and
/// `Description` (`{"120": {"Code": "AFG", "Description": "Afghanistan"}}`).
/// Returns the entries and the number of values that fit neither shape.
pub fn normalise_lookup(event: &str, body: &Value) -> Result<(Vec<LookupEntry>, usize)> {
    let map = body.as_object().ok_or_else(|| {
        VendorError::invalid_response(KIND.to_string(), format!("{event} lookup is not an object"))
    })?;

    let mut entries = Vec::with_capacity(map.len());
    let mut skipped = 0;
    for (key, value) in map {
        match value {
            Value::String(description) => entries.push(LookupEntry {
                code: key.clone(),
                description: description.clone(),
            }),
            Value::Object(fields) => match fields.get("Code").and_then(scalar_to_string) {
                Some(code) => entries.push(LookupEntry {
                    code,
                    description: fields
                        .get("Description")
                        .and_then(scalar_to_string)
                        .unwrap_or_default(),
                }),
                None => {
                    log_record_skipped!(KIND, event, key, "lookup entry has no Code");
                    skipped += 1;
                }
            },
            _ => {
                log_record_skipped!(KIND, event, key, "unexpected lookup value");
                skipped += 1;
            }
        }
    }
    Ok((entries, skipped))
}

pub struct PcSchoolClient {
    session: HttpSession,
    config: PcSchoolConfig,
    authenticated: bool,
}

impl PcSchoolClient {
    pub fn new(config: PcSchoolConfig, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            session: HttpSession::new(KIND, http)?,
            config,
            authenticated: false,
        })
    }

    fn handler_url(&self, handler: &str) -> String {
        join_url(&self.config.base_url, &format!("{HANDLER_BASE}/{handler}"))
    }

    /// Sign `payload` and POST it to `handler`; `retry` must be false for
    /// handlers that are not idempotent
    async fn signed_post(&self, handler: &str, payload: &Value, retry: bool) -> Result<Value> {
        if !self.authenticated {
            return Err(not_authenticated(KIND));
        }
        let fields = payload.as_object().ok_or_else(|| {
            VendorError::invalid_response(KIND.to_string(), "request payload must be a JSON object")
        })?;
        let body = sign_payload(
            fields,
            self.config.private_key.expose_secret().as_str(),
            self.config.api_key.expose_secret().as_str(),
            timestamp_ms(),
        )?;
        let url = self.handler_url(handler);
        if retry {
            self.session.post_json(&url, &body).await
        } else {
            self.session.post_json_once(&url, &body).await
        }
    }

    /// Raw response of a lookup event
    pub async fn lookup(&self, event: &str) -> Result<Value> {
        self.signed_post("Handler", &json!({ "Event": event }), true).await
    }

    /// Submit an enrolment application. Sent exactly once, since a retry
    /// after a lost response would create a duplicate application
    pub async fn import_enrolment(&self, payload: &Value) -> Result<Value> {
        self.signed_post("ImportHandler", payload, false).await
    }

    /// Poll the status of submitted applications
    pub async fn poll(&self, payload: &Value) -> Result<Value> {
        self.signed_post("PollHandler", payload, true).await
    }
}

#[async_trait]
impl SisVendor for PcSchoolClient {
    fn kind(&self) -> VendorKind {
        KIND
    }

    /// Install Basic auth and check the signing keys encode
    async fn authenticate(&mut self) -> Result<()> {
        sign(
            self.config.private_key.expose_secret().as_str(),
            self.config.api_key.expose_secret().as_str(),
            0,
        )?;
        self.session.set_auth(AuthScheme::Basic {
            username: self.config.username.clone(),
            password: self.config.password.clone(),
        });
        self.authenticated = true;
        Ok(())
    }

    async fn fetch(&self, collection: &str) -> Result<FetchOutcome> {
        let event = lookup_event(collection).ok_or_else(|| unsupported(KIND, collection))?;
        let body = self.lookup(event).await?;
        let (entries, skipped) = normalise_lookup(event, &body)?;
        let records = entries
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(FetchOutcome::new(records).with_skipped(skipped))
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::tests::fast_http_config;
    use crate::config::secret_string;
    use crate::domain::SatchelError;
    use mockito::{Matcher, Server, ServerGuard};

    fn config(server: &ServerGuard) -> PcSchoolConfig {
        PcSchoolConfig {
            base_url: server.url(),
            username: "enrol".to_string(),
            password: secret_string("pw"),
            api_key: secret_string("api-key"),
            private_key: secret_string("private-key"),
        }
    }

    async fn client(server: &ServerGuard) -> PcSchoolClient {
        let mut client = PcSchoolClient::new(config(server), &fast_http_config()).unwrap();
        client.authenticate().await.unwrap();
        client
    }

    #[test]
    fn test_every_collection_has_an_event() {
        for collection in KIND.collections() {
            assert!(lookup_event(collection).is_some(), "{collection}");
        }
        assert_eq!(lookup_event("students"), None);
    }

    #[test]
    fn test_normalise_string_values() {
        let body = json!({"Acacia": "Acacia - yellow", "Banksia": "Banksia - red"});
        let (entries, skipped) = normalise_lookup("HOUSE", &body).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(
            entries[0],
            LookupEntry {
                code: "Acacia".to_string(),
                description: "Acacia - yellow".to_string()
            }
        );
    }

    #[test]
    fn test_normalise_object_values() {
        let body = json!({
            "120": {"Code": "AFG", "Description": "Afghanistan"},
            "130": {"Code": "AUS", "Description": "Australia"},
            "999": {"Description": "No code"},
            "1000": 42
        });
        let (entries, skipped) = normalise_lookup("NATIONALITY", &body).unwrap();
        let codes: Vec<&str> = entries.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["AFG", "AUS"]);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn test_normalise_rejects_non_object() {
        let err = normalise_lookup("YEAR", &json!(["7", "8"])).unwrap_err();
        assert!(matches!(
            err,
            SatchelError::Vendor(VendorError::InvalidResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_lookup_is_signed_and_basic_authenticated() {
        let mut server = Server::new_async().await;
        let client = client(&server).await;
        let _m = server
            .mock("POST", "/Handlers/External/Enrolment.asmx/Handler")
            .match_header("authorization", "Basic ZW5yb2w6cHc=")
            .match_header("content-type", "application/json; charset=utf-8")
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJson(json!({"Event": "HOUSE"})),
                Matcher::Regex(r#""hmac":"[0-9A-F]{64}""#.to_string()),
                Matcher::Regex(r#""ts":\d+000[,}]"#.to_string()),
            ]))
            .with_status(200)
            .with_body(r#"{"Acacia": "Acacia - yellow"}"#)
            .create_async()
            .await;

        let outcome = client.fetch("houses").await.unwrap();
        assert_eq!(
            outcome.records,
            vec![json!({"code": "Acacia", "description": "Acacia - yellow"})]
        );
    }

    #[tokio::test]
    async fn test_import_and_poll_handlers() {
        let mut server = Server::new_async().await;
        let client = client(&server).await;
        let _import = server
            .mock("POST", "/Handlers/External/Enrolment.asmx/ImportHandler")
            .match_body(Matcher::PartialJson(json!({"Surname": "Ng"})))
            .with_status(200)
            .with_body(r#"{"ApplicationID": 77}"#)
            .create_async()
            .await;
        let _poll = server
            .mock("POST", "/Handlers/External/Enrolment.asmx/PollHandler")
            .match_body(Matcher::PartialJson(json!({"ApplicationID": 77})))
            .with_status(200)
            .with_body(r#"{"Status": "Received"}"#)
            .create_async()
            .await;

        let imported = client.import_enrolment(&json!({"Surname": "Ng"})).await.unwrap();
        assert_eq!(imported["ApplicationID"], 77);
        let polled = client.poll(&json!({"ApplicationID": 77})).await.unwrap();
        assert_eq!(polled["Status"], "Received");
    }

    #[tokio::test]
    async fn test_import_enrolment_is_not_retried() {
        let mut server = Server::new_async().await;
        let client = client(&server).await;
        let m = server
            .mock("POST", "/Handlers/External/Enrolment.asmx/ImportHandler")
            .with_status(502)
            .expect(1)
            .create_async()
            .await;

        let err = client
            .import_enrolment(&json!({"Surname": "Ng"}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SatchelError::Vendor(VendorError::ServerError { status: 502, .. })
        ));
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_lookup_is_retried_on_server_error() {
        let mut server = Server::new_async().await;
        let client = client(&server).await;
        let m = server
            .mock("POST", "/Handlers/External/Enrolment.asmx/Handler")
            .with_status(502)
            .expect(3)
            .create_async()
            .await;

        assert!(client.lookup("HOUSE").await.is_err());
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthenticated_fetch_fails() {
        let server = Server::new_async().await;
        let client = PcSchoolClient::new(config(&server), &fast_http_config()).unwrap();
        let err = client.fetch("years").await.unwrap_err();
        assert!(matches!(
            err,
            SatchelError::Vendor(VendorError::NotAuthenticated { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_collection() {
        let server = Server::new_async().await;
        let client = client(&server).await;
        let err = client.fetch("students").await.unwrap_err();
        assert!(matches!(
            err,
            SatchelError::Vendor(VendorError::UnsupportedCollection { .. })
        ));
    }
}
