//! Engage client
//!
//! One token exchange, then single-page JSON array responses.

use super::bundle::{bundle_contacts, index_contacts};
use super::models::{EngageContact, Pupil};
use crate::adapters::auth::{exchange_bearer_token, AuthScheme};
use crate::adapters::http::{join_url, HttpSession};
use crate::adapters::vendor::{not_authenticated, unsupported, FetchOutcome, SisVendor};
use crate::config::{EngageConfig, HttpConfig};
use crate::domain::{Result, VendorError, VendorKind};
use crate::log_record_skipped;
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::Value;

const KIND: VendorKind = VendorKind::Engage;

const PUPILS_PATH: &str = "api/v1/personaldetails/getcurrentpupilinfo/";
const CONTACTS_PATH: &str = "api/v1/personaldetails/getcontactinfo/";

pub struct EngageClient {
    session: HttpSession,
    config: EngageConfig,
    authenticated: bool,
}

impl EngageClient {
    pub fn new(config: EngageConfig, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            session: HttpSession::new(KIND, http)?,
            config,
            authenticated: false,
        })
    }

    async fn get_array(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<Value>> {
        if !self.authenticated {
            return Err(not_authenticated(KIND));
        }
        let url = join_url(&self.config.base_url, path);
        match self.session.get_json(&url, query).await? {
            Value::Array(items) => Ok(items),
            other => Err(VendorError::invalid_response(
                KIND.to_string(),
                format!("{path} did not return a JSON array (got {})", type_name(&other)),
            )
            .into()),
        }
    }

    /// Raw pupil records paired with their typed view
    async fn pupil_records(&self) -> Result<(Vec<(Value, Pupil)>, usize)> {
        let raw = self
            .get_array(PUPILS_PATH, &[("contactinfo", "true".to_string())])
            .await?;
        Ok(decode_all(raw, "pupils"))
    }

    /// Pupils whose status is `Current`
    pub async fn pupils(&self) -> Result<FetchOutcome> {
        let (decoded, malformed) = self.pupil_records().await?;
        let total = decoded.len();
        let records: Vec<Value> = decoded
            .into_iter()
            .filter(|(_, pupil)| pupil.is_current())
            .map(|(raw, _)| raw)
            .collect();
        let skipped = malformed + (total - records.len());
        Ok(FetchOutcome::new(records).with_skipped(skipped))
    }

    /// Contacts of current pupils, one record per email address
    pub async fn contacts(&self) -> Result<FetchOutcome> {
        let raw_contacts = self.get_array(CONTACTS_PATH, &[]).await?;
        let (contacts, malformed_contacts) = decode_all::<EngageContact>(raw_contacts, "contacts");
        let contacts: Vec<EngageContact> = contacts.into_iter().map(|(_, c)| c).collect();

        let (pupils, malformed_pupils) = self.pupil_records().await?;
        let pupils: Vec<Pupil> = pupils.into_iter().map(|(_, p)| p).collect();

        let bundle = bundle_contacts(index_contacts(&contacts), &pupils);
        let records = bundle
            .entries
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(FetchOutcome::new(records).with_skipped(
            malformed_contacts
                + malformed_pupils
                + bundle.pupils_without_contacts
                + bundle.unknown_contact_ids,
        ))
    }
}

fn decode_all<T: DeserializeOwned>(raw: Vec<Value>, collection: &str) -> (Vec<(Value, T)>, usize) {
    let mut malformed = 0;
    let decoded = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<T>(value.clone()) {
            Ok(typed) => Some((value, typed)),
            Err(e) => {
                log_record_skipped!(KIND, collection, "-", format!("malformed record: {e}"));
                malformed += 1;
                None
            }
        })
        .collect();
    (decoded, malformed)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl SisVendor for EngageClient {
    fn kind(&self) -> VendorKind {
        KIND
    }

    async fn authenticate(&mut self) -> Result<()> {
        let url = join_url(&self.config.base_url, "api/gettoken");
        let token = exchange_bearer_token(
            &self.session,
            &url,
            &[
                ("username", self.config.username.as_str()),
                ("password", self.config.password.expose_secret().as_str()),
            ],
            "/access_token",
        )
        .await?;
        self.session.set_auth(AuthScheme::Bearer(token));
        self.authenticated = true;
        Ok(())
    }

    async fn fetch(&self, collection: &str) -> Result<FetchOutcome> {
        match collection {
            "pupils" => self.pupils().await,
            "contacts" => self.contacts().await,
            other => Err(unsupported(KIND, other)),
        }
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }
}
