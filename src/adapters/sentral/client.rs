//! Sentral client
//!
//! Static key and tenant headers, JSON:API bodies, `links.next` paging.

use super::models::{annotate_campus, decode_resource, parse_date, IncludedIndex, IncludedKind};
use crate::adapters::auth::AuthScheme;
use crate::adapters::http::{join_url, HttpSession};
use crate::adapters::pagination::{collect_pages, page_data, CursorStyle, Pages};
use crate::adapters::vendor::{not_authenticated, unsupported, FetchOutcome, SisVendor};
use crate::config::{HttpConfig, SentralConfig};
use crate::domain::fields::merge_fields;
use crate::domain::{Result, SatchelError, VendorKind};
use crate::log_record_skipped;
use async_trait::async_trait;
use serde_json::Value;

const KIND: VendorKind = VendorKind::Sentral;

const PERSON_INCLUDES: &str = "primaryHousehold,studentPrimaryEnrolment,student,studentContacts";

/// Lookup tables are small enough for one page
const LOOKUP_LIMIT: u32 = 100;
const STAFF_LIMIT: u32 = 100;

pub struct SentralClient {
    session: HttpSession,
    config: SentralConfig,
    max_pages: usize,
    authenticated: bool,
}

impl SentralClient {
    pub fn new(config: SentralConfig, http: &HttpConfig) -> Result<Self> {
        let session = HttpSession::new(KIND, http)?
            .with_header("X-API-TENANT", config.tenant_id.clone())
            .with_header("Content-Type", "application/vnd.api+json");
        Ok(Self {
            session,
            config,
            max_pages: http.max_pages,
            authenticated: false,
        })
    }

    fn endpoint(&self, resource: &str) -> String {
        join_url(
            &self.config.base_url,
            &format!("restapi/v1/enrolments/{resource}"),
        )
    }

    fn ensure_authenticated(&self) -> Result<()> {
        if self.authenticated {
            Ok(())
        } else {
            Err(not_authenticated(KIND))
        }
    }

    /// Follow `links.next` from the first page of `resource`
    ///
    /// Query parameters go on the first request only; next links already
    /// carry them.
    async fn paged(&self, resource: &str, query: &[(&str, String)]) -> Result<Pages> {
        self.ensure_authenticated()?;
        let session = &self.session;
        collect_pages(
            KIND,
            CursorStyle::LinksNext,
            self.endpoint(resource),
            self.max_pages,
            move |url, first| async move {
                let params: &[(&str, String)] = if first { query } else { &[] };
                session.get_json(&url, params).await
            },
        )
        .await
    }

    /// One page of a lookup resource
    async fn single_page(&self, resource: &str) -> Result<FetchOutcome> {
        self.ensure_authenticated()?;
        let page = self
            .session
            .get_json(
                &self.endpoint(resource),
                &[("limit", LOOKUP_LIMIT.to_string())],
            )
            .await?;
        let records = page_data(KIND, &page)?
            .iter()
            .cloned()
            .map(annotate_campus)
            .collect();
        Ok(FetchOutcome::new(records))
    }

    /// Primary records with their included resources folded in
    ///
    /// Each record gains `related` (relationship name to included resource)
    /// and, when `dateOfBirth` is present, `date_of_birth` as `YYYY-MM-DD`.
    fn fold_included(&self, collection: &str, pages: Pages) -> FetchOutcome {
        let index = IncludedIndex::build(&pages.included);
        tracing::debug!(
            vendor = %KIND,
            collection = %collection,
            people = index.count(IncludedKind::Person),
            students = index.count(IncludedKind::Student),
            households = index.count(IncludedKind::Household),
            enrolments = index.count(IncludedKind::Enrolment),
            relations = index.count(IncludedKind::StudentPersonRelation),
            unknown = index.unknown,
            "Indexed included resources"
        );

        let mut skipped = 0;
        let mut records = Vec::with_capacity(pages.data.len());
        for raw in pages.data {
            let Some(resource) = decode_resource(collection, &raw) else {
                skipped += 1;
                continue;
            };
            let date_of_birth = match parse_date(resource.attribute_str("dateOfBirth")) {
                Ok(date) => date.map(|d| d.format("%Y-%m-%d").to_string()),
                Err(e) => {
                    log_record_skipped!(KIND, collection, resource.id, e);
                    skipped += 1;
                    continue;
                }
            };
            let related = index.resolve(&resource);
            records.push(merge_fields(
                raw,
                [
                    ("related", related),
                    ("date_of_birth", date_of_birth.map(Value::from).unwrap_or(Value::Null)),
                ],
            ));
        }
        FetchOutcome::new(records).with_skipped(skipped)
    }

    /// People with household, enrolment, student and contact side-loads
    pub async fn persons(&self) -> Result<FetchOutcome> {
        let pages = self
            .paged(
                "person",
                &[
                    ("include", PERSON_INCLUDES.to_string()),
                    ("limit", self.config.page_limit.to_string()),
                ],
            )
            .await?;
        Ok(self.fold_included("persons", pages))
    }

    /// Staff with their person record
    pub async fn staff(&self) -> Result<FetchOutcome> {
        let pages = self
            .paged(
                "staff",
                &[
                    ("include", "person".to_string()),
                    ("limit", STAFF_LIMIT.to_string()),
                ],
            )
            .await?;
        Ok(self.fold_included("staff", pages))
    }

    /// Phone or email records tagged with their owner's person id
    ///
    /// Records without `relationships.owner.data.id` are skipped.
    async fn owned_contact_details(&self, resource: &str, collection: &str) -> Result<FetchOutcome> {
        let pages = self
            .paged(resource, &[("limit", self.config.page_limit.to_string())])
            .await?;

        let mut skipped = 0;
        let mut records = Vec::with_capacity(pages.data.len());
        for raw in pages.data {
            match owner_id(&raw) {
                Some(person_id) => {
                    records.push(merge_fields(raw, [("person_id", Value::from(person_id))]))
                }
                None => {
                    let id = raw.get("id").map(Value::to_string).unwrap_or_default();
                    log_record_skipped!(KIND, collection, id, "record has no owner");
                    skipped += 1;
                }
            }
        }
        Ok(FetchOutcome::new(records).with_skipped(skipped))
    }
}

/// `relationships.owner.data.id` as a string
pub fn owner_id(record: &Value) -> Option<String> {
    match record.pointer("/relationships/owner/data/id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl SisVendor for SentralClient {
    fn kind(&self) -> VendorKind {
        KIND
    }

    /// Sentral has no handshake; the API key header is installed here
    async fn authenticate(&mut self) -> Result<()> {
        if self.config.tenant_id.trim().is_empty() {
            return Err(SatchelError::Configuration(
                "sentral.tenant_id is required".to_string(),
            ));
        }
        self.session
            .set_auth(AuthScheme::ApiKey(vec![("X-API-KEY", self.config.api_key.clone())]));
        self.authenticated = true;
        Ok(())
    }

    async fn fetch(&self, collection: &str) -> Result<FetchOutcome> {
        match collection {
            "persons" => self.persons().await,
            "staff" => self.staff().await,
            "houses" => self.single_page("house").await,
            "academic-periods" => self.single_page("academic-period").await,
            "year-levels" => self.single_page("year-level").await,
            "roll-classes" => self.single_page("rollclass").await,
            "person-phones" => self.owned_contact_details("person-phone", collection).await,
            "person-emails" => self.owned_contact_details("person-email", collection).await,
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
