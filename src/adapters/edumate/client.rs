//! Edumate REST client
//!
//! Authenticates with an OAuth client-credentials form post and follows
//! `pagination.next` cursors across the contacts and LMS endpoints.

use super::academic::{academic_year, is_current_enrolment};
use super::carers::{is_staff_also_parent, staff_number, CarerFilter};
use super::models::{Contact, StaffDetailEnvelope, StudentDetailEnvelope};
use crate::adapters::auth::{exchange_bearer_token, AuthScheme};
use crate::adapters::http::{join_url, HttpSession};
use crate::adapters::pagination::{collect_pages, CursorStyle, Pages};
use crate::adapters::vendor::{not_authenticated, unsupported, FetchOutcome, SisVendor};
use crate::config::{EdumateConfig, HttpConfig};
use crate::domain::fields::merge_fields;
use crate::domain::{is_email_valid, Result, SatchelError, VendorError, VendorKind};
use crate::log_record_skipped;
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{json, Value};

const KIND: VendorKind = VendorKind::Edumate;

/// Edumate client
pub struct EdumateClient {
    session: HttpSession,
    config: EdumateConfig,
    filter: CarerFilter,
    max_pages: usize,
    authenticated: bool,
}

impl EdumateClient {
    /// Create an unauthenticated client
    pub fn new(config: EdumateConfig, http: &HttpConfig) -> Result<Self> {
        let session = HttpSession::new(KIND, http)?;
        let filter = CarerFilter::new(config.carer_relationships.as_slice());
        Ok(Self {
            session,
            config,
            filter,
            max_pages: http.max_pages,
            authenticated: false,
        })
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.config.base_url, path)
    }

    fn ensure_authenticated(&self) -> Result<()> {
        if self.authenticated {
            Ok(())
        } else {
            Err(not_authenticated(KIND))
        }
    }

    /// Fetch every page of a contacts listing
    async fn contacts(&self, path: &str, query: &[(&str, String)]) -> Result<Pages> {
        self.ensure_authenticated()?;
        let session = &self.session;
        collect_pages(
            KIND,
            CursorStyle::PaginationNext,
            self.url(path),
            self.max_pages,
            move |url, first| async move {
                let params: &[(&str, String)] = if first { query } else { &[] };
                session.get_json(&url, params).await
            },
        )
        .await
    }

    async fn current_contacts(&self, contact_type: &str) -> Result<Pages> {
        self.contacts(
            "contacts/contacts/current",
            &[("contactType", contact_type.to_string())],
        )
        .await
    }

    /// Eligible carers, followed by staff members who are also parents
    pub async fn carers(&self) -> Result<FetchOutcome> {
        let pages = self.current_contacts("carer").await?;
        let mut records = Vec::new();
        let mut skipped = 0;

        for raw in pages.data {
            let contact = match parse_contact(&raw, "carers") {
                Some(c) => c,
                None => {
                    skipped += 1;
                    continue;
                }
            };
            if !self.filter.is_eligible(&contact) {
                tracing::debug!(
                    email = contact.general_info.email().unwrap_or_default(),
                    "Carer not eligible for import"
                );
                skipped += 1;
                continue;
            }
            let student_ids = self.filter.student_ids(&contact);
            records.push(merge_fields(
                raw,
                [
                    ("student_ids", json!(student_ids)),
                    ("source", json!("carer")),
                ],
            ));
        }

        let staff = self.current_contacts("staff").await?;
        for raw in staff.data {
            let Some(contact) = parse_contact(&raw, "carers") else {
                skipped += 1;
                continue;
            };
            if contact.general_info.email().is_none() || !is_staff_also_parent(&contact) {
                continue;
            }
            let student_ids = self.filter.student_ids(&contact);
            records.push(merge_fields(
                raw,
                [
                    ("student_ids", json!(student_ids)),
                    ("source", json!("staff")),
                ],
            ));
        }

        Ok(FetchOutcome::new(records).with_skipped(skipped))
    }

    /// LMS student list enriched with per-student enrolment details
    pub async fn students(&self) -> Result<FetchOutcome> {
        let pages = self.contacts("lms/students", &[]).await?;
        let mut records = Vec::with_capacity(pages.data.len());
        let mut skipped = 0;

        for raw in pages.data {
            let Some(student_number) = lms_student_number(&raw) else {
                log_record_skipped!(KIND, "students", "-", "no student_number");
                skipped += 1;
                continue;
            };
            match self.student_details(&student_number).await {
                Ok(Some(details)) => records.push(merge_fields(raw, details)),
                Ok(None) => {
                    log_record_skipped!(KIND, "students", student_number, "no detail record");
                    skipped += 1;
                }
                Err(SatchelError::Vendor(e @ VendorError::InvalidResponse { .. })) => {
                    log_record_skipped!(KIND, "students", student_number, e.to_string());
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(FetchOutcome::new(records).with_skipped(skipped))
    }

    /// Derived fields for one student, `None` when Edumate has no detail record
    pub async fn student_details(
        &self,
        student_number: &str,
    ) -> Result<Option<Vec<(&'static str, Value)>>> {
        self.ensure_authenticated()?;
        let url = self.url(&format!("contacts/contact-details/student/{student_number}"));
        let body = match self.session.get_json(&url, &[]).await {
            Ok(body) => body,
            Err(SatchelError::Vendor(VendorError::ClientError { status: 404, .. })) => {
                return Ok(None)
            }
            Err(e) => return Err(e),
        };

        let envelope: StudentDetailEnvelope =
            serde_json::from_value(body.get("data").cloned().unwrap_or(Value::Null))
                .map_err(|e| VendorError::invalid_response(KIND.to_string(), e.to_string()))?;
        let Some(student) = envelope.student else {
            return Ok(None);
        };

        let enrolment = &student.enrolment;
        let info = &student.general_info;
        let mut fields = vec![
            (
                "current",
                json!(is_current_enrolment(info.student_status.as_deref())),
            ),
            ("current_form_run", json!(enrolment.current_form_run)),
            ("tutor_roll_class", json!(enrolment.tutor_roll_class)),
            ("tutor_roll_class_code", json!(enrolment.tutor_roll_class_code)),
            ("tutor_teacher", json!(enrolment.tutor_teacher)),
            ("house", json!(info.house)),
            ("student_status", json!(info.student_status)),
            ("student_type", json!(info.student_type)),
        ];
        if let Some(year) = academic_year(
            enrolment.short_form_run.as_deref(),
            enrolment.current_form_run.as_deref(),
        ) {
            fields.push(("academic_year", json!(year)));
        }
        Ok(Some(fields))
    }

    /// Current staff with an email address, tagged with type and parent status
    pub async fn staff(&self) -> Result<FetchOutcome> {
        let pages = self.current_contacts("staff").await?;
        let mut records = Vec::new();
        let mut skipped = 0;

        for raw in pages.data {
            let Some(contact) = parse_contact(&raw, "staff") else {
                skipped += 1;
                continue;
            };
            if contact.general_info.email().is_none() {
                log_record_skipped!(
                    KIND,
                    "staff",
                    contact.general_info.display_name(),
                    "no email address"
                );
                skipped += 1;
                continue;
            }

            let number = staff_number(&contact);
            let staff_type = match number.as_deref() {
                Some(n) => match self.staff_type(n).await {
                    Ok(staff_type) => staff_type,
                    Err(SatchelError::Vendor(e @ VendorError::InvalidResponse { .. })) => {
                        log_record_skipped!(KIND, "staff", n, e.to_string());
                        skipped += 1;
                        continue;
                    }
                    Err(e) => return Err(e),
                },
                None => None,
            };
            records.push(merge_fields(
                raw,
                [
                    ("staff_number", json!(number)),
                    ("staff_type", json!(staff_type)),
                    ("is_parent", json!(is_staff_also_parent(&contact))),
                ],
            ));
        }

        Ok(FetchOutcome::new(records).with_skipped(skipped))
    }

    /// `employment.staff_type` from the staff detail endpoint
    pub async fn staff_type(&self, staff_number: &str) -> Result<Option<String>> {
        self.ensure_authenticated()?;
        let url = self.url(&format!("contacts/contact-details/staff/{staff_number}"));
        let body = match self.session.get_json(&url, &[]).await {
            Ok(body) => body,
            Err(SatchelError::Vendor(VendorError::ClientError { status: 404, .. })) => {
                return Ok(None)
            }
            Err(e) => return Err(e),
        };
        let envelope: StaffDetailEnvelope =
            serde_json::from_value(body.get("data").cloned().unwrap_or(Value::Null))
                .map_err(|e| VendorError::invalid_response(KIND.to_string(), e.to_string()))?;
        Ok(envelope.staff.and_then(|s| s.employment.staff_type))
    }

    /// Past students with a valid email address
    pub async fn past_students(&self) -> Result<FetchOutcome> {
        let pages = self
            .contacts(
                "contacts/contacts/past",
                &[("contactType", "student".to_string())],
            )
            .await?;
        let mut records = Vec::new();
        let mut skipped = 0;

        for raw in pages.data {
            let Some(contact) = parse_contact(&raw, "past-students") else {
                skipped += 1;
                continue;
            };
            let name = contact.general_info.display_name();
            match contact.general_info.email() {
                Some(email) if is_email_valid(email) => records.push(raw),
                Some(email) => {
                    log_record_skipped!(
                        KIND,
                        "past-students",
                        name,
                        format!("invalid email address {email}")
                    );
                    skipped += 1;
                }
                None => {
                    log_record_skipped!(KIND, "past-students", name, "no email address");
                    skipped += 1;
                }
            }
        }

        Ok(FetchOutcome::new(records).with_skipped(skipped))
    }
}

fn parse_contact(raw: &Value, collection: &str) -> Option<Contact> {
    match serde_json::from_value::<Contact>(raw.clone()) {
        Ok(contact) => Some(contact),
        Err(e) => {
            log_record_skipped!(KIND, collection, "-", format!("malformed contact: {e}"));
            None
        }
    }
}

/// `student_number` of an LMS student, top-level or among its references
fn lms_student_number(raw: &Value) -> Option<String> {
    if let Some(n) = raw
        .get("student_number")
        .and_then(crate::domain::fields::scalar_to_string)
    {
        return Some(n);
    }
    raw.pointer("/general_info/contact_reference")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .find_map(|r| {
            r.get("student_number")
                .and_then(crate::domain::fields::scalar_to_string)
        })
}

#[async_trait]
impl SisVendor for EdumateClient {
    fn kind(&self) -> VendorKind {
        KIND
    }

    async fn authenticate(&mut self) -> Result<()> {
        let url = self.url("authorize");
        let token = exchange_bearer_token(
            &self.session,
            &url,
            &[
                ("client_id", self.config.client_id.as_str()),
                (
                    "client_secret",
                    self.config.client_secret.expose_secret().as_str(),
                ),
            ],
            "/data/access_token",
        )
        .await?;
        self.session.set_auth(AuthScheme::Bearer(token));
        self.authenticated = true;
        Ok(())
    }

    async fn fetch(&self, collection: &str) -> Result<FetchOutcome> {
        match collection {
            "carers" => self.carers().await,
            "students" => self.students().await,
            "staff" => self.staff().await,
            "past-students" => self.past_students().await,
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
