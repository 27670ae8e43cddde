//! TASS LMS data

use super::rpc::TassRpc;
use crate::adapters::vendor::{unsupported, FetchOutcome, SisVendor};
use crate::config::{HttpConfig, TassConfig};
use crate::domain::{Result, VendorKind};
use async_trait::async_trait;

const KIND: VendorKind = VendorKind::TassLms;

/// Parameter string for `getStudentSubjects`; `all` selects every student
pub fn subjects_params(student_code: &str) -> String {
    format!("{{'code': '{student_code}'}}")
}

pub fn timetable_params(student_code: &str) -> String {
    format!("{{'student_code': '{student_code}'}}")
}

pub struct TassLmsClient {
    rpc: TassRpc,
}

impl TassLmsClient {
    pub fn new(config: TassConfig, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            rpc: TassRpc::new(KIND, config, http)?,
        })
    }

    async fn call(&self, method: &str, params: &str) -> Result<FetchOutcome> {
        let body = self
            .rpc
            .call(method, &self.rpc.config().lms_version, params)
            .await?;
        Ok(FetchOutcome::new(self.rpc.records(method, body)?))
    }

    /// Subjects for `student_code`
    pub async fn student_subjects(&self, student_code: &str) -> Result<FetchOutcome> {
        self.call("getStudentSubjects", &subjects_params(student_code))
            .await
    }

    /// Timetable of one student
    pub async fn student_timetable(&self, student_code: &str) -> Result<FetchOutcome> {
        self.call("getStudentTimetable", &timetable_params(student_code))
            .await
    }
}

#[async_trait]
impl SisVendor for TassLmsClient {
    fn kind(&self) -> VendorKind {
        KIND
    }

    async fn authenticate(&mut self) -> Result<()> {
        self.rpc.prepare()
    }

    async fn fetch(&self, collection: &str) -> Result<FetchOutcome> {
        match collection {
            "student-subjects" => {
                self.student_subjects(&self.rpc.config().student_code)
                    .await
            }
            other => Err(unsupported(KIND, other)),
        }
    }

    fn is_authenticated(&self) -> bool {
        self.rpc.is_prepared()
    }

    fn base_url(&self) -> &str {
        &self.rpc.config().endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::tests::fast_http_config;
    use crate::adapters::tass::test_config;
    use crate::domain::{SatchelError, VendorError};
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;

    async fn client(server: &ServerGuard) -> TassLmsClient {
        let mut client =
            TassLmsClient::new(test_config(&server.url()), &fast_http_config()).unwrap();
        client.authenticate().await.unwrap();
        client
    }

    #[test]
    fn test_params() {
        assert_eq!(subjects_params("all"), "{'code': 'all'}");
        assert_eq!(timetable_params("S123"), "{'student_code': 'S123'}");
    }

    #[tokio::test]
    async fn test_student_subjects_for_all() {
        let mut server = Server::new_async().await;
        let client = client(&server).await;
        let _m = server
            .mock("GET", "/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("method".into(), "getStudentSubjects".into()),
                Matcher::UrlEncoded("v".into(), "3".into()),
                Matcher::UrlEncoded("token".into(), "UiKcRZDL1uJ4uyHOeGBfmA==".into()),
            ]))
            .with_status(200)
            .with_body(json!([{"stud_code": "S1", "subject": "Maths"}]).to_string())
            .create_async()
            .await;

        let outcome = client.fetch("student-subjects").await.unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0]["subject"], "Maths");
    }

    #[tokio::test]
    async fn test_student_timetable() {
        let mut server = Server::new_async().await;
        let client = client(&server).await;
        let _m = server
            .mock("GET", "/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("method".into(), "getStudentTimetable".into()),
                Matcher::UrlEncoded("token".into(), "3VdvvjWDpEsJKKymCA1v9heldN+Sli8GFGVPwoxTGys=".into()),
            ]))
            .with_status(200)
            .with_body(json!({"timetable": [{"period": 1}, {"period": 2}]}).to_string())
            .create_async()
            .await;

        let outcome = client.student_timetable("S123").await.unwrap();
        assert_eq!(outcome.records.len(), 2);
    }

    #[tokio::test]
    async fn test_error_body_is_reported() {
        let mut server = Server::new_async().await;
        let client = client(&server).await;
        let _m = server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"error": "Token decryption failed"}"#)
            .create_async()
            .await;

        let err = client.fetch("student-subjects").await.unwrap_err();
        assert!(matches!(
            err,
            SatchelError::Vendor(VendorError::InvalidResponse { .. })
        ));
    }
}
