//! TASS parent calendar

use super::rpc::TassRpc;
use crate::adapters::vendor::{unsupported, FetchOutcome, SisVendor};
use crate::config::{HttpConfig, TassConfig};
use crate::domain::{Result, VendorKind};
use async_trait::async_trait;
use chrono::{Datelike, Duration, Local, NaiveDate};

const KIND: VendorKind = VendorKind::TassCalendar;
const METHOD: &str = "getParentCalendar";

/// `D\/M\/YYYY`, no zero padding, escaped slashes as TASS expects
pub fn tass_date(date: NaiveDate) -> String {
    format!(r"{}\/{}\/{}", date.day(), date.month(), date.year())
}

/// `[today - days_back, today + days_forward]`
pub fn calendar_window(today: NaiveDate, days_back: i64, days_forward: i64) -> (NaiveDate, NaiveDate) {
    (
        today - Duration::days(days_back),
        today + Duration::days(days_forward),
    )
}

/// Parameter string for `getParentCalendar`
pub fn calendar_params(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "{{'start_date':'{}', 'end_date':'{}'}}",
        tass_date(start),
        tass_date(end)
    )
}

pub struct TassCalendarClient {
    rpc: TassRpc,
}

impl TassCalendarClient {
    pub fn new(config: TassConfig, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            rpc: TassRpc::new(KIND, config, http)?,
        })
    }

    /// Events between `start` and `end`
    pub async fn events_between(&self, start: NaiveDate, end: NaiveDate) -> Result<FetchOutcome> {
        let params = calendar_params(start, end);
        let body = self
            .rpc
            .call(METHOD, &self.rpc.config().calendar_version, &params)
            .await?;
        Ok(FetchOutcome::new(self.rpc.records(METHOD, body)?))
    }

    /// Events in the configured window around today
    pub async fn calendar(&self) -> Result<FetchOutcome> {
        let config = self.rpc.config();
        let (start, end) = calendar_window(
            Local::now().date_naive(),
            config.calendar_days_back,
            config.calendar_days_forward,
        );
        self.events_between(start, end).await
    }
}

#[async_trait]
impl SisVendor for TassCalendarClient {
    fn kind(&self) -> VendorKind {
        KIND
    }

    async fn authenticate(&mut self) -> Result<()> {
        self.rpc.prepare()
    }

    async fn fetch(&self, collection: &str) -> Result<FetchOutcome> {
        match collection {
            "calendar" => self.calendar().await,
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
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_params_format() {
        assert_eq!(
            calendar_params(date(2024, 2, 1), date(2026, 10, 28)),
            r"{'start_date':'1\/2\/2024', 'end_date':'28\/10\/2026'}"
        );
    }

    #[test]
    fn test_default_window() {
        let (start, end) = calendar_window(date(2026, 10, 18), 90, 1000);
        assert_eq!(start, date(2026, 7, 20));
        assert_eq!(end, date(2029, 7, 14));
    }

    #[tokio::test]
    async fn test_events_between_sends_encrypted_token() {
        let mut server = Server::new_async().await;
        let config = test_config(&format!("{}/tassweb/api/", server.url()));
        let mut client = TassCalendarClient::new(config, &fast_http_config()).unwrap();
        client.authenticate().await.unwrap();

        let _m = server
            .mock("GET", "/tassweb/api/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("method".into(), "getParentCalendar".into()),
                Matcher::UrlEncoded("appcode".into(), "APP".into()),
                Matcher::UrlEncoded("company".into(), "10".into()),
                Matcher::UrlEncoded("v".into(), "2".into()),
                Matcher::UrlEncoded(
                    "token".into(),
                    "hmclQu68evoc+1zR8v2ZmtaGeT0UIzanoWt8ZD6DrHbz8lMgVFqYBEGZjVlymBKQL4cHVUnZDWFZ3LFxtsAXjQ==".into(),
                ),
            ]))
            .with_status(200)
            .with_body(json!({"events": [{"title": "Sports carnival"}, {"title": "Speech night"}]}).to_string())
            .create_async()
            .await;

        let outcome = client
            .events_between(date(2024, 2, 1), date(2026, 10, 28))
            .await
            .unwrap();
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[1]["title"], "Speech night");
    }

    #[tokio::test]
    async fn test_fetch_before_authenticate_fails() {
        let client = TassCalendarClient::new(test_config("http://127.0.0.1:9/"), &fast_http_config())
            .unwrap();
        assert!(client.fetch("calendar").await.is_err());
        assert!(!client.is_authenticated());
    }
}
