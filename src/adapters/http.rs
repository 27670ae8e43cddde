//! Shared HTTP plumbing for the REST vendors
//!
//! [`HttpSession`] owns one `reqwest::Client` per vendor client, applies the
//! vendor's [`AuthScheme`] to every request, maps non-2xx statuses into
//! [`VendorError`] and retries transient failures with exponential backoff.

use super::auth::AuthScheme;
use crate::config::{HttpConfig, RetryConfig};
use crate::domain::{Result, SatchelError, VendorError, VendorKind};
use crate::log_retry_attempt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

/// An authenticated connection to one vendor
pub struct HttpSession {
    vendor: VendorKind,
    client: Client,
    retry: RetryConfig,
    auth: AuthScheme,
    headers: Vec<(&'static str, String)>,
}

impl HttpSession {
    /// Build a session with no credentials attached yet
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the TLS backend cannot be initialised.
    pub fn new(vendor: VendorKind, config: &HttpConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(30)))
            .user_agent(concat!("satchel/", env!("CARGO_PKG_VERSION")));

        if !config.tls_verify {
            tracing::warn!(vendor = %vendor, "TLS certificate verification disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(|e| {
            SatchelError::Configuration(format!("Failed to build HTTP client for {vendor}: {e}"))
        })?;

        Ok(Self {
            vendor,
            client,
            retry: config.retry.clone(),
            auth: AuthScheme::None,
            headers: Vec::new(),
        })
    }

    /// Add a header sent on every request
    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn set_auth(&mut self, auth: AuthScheme) {
        self.auth = auth;
    }

    pub fn vendor(&self) -> VendorKind {
        self.vendor
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// GET `url` and decode the body as JSON
    pub async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        retry_request(&self.retry, self.vendor, move || {
            self.send_json(self.client.get(url).query(query))
        })
        .await
    }

    /// POST `body` as `application/json; charset=utf-8` and decode the reply
    pub async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        let payload = serde_json::to_vec(body)?;
        retry_request(&self.retry, self.vendor, move || {
            self.send_json(self.json_post(url, payload.clone()))
        })
        .await
    }

    /// Like [`HttpSession::post_json`] but sent exactly once
    ///
    /// For calls with side effects on the vendor, where a retry after a
    /// 5xx could apply them twice.
    pub async fn post_json_once(&self, url: &str, body: &Value) -> Result<Value> {
        let payload = serde_json::to_vec(body)?;
        self.send_json(self.json_post(url, payload)).await
    }

    fn json_post(&self, url: &str, payload: Vec<u8>) -> RequestBuilder {
        self.client
            .post(url)
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .body(payload)
    }

    fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        let request = self
            .headers
            .iter()
            .fold(request, |req, (name, value)| req.header(*name, value));
        self.auth.apply(request)
    }

    async fn send_json(&self, request: RequestBuilder) -> Result<Value> {
        let response = self
            .prepare(request)
            .send()
            .await
            .map_err(|e| connection_error(self.vendor, &e))?;
        let response = check_status(self.vendor, response).await?;
        decode_json(self.vendor, response).await
    }
}

/// Join a base URL and a relative path with exactly one slash between them
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub(crate) fn connection_error(vendor: VendorKind, err: &reqwest::Error) -> SatchelError {
    VendorError::ConnectionFailed {
        vendor: vendor.to_string(),
        message: err.to_string(),
    }
    .into()
}

/// Turn a non-2xx response into a [`VendorError`] carrying status and body
pub async fn check_status(vendor: VendorKind, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(VendorError::from_status(vendor.to_string(), status.as_u16(), body).into())
}

pub(crate) async fn decode_json(vendor: VendorKind, response: Response) -> Result<Value> {
    let text = response
        .text()
        .await
        .map_err(|e| connection_error(vendor, &e))?;
    serde_json::from_str(&text).map_err(|e| {
        VendorError::invalid_response(
            vendor.to_string(),
            format!("response body is not valid JSON: {e}"),
        )
        .into()
    })
}

/// Delay before retry number `attempt` (1-based)
fn backoff_delay(retry: &RetryConfig, attempt: usize) -> Duration {
    let factor = retry
        .backoff_multiplier
        .powi(attempt.saturating_sub(1) as i32);
    let delay_ms = (retry.initial_delay_ms as f64 * factor).min(retry.max_delay_ms as f64);
    Duration::from_millis(delay_ms as u64)
}

/// Retry an operation with exponential backoff
///
/// Only errors for which [`VendorError::is_retryable`] holds are retried.
pub async fn retry_request<F, Fut, T>(
    retry: &RetryConfig,
    vendor: VendorKind,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = retry.max_retries.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempt += 1;
                let retryable = matches!(&e, SatchelError::Vendor(v) if v.is_retryable());
                if !retryable || attempt >= max_attempts {
                    return Err(e);
                }

                let delay = backoff_delay(retry, attempt);
                log_retry_attempt!(attempt + 1, max_attempts, e);
                tracing::debug!(vendor = %vendor, delay_ms = delay.as_millis() as u64, "Backing off");
                tokio::time::sleep(delay).await;
            }
        }
    }
}
