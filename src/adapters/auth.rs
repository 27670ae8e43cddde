//! Request authentication schemes
//!
//! Each vendor client picks one [`AuthScheme`] after its handshake and the
//! shared [`HttpSession`](super::http::HttpSession) applies it to every
//! request. Signed (PCSchool) and encrypted (TASS) schemes live with their
//! vendors because they alter the payload, not the headers.

use super::http::{connection_error, decode_json, retry_request, HttpSession};
use crate::config::{secret_string, SecretString};
use crate::domain::{Result, VendorError};
use reqwest::RequestBuilder;
use secrecy::ExposeSecret;

/// How credentials are attached to outgoing requests
#[derive(Debug, Clone, Default)]
pub enum AuthScheme {
    /// No credentials
    #[default]
    None,

    /// `Authorization: Bearer <token>`
    Bearer(SecretString),

    /// HTTP Basic
    Basic {
        username: String,
        password: SecretString,
    },

    /// Static secret headers, e.g. `X-API-KEY`
    ApiKey(Vec<(&'static str, SecretString)>),
}

impl AuthScheme {
    /// Attach the credentials to `request`
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            AuthScheme::None => request,
            AuthScheme::Bearer(token) => request.bearer_auth(token.expose_secret().as_str()),
            AuthScheme::Basic { username, password } => {
                request.basic_auth(username, Some(password.expose_secret().as_str()))
            }
            AuthScheme::ApiKey(headers) => headers.iter().fold(request, |req, (name, value)| {
                req.header(*name, value.expose_secret().as_str())
            }),
        }
    }
}

/// Exchange form credentials for a bearer token
///
/// POSTs `form` to `url` and reads the token at the JSON pointer
/// `token_pointer` (e.g. `/data/access_token`). A non-2xx reply is an
/// authentication failure carrying the raw body; an OK reply without a
/// token is an invalid response. Transport errors are retried, rejected
/// credentials never are.
pub async fn exchange_bearer_token(
    session: &HttpSession,
    url: &str,
    form: &[(&str, &str)],
    token_pointer: &str,
) -> Result<SecretString> {
    let vendor = session.vendor();

    let body = retry_request(session.retry_config(), vendor, move || async move {
        let response = session
            .client()
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| connection_error(vendor, &e))?;

        let status = response.status();
        if status.is_server_error() || status.as_u16() == 429 {
            let text = response.text().await.unwrap_or_default();
            return Err(VendorError::from_status(vendor.to_string(), status.as_u16(), text).into());
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(VendorError::AuthenticationFailed {
                vendor: vendor.to_string(),
                message: text,
            }
            .into());
        }
        decode_json(vendor, response).await
    })
    .await?;

    let token = body
        .pointer(token_pointer)
        .and_then(|v| v.as_str())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            VendorError::invalid_response(
                vendor.to_string(),
                format!("token response has no `{token_pointer}`"),
            )
        })?;

    tracing::info!(vendor = %vendor, "Obtained access token");
    Ok(secret_string(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::tests::fast_http_config;
    use crate::adapters::http::join_url;
    use crate::domain::{SatchelError, VendorKind};
    use mockito::Matcher;

    #[tokio::test]
    async fn test_exchange_reads_nested_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/authorize")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("client_id".into(), "id".into()),
                Matcher::UrlEncoded("client_secret".into(), "secret".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":{"access_token":"tok-1"}}"#)
            .create_async()
            .await;

        let session = HttpSession::new(VendorKind::Edumate, &fast_http_config()).unwrap();
        let token = exchange_bearer_token(
            &session,
            &join_url(&server.url(), "api/authorize"),
            &[("client_id", "id"), ("client_secret", "secret")],
            "/data/access_token",
        )
        .await
        .unwrap();

        assert_eq!(token.expose_secret().as_str(), "tok-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_credentials_carry_response_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/gettoken")
            .with_status(401)
            .with_body("invalid username or password")
            .expect(1)
            .create_async()
            .await;

        let session = HttpSession::new(VendorKind::Engage, &fast_http_config()).unwrap();
        let err = exchange_bearer_token(
            &session,
            &join_url(&server.url(), "api/gettoken"),
            &[("username", "u"), ("password", "p")],
            "/access_token",
        )
        .await
        .unwrap_err();

        match err {
            SatchelError::Vendor(VendorError::AuthenticationFailed { vendor, message }) => {
                assert_eq!(vendor, "engage");
                assert_eq!(message, "invalid username or password");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_token_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(r#"{"data":{}}"#)
            .create_async()
            .await;

        let session = HttpSession::new(VendorKind::Edumate, &fast_http_config()).unwrap();
        let err = exchange_bearer_token(
            &session,
            &join_url(&server.url(), "token"),
            &[],
            "/data/access_token",
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            SatchelError::Vendor(VendorError::InvalidResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_bearer_scheme_sets_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/me")
            .match_header("authorization", "Bearer abc")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let mut session = HttpSession::new(VendorKind::Engage, &fast_http_config()).unwrap();
        session.set_auth(AuthScheme::Bearer(secret_string("abc")));
        session
            .get_json(&join_url(&server.url(), "me"), &[])
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[test]
    fn test_debug_does_not_leak_secrets() {
        let scheme = AuthScheme::Basic {
            username: "office".to_string(),
            password: secret_string("hunter2"),
        };
        assert!(!format!("{scheme:?}").contains("hunter2"));
    }
}
