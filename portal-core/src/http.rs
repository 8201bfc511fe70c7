use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::PortalError;

/// A fully built request, kept around so it can be replayed once after a
/// token refresh.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub url: Url,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl PendingRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            url,
            method,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Copy of this request carrying `Authorization: Bearer <token>`,
    /// replacing any Authorization header already present.
    pub fn with_bearer(&self, token: &str) -> Result<Self, PortalError> {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| PortalError::Protocol("Access token is not a valid header value".into()))?;
        let mut request = self.clone();
        request.headers.insert(AUTHORIZATION, value);
        Ok(request)
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }
}

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    pub fn json(&self) -> Result<Value, PortalError> {
        serde_json::from_str(&self.body)
            .map_err(|e| PortalError::Protocol(format!("Response is not JSON: {}", e)))
    }

    /// Parsed body if there is one, for attaching to error values.
    pub fn json_opt(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Sends a request and reports the response, whatever its status.
///
/// Only transport-level failures are errors here; status handling is the
/// caller's job. Futures need not be `Send`, the portal runs on a single
/// cooperative thread.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, request: PendingRequest) -> Result<HttpResponse, PortalError>;
}

/// [`Transport`] over `reqwest`, usable natively and in the browser.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self, PortalError> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = match timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };
        #[cfg(target_arch = "wasm32")]
        let _ = timeout;

        let client = builder
            .build()
            .map_err(|e| PortalError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: PendingRequest) -> Result<HttpResponse, PortalError> {
        debug!("{} {}", request.method, request.url);
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| PortalError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| PortalError::Network(format!("Failed to read response body: {}", e)))?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_request() -> PendingRequest {
        PendingRequest::new(Method::GET, Url::parse("http://localhost/courses/").unwrap())
    }

    #[test]
    fn test_with_bearer_replaces_existing_header() {
        let mut request = make_request();
        request
            .headers
            .insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));

        let authed = request.with_bearer("tok").unwrap();
        assert_eq!(authed.bearer_token(), Some("tok"));
        assert_eq!(authed.headers.get_all(AUTHORIZATION).iter().count(), 1);
        // original untouched for a later retry
        assert_eq!(request.bearer_token(), None);
    }

    #[test]
    fn test_with_bearer_rejects_invalid_token() {
        assert!(make_request().with_bearer("bad\ntoken").is_err());
    }

    #[test]
    fn test_response_status_ranges() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(HttpResponse::new(401, "").is_unauthorized());
    }

    #[test]
    fn test_response_json() {
        let ok = HttpResponse::new(200, r#"{"success":true}"#);
        assert_eq!(ok.json().unwrap()["success"], true);

        let html = HttpResponse::new(200, "<html></html>");
        assert!(matches!(html.json(), Err(PortalError::Protocol(_))));
        assert!(html.json_opt().is_none());
    }
}
