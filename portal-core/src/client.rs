//! Authenticated request pipeline.
//!
//! Every call to the backend goes through [`ApiClient::authenticated_request`]:
//!
//! 1. Read the session; without an access token fail with `Unauthenticated`
//!    before touching the network
//! 2. Send the request with `Authorization: Bearer <token>`
//! 3. On 401, refresh the access token once, persist it, and replay the
//!    original request once with the new token. A failed refresh clears
//!    the session and fails with `AuthExpired`
//! 4. Non-2xx after that is an `Http` error carrying the parsed body
//! 5. A 2xx body that is not JSON is a `Protocol` error
//!
//! The single retry is a hard cap: a refreshed token that is rejected again
//! surfaces as `Http { status: 401 }` instead of looping.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use url::Url;

use crate::auth::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, DEFAULT_LOGIN_ERROR};
use crate::config::PortalConfig;
use crate::endpoints;
use crate::error::PortalError;
use crate::http::{HttpResponse, PendingRequest, Transport};
use crate::session::{Session, SessionStorage, SessionStore, UserProfile};

/// Method, extra headers and body of a call, before auth is attached.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Request with `body` serialized as JSON.
    pub fn json<B: Serialize + ?Sized>(method: Method, body: &B) -> Result<Self, PortalError> {
        let body = serde_json::to_string(body)
            .map_err(|e| PortalError::Protocol(format!("Failed to serialize request body: {}", e)))?;
        Ok(Self {
            method,
            headers: HeaderMap::new(),
            body: Some(body),
        })
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

/// Client for the portal REST API, owning the transport and the session store.
pub struct ApiClient<T, S> {
    transport: T,
    store: SessionStore<S>,
    base_url: Url,
}

impl<T: Transport, S: SessionStorage> ApiClient<T, S> {
    pub fn new(transport: T, store: SessionStore<S>, base_url: Url) -> Self {
        Self {
            transport,
            store,
            base_url,
        }
    }

    pub fn from_config(transport: T, storage: S, config: &PortalConfig) -> Self {
        Self::new(
            transport,
            SessionStore::new(storage, config.storage_key.clone()),
            config.base_url.clone(),
        )
    }

    pub fn session_store(&self) -> &SessionStore<S> {
        &self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> Session {
        self.store.load()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.store.current_user()
    }

    /// Absolute URL for a backend path such as `/courses/`. The path is
    /// resolved below the base URL, so a base of `https://host/api` keeps
    /// its `/api` prefix.
    pub fn url(&self, path: &str) -> Result<Url, PortalError> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let dir = format!("{}/", base.path());
            base.set_path(&dir);
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|e| PortalError::Config(format!("Invalid request path '{}': {}", path, e)))
    }

    /// Build the request; `Content-Type` defaults to JSON unless the caller set it.
    fn prepare(&self, path: &str, options: RequestOptions) -> Result<PendingRequest, PortalError> {
        let mut request = PendingRequest::new(options.method, self.url(path)?);
        request.headers = options.headers;
        if !request.headers.contains_key(CONTENT_TYPE) {
            request
                .headers
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        request.body = options.body;
        Ok(request)
    }

    /// Perform a request with bearer auth, refreshing an expired token at
    /// most once. See the module docs for the full contract.
    pub async fn authenticated_request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Value, PortalError> {
        let token = self
            .store
            .load()
            .access_token
            .ok_or(PortalError::Unauthenticated)?;
        let pending = self.prepare(path, options)?;

        let mut response = self.transport.send(pending.with_bearer(&token)?).await?;

        if response.is_unauthorized() {
            info!(
                "Access token rejected for {} {}, refreshing",
                pending.method,
                pending.url.path()
            );
            if let Err(e) = self.refresh().await {
                warn!("Token refresh failed, clearing session: {}", e);
                if let Err(e) = self.store.clear() {
                    warn!("Failed to clear session after refresh failure: {}", e);
                }
                return Err(PortalError::AuthExpired);
            }

            // The refreshed token is read back from the store it was saved to.
            let token = self
                .store
                .access_token()
                .ok_or(PortalError::AuthExpired)?;
            response = self.transport.send(pending.with_bearer(&token)?).await?;
        }

        into_json(response)
    }

    /// Exchange the stored refresh token for a new access token and persist it.
    /// The refresh token itself is left unchanged.
    pub async fn refresh(&self) -> Result<String, PortalError> {
        let refresh_token = self
            .store
            .load()
            .refresh_token
            .ok_or_else(|| PortalError::Rejected("No refresh token available".to_string()))?;

        let options = RequestOptions::json(
            Method::POST,
            &RefreshRequest {
                refresh_token: &refresh_token,
            },
        )?;
        let request = self.prepare(endpoints::REFRESH_TOKEN, options)?;
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(PortalError::Http {
                status: response.status,
                body: response.json_opt(),
            });
        }

        let parsed: RefreshResponse = serde_json::from_str(&response.body)
            .map_err(|e| PortalError::Protocol(format!("Invalid refresh response: {}", e)))?;
        let token = parsed
            .into_token()
            .ok_or_else(|| PortalError::Rejected("Failed to refresh token".to_string()))?;

        self.store.update_access_token(&token)?;
        info!("Access token refreshed");
        Ok(token)
    }

    /// Log in with email and password and persist the new session.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, PortalError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(PortalError::Validation("Please fill in all fields".to_string()));
        }

        info!("Logging in as {}", email);
        let options = RequestOptions::json(Method::POST, &LoginRequest { email, password })?;
        let request = self.prepare(endpoints::LOGIN, options)?;
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(PortalError::Http {
                status: response.status,
                body: response.json_opt(),
            });
        }

        let parsed: LoginResponse = serde_json::from_str(&response.body)
            .map_err(|e| PortalError::Protocol(format!("Invalid login response: {}", e)))?;

        match parsed {
            LoginResponse {
                success: true,
                user: Some(user),
                access_token: Some(access_token),
                refresh_token,
                ..
            } => {
                self.store
                    .save(&Session::authenticated(user.clone(), access_token, refresh_token))?;
                info!("Logged in as {} ({})", user.display_name(), user.user_role);
                Ok(user)
            }
            LoginResponse { error, .. } => {
                warn!("Login rejected for {}", email);
                Err(PortalError::Rejected(
                    error.unwrap_or_else(|| DEFAULT_LOGIN_ERROR.to_string()),
                ))
            }
        }
    }

    /// Drop the stored session. Tokens are stateless, so the backend is not told.
    pub fn logout(&self) -> Result<(), PortalError> {
        self.store.clear()
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, PortalError> {
        let value = self.authenticated_request(path, RequestOptions::get()).await?;
        decode(value)
    }

    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, PortalError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let options = RequestOptions::json(Method::POST, body)?;
        decode(self.authenticated_request(path, options).await?)
    }

    pub async fn put<B, R>(&self, path: &str, body: &B) -> Result<R, PortalError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let options = RequestOptions::json(Method::PUT, body)?;
        decode(self.authenticated_request(path, options).await?)
    }

    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> Result<R, PortalError> {
        decode(self.authenticated_request(path, RequestOptions::delete()).await?)
    }
}

fn into_json(response: HttpResponse) -> Result<Value, PortalError> {
    if !response.is_success() {
        return Err(PortalError::Http {
            status: response.status,
            body: response.json_opt(),
        });
    }
    response.json()
}

fn decode<R: DeserializeOwned>(value: Value) -> Result<R, PortalError> {
    serde_json::from_value(value)
        .map_err(|e| PortalError::Protocol(format!("Unexpected response shape: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStorage;

    #[test]
    fn test_request_options_json_body() {
        let options = RequestOptions::json(Method::PUT, &serde_json::json!({"title": "Algebra"}))
            .unwrap();
        assert_eq!(options.method, Method::PUT);
        assert_eq!(options.body.as_deref(), Some(r#"{"title":"Algebra"}"#));
    }

    fn client_at(base: &str) -> ApiClient<crate::http::ReqwestTransport, MemoryStorage> {
        ApiClient::new(
            crate::http::ReqwestTransport::new(None).unwrap(),
            SessionStore::new(MemoryStorage::new(), "authState"),
            Url::parse(base).unwrap(),
        )
    }

    #[test]
    fn test_url_keeps_base_path_prefix() {
        let client = client_at("http://portal.test/api/");
        assert_eq!(
            client.url("/courses/").unwrap().as_str(),
            "http://portal.test/api/courses/"
        );
        assert_eq!(
            client.url("/courses/lessons/?course=3").unwrap().as_str(),
            "http://portal.test/api/courses/lessons/?course=3"
        );

        let no_slash = client_at("http://portal.test/api");
        assert_eq!(
            no_slash.url("/users/7/").unwrap().as_str(),
            "http://portal.test/api/users/7/"
        );

        let root = client_at("http://portal.test");
        assert_eq!(root.url("/users/").unwrap().as_str(), "http://portal.test/users/");
    }

    #[test]
    fn test_into_json_error_keeps_body() {
        let err = into_json(HttpResponse::new(404, r#"{"error":"Course not found"}"#)).unwrap_err();
        match err {
            PortalError::Http { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body.unwrap()["error"], "Course not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_into_json_error_without_json_body() {
        let err = into_json(HttpResponse::new(502, "Bad Gateway")).unwrap_err();
        assert!(matches!(err, PortalError::Http { status: 502, body: None }));
    }
}
