#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;

use portal_core::http::{HttpResponse, PendingRequest, Transport};
use portal_core::{ApiClient, MemoryStorage, PortalError, Session, SessionStore, UserProfile};
use url::Url;

pub const BASE_URL: &str = "http://portal.test/";

pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

/// Scripted backend: replies are queued per `"METHOD /path"` and served in
/// order. Every request is recorded.
#[derive(Default)]
pub struct StubBackend {
    replies: RefCell<HashMap<String, VecDeque<Result<HttpResponse, PortalError>>>>,
    requests: RefCell<Vec<PendingRequest>>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, route: &str, status: u16, body: &str) -> Self {
        self.push(route, Ok(HttpResponse::new(status, body)));
        self
    }

    pub fn fail(self, route: &str, message: &str) -> Self {
        self.push(route, Err(PortalError::Network(message.to_string())));
        self
    }

    fn push(&self, route: &str, reply: Result<HttpResponse, PortalError>) {
        self.replies
            .borrow_mut()
            .entry(route.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn requests(&self) -> Vec<PendingRequest> {
        self.requests.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.borrow().len()
    }

    /// `"METHOD /path"` of every request, in order.
    pub fn routes(&self) -> Vec<String> {
        self.requests.borrow().iter().map(route_of).collect()
    }
}

fn route_of(request: &PendingRequest) -> String {
    match request.url.query() {
        Some(query) => format!("{} {}?{}", request.method, request.url.path(), query),
        None => format!("{} {}", request.method, request.url.path()),
    }
}

impl Transport for StubBackend {
    async fn send(&self, request: PendingRequest) -> Result<HttpResponse, PortalError> {
        let route = route_of(&request);
        self.requests.borrow_mut().push(request);
        self.replies
            .borrow_mut()
            .get_mut(&route)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| panic!("No reply queued for {}", route))
    }
}

pub type TestClient = ApiClient<StubBackend, MemoryStorage>;

pub fn make_user() -> UserProfile {
    serde_json::from_str(&fixture("user.json")).expect("user fixture")
}

pub fn make_client(backend: StubBackend) -> TestClient {
    make_client_at(backend, BASE_URL)
}

pub fn make_client_at(backend: StubBackend, base_url: &str) -> TestClient {
    ApiClient::new(
        backend,
        SessionStore::new(MemoryStorage::new(), "authState"),
        Url::parse(base_url).unwrap(),
    )
}

/// Client whose store already holds a logged-in session.
pub fn logged_in_client(backend: StubBackend, access: &str, refresh: &str) -> TestClient {
    let client = make_client(backend);
    client
        .session_store()
        .save(&Session::authenticated(
            make_user(),
            access.to_string(),
            Some(refresh.to_string()),
        ))
        .unwrap();
    client
}
