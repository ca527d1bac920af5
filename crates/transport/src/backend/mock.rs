//! In-memory transport for testing.

use super::join;
use crate::error::{ErrorKind, Result};
use crate::message::{Credential, Request, Response};
use crate::Transport;
use async_trait::async_trait;
use reqwest::Url;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, Semaphore};

enum Route {
    Respond(Response),
    Fail(ErrorKind),
}

/// In-memory transport for testing.
///
/// Routes are keyed by the request's display form (`/search?q=`,
/// `/preview/4/12`, ...). Unknown routes answer `404`. Every call is counted
/// *before* it is answered, so tests can assert how many exchanges were
/// started while responses are still being [held](Self::held).
///
/// # Examples
///
/// ```ignore
/// use folio_transport::{Credential, MockTransport, Request, Response, Transport};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = MockTransport::default().with_route("/preview/1/2", Response::ok("text/plain", "hello"));
/// let response = transport.get(&Request::get(["preview", "1", "2"]), &Credential::bearer("t")).await.unwrap();
/// assert_eq!(response.body(), b"hello");
/// assert_eq!(transport.calls("/preview/1/2").await, 1);
/// # Ok(())
/// # }
/// ```
pub struct MockTransport {
    name: String,
    routes: RwLock<HashMap<String, Route>>,
    calls: Mutex<HashMap<String, usize>>,
    credential: Option<Credential>,
    gate: Option<Arc<Semaphore>>,
}

impl MockTransport {
    /// Change the name of the mock transport.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Answer `path` with `response`.
    pub fn with_route(mut self, path: impl Into<String>, response: Response) -> Self {
        self.routes.get_mut().insert(path.into(), Route::Respond(response));
        self
    }

    /// Answer `path` with a JSON body.
    pub fn with_json(self, path: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.with_route(path, Response::json(body))
    }

    /// Reject (with `401`) every request whose credential differs from this one.
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Hold every response until [`release`](Self::release) hands out permits.
    pub fn held(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Let `responses` held responses through. No-op unless [`held`](Self::held).
    pub fn release(&self, responses: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(responses);
        }
    }

    /// Replace (or add) a route while the transport is in use.
    pub async fn set_route(&self, path: impl Into<String>, response: Response) {
        self.routes.write().await.insert(path.into(), Route::Respond(response));
    }

    /// Make `path` fail at the transport level (as if the connection dropped).
    pub async fn set_failure(&self, path: impl Into<String>, kind: ErrorKind) {
        self.routes.write().await.insert(path.into(), Route::Fail(kind));
    }

    /// Number of exchanges started for `path`.
    pub async fn calls(&self, path: &str) -> usize {
        self.calls.lock().await.get(path).copied().unwrap_or(0)
    }

    /// Number of exchanges started across all paths.
    pub async fn total_calls(&self) -> usize {
        self.calls.lock().await.values().sum()
    }
}
impl Default for MockTransport {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            routes: RwLock::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
            credential: None,
            gate: None,
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self, request: &Request) -> Result<Url> {
        let base = Url::parse(&format!("mock://{}/", self.name))
            .map_err(|_| exn::Exn::from(ErrorKind::InvalidRequest(format!("invalid mock name: {}", self.name))))?;
        join(&base, request)
    }

    async fn get(&self, request: &Request, credential: &Credential) -> Result<Response> {
        let key = request.to_string();
        *self.calls.lock().await.entry(key.clone()).or_insert(0) += 1;
        if let Some(gate) = &self.gate
            && let Ok(permit) = gate.acquire().await
        {
            permit.forget();
        }
        if self.credential.as_ref().is_some_and(|expected| expected != credential) {
            return Ok(Response::new(401, Some("application/json".to_string()), r#"{"detail":"Invalid token"}"#));
        }
        match self.routes.read().await.get(&key) {
            Some(Route::Respond(response)) => Ok(response.clone()),
            Some(Route::Fail(kind)) => Err(exn::Exn::from(kind.clone())),
            None => Ok(Response::new(404, Some("application/json".to_string()), r#"{"detail":"Not Found"}"#)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> Credential {
        Credential::bearer("token")
    }

    #[tokio::test]
    async fn test_route_and_count() {
        let transport = MockTransport::default().with_json("/search?q=", "[]");
        let request = Request::get(["search"]).with_query("q", "");
        let response = transport.get(&request, &credential()).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.content_type(), Some("application/json"));
        transport.get(&request, &credential()).await.unwrap();
        assert_eq!(transport.calls("/search?q=").await, 2);
        assert_eq!(transport.total_calls().await, 2);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let transport = MockTransport::default();
        let response = transport.get(&Request::get(["document", "9"]), &credential()).await.unwrap();
        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn test_wrong_credential_is_rejected() {
        let transport = MockTransport::default().with_credential(credential()).with_json("/document/1", "{}");
        let rejected = transport.get(&Request::get(["document", "1"]), &Credential::bearer("nope")).await.unwrap();
        assert_eq!(rejected.status(), 401);
        let accepted = transport.get(&Request::get(["document", "1"]), &credential()).await.unwrap();
        assert_eq!(accepted.status(), 200);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let transport = MockTransport::default();
        transport.set_failure("/document/1", ErrorKind::Network("reset".to_string())).await;
        let err = transport.get(&Request::get(["document", "1"]), &credential()).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Network("reset".to_string()));
    }

    #[tokio::test]
    async fn test_held_until_released() {
        let transport = MockTransport::default().held().with_route("/a", Response::ok("text/plain", "x"));
        let request = Request::get(["a"]);
        let credential = credential();
        let pending = transport.get(&request, &credential);
        let release = async {
            // The call is counted even though its response is held.
            while transport.calls("/a").await == 0 {
                tokio::task::yield_now().await;
            }
            transport.release(1);
        };
        let (response, ()) = tokio::join!(pending, release);
        assert_eq!(response.unwrap().body(), b"x");
    }

    #[test]
    fn test_url() {
        let transport = MockTransport::default().with_name("catalog");
        let url = transport.url(&Request::get(["download", "5"])).unwrap();
        assert_eq!(url.as_str(), "mock://catalog/download/5");
    }
}
