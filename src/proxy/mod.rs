//! The configured API client every service call goes through.
//!
//! A [`Proxy`] owns a [`Transport`] and two middleware chains. Built-in
//! request middleware attach the bearer token, the client identity headers
//! and the content headers; built-in response middleware log and reject
//! anything outside 2xx. Callers only ever see the response body, or an
//! [`Error::Response`] holding the rejected server response.
//!
//! ```rust,ignore
//! let proxy = Proxy::new(transport, cookies, store.as_ref(), ProxyOptions::default());
//! let links: serde_json::Value = proxy.get("/short-links/me", &[]).await?;
//! ```

mod middleware;
mod request;
mod transport;

use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

pub use middleware::{
    AGENT_CODE, AGENT_IP, AuthorizationHeader, ClientIdentityHeaders, ContentHeaders, Outcome,
    RejectNonSuccess, RequestLog, RequestMiddleware, ResponseLog, ResponseMiddleware,
};
pub use request::{PreparedRequest, RawResponse};
pub use transport::{HttpTransport, Transport, TransportError};

use crate::cookies::CookieStore;
use crate::error::{Error, ErrorResponse};
use crate::identity::ClientId;
use crate::storage::KeyValueStore;

/// Per-proxy header overrides.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct ProxyOptions {
    pub(crate) authorization: Option<String>,
    pub(crate) accept: Option<String>,
    pub(crate) content_type: Option<String>,
}

impl ProxyOptions {
    /// `Authorization` value used only when no access token cookie exists.
    #[must_use]
    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_accept(mut self, value: impl Into<String>) -> Self {
        self.accept = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_content_type(mut self, value: impl Into<String>) -> Self {
        self.content_type = Some(value.into());
        self
    }
}

/// Configured API client with its middleware chains.
pub struct Proxy<T = HttpTransport> {
    transport: T,
    client_id: ClientId,
    extra_request: Vec<Arc<dyn RequestMiddleware>>,
    builtin_request: Vec<Arc<dyn RequestMiddleware>>,
    response_chain: Vec<Arc<dyn ResponseMiddleware>>,
}

impl<T: Transport> Proxy<T> {
    /// Build a proxy, resolving (and if needed creating) the client identity
    /// stored in `store`.
    #[must_use]
    pub fn new(
        transport: T,
        cookies: Arc<CookieStore>,
        store: &dyn KeyValueStore,
        options: ProxyOptions,
    ) -> Self {
        let client_id = ClientId::resolve(store);

        let builtin_request: Vec<Arc<dyn RequestMiddleware>> = vec![
            Arc::new(RequestLog::new(client_id.clone())),
            Arc::new(AuthorizationHeader::new(cookies, options.authorization)),
            Arc::new(ClientIdentityHeaders::new(client_id.clone())),
            Arc::new(ContentHeaders::new(options.accept, options.content_type)),
        ];
        let response_chain: Vec<Arc<dyn ResponseMiddleware>> =
            vec![Arc::new(ResponseLog), Arc::new(RejectNonSuccess)];

        Self {
            transport,
            client_id,
            extra_request: Vec::new(),
            builtin_request,
            response_chain,
        }
    }

    /// Add request middleware. It runs before the built-in header rules, so
    /// it cannot override `Authorization`, the identity or content headers.
    #[must_use]
    pub fn with_request_middleware(mut self, middleware: impl RequestMiddleware + 'static) -> Self {
        self.extra_request.push(Arc::new(middleware));
        self
    }

    /// Add response middleware. It runs after non-2xx responses are rejected.
    #[must_use]
    pub fn with_response_middleware(
        mut self,
        middleware: impl ResponseMiddleware + 'static,
    ) -> Self {
        self.response_chain.push(Arc::new(middleware));
        self
    }

    #[must_use]
    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run `request` through both chains and return the response body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Response`] with the server's status and body for
    /// non-2xx responses, or with no status when nothing came back.
    pub async fn send(&self, mut request: PreparedRequest) -> Result<JsonValue, Error> {
        for middleware in self.extra_request.iter().chain(&self.builtin_request) {
            middleware.on_request(&mut request);
        }

        let mut outcome = self
            .transport
            .send(&request)
            .await
            .map_err(|e| ErrorResponse::transport(e.to_string()));
        for middleware in &self.response_chain {
            outcome = middleware.on_response(&request, outcome);
        }

        Ok(outcome?.body)
    }

    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<JsonValue, Error> {
        self.send(PreparedRequest::new(Method::GET, path).with_query(query))
            .await
    }

    /// # Errors
    ///
    /// See [`send`](Self::send); [`Error::Decode`] if `body` cannot be serialized.
    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<JsonValue, Error> {
        let body = encode(body)?;
        self.send(PreparedRequest::new(Method::POST, path).with_body(body))
            .await
    }

    /// # Errors
    ///
    /// See [`send`](Self::send); [`Error::Decode`] if `body` cannot be serialized.
    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<JsonValue, Error> {
        let body = encode(body)?;
        self.send(PreparedRequest::new(Method::PUT, path).with_body(body))
            .await
    }

    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn delete(&self, path: &str) -> Result<JsonValue, Error> {
        self.send(PreparedRequest::new(Method::DELETE, path)).await
    }

    /// [`get`](Self::get), decoded into `R`.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send); [`Error::Decode`] if the body does not match `R`.
    pub async fn get_json<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<R, Error> {
        decode(self.get(path, query).await?)
    }

    /// [`post`](Self::post), decoded into `R`.
    ///
    /// # Errors
    ///
    /// See [`post`](Self::post); [`Error::Decode`] if the body does not match `R`.
    pub async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, Error> {
        decode(self.post(path, body).await?)
    }
}

fn encode<B: Serialize>(body: &B) -> Result<JsonValue, Error> {
    serde_json::to_value(body).map_err(|e| Error::Decode(format!("request body: {e}")))
}

fn decode<R: DeserializeOwned>(body: JsonValue) -> Result<R, Error> {
    serde_json::from_value(body).map_err(|e| Error::Decode(e.to_string()))
}


#[cfg(test)]
mod tests {
    use super::testing::{MockTransport, reply};
    use super::*;
    use crate::cookies::{ACCESS_TOKEN_COOKIE, CookiePolicy};
    use crate::identity::CLIENT_ID_STORAGE_KEY;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn cookies() -> Arc<CookieStore> {
        Arc::new(CookieStore::new(CookiePolicy::new(false)))
    }

    fn echo_ok() -> MockTransport {
        MockTransport::new(|_| reply(200, json!({ "statusCode": 200, "data": { "id": 1 } })))
    }

    #[tokio::test]
    async fn test_success_returns_body_only() {
        let store = MemoryStore::new();
        let proxy = Proxy::new(echo_ok(), cookies(), &store, ProxyOptions::default());

        let body = proxy.get("/short-links", &[]).await.unwrap();
        assert_eq!(body, json!({ "statusCode": 200, "data": { "id": 1 } }));
    }

    #[tokio::test]
    async fn test_failure_rejects_with_server_response() {
        let store = MemoryStore::new();
        let transport = MockTransport::new(|_| {
            reply(409, json!({ "statusCode": 409, "message": "Email taken" }))
        });
        let proxy = Proxy::new(transport, cookies(), &store, ProxyOptions::default());

        let err = proxy
            .post("/auth/register", &json!({ "email": "a@b.com" }))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(409));
        assert_eq!(err.response().unwrap().message(), Some("Email taken"));
    }

    #[tokio::test]
    async fn test_timeout_rejects_without_status() {
        let store = MemoryStore::new();
        let transport = MockTransport::new(|_| Err(TransportError::Timeout));
        let proxy = Proxy::new(transport, cookies(), &store, ProxyOptions::default());

        let err = proxy.get("/statistics", &[]).await.unwrap_err();
        assert_eq!(err.status_code(), None);
        assert!(matches!(err, Error::Response(_)));
    }

    #[tokio::test]
    async fn test_headers_on_every_request() {
        let store = MemoryStore::new();
        let cookies = cookies();
        cookies.set(ACCESS_TOKEN_COOKIE, "tok123");
        let proxy = Proxy::new(
            echo_ok(),
            cookies,
            &store,
            ProxyOptions::default().with_authorization("Bearer from-caller"),
        );

        proxy.get("/auth/verify-token", &[]).await.unwrap();

        let sent = proxy.transport().requests();
        let request = &sent[0];
        let client_id = proxy.client_id().as_str();
        assert_eq!(request.header("authorization"), Some("Bearer tok123"));
        assert_eq!(request.header("agent-code"), Some(client_id));
        assert_eq!(request.header("agent-ip"), Some(client_id));
        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(request.header("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_token_read_per_request() {
        let store = MemoryStore::new();
        let cookies = cookies();
        let proxy = Proxy::new(echo_ok(), cookies.clone(), &store, ProxyOptions::default());

        proxy.get("/short-links", &[]).await.unwrap();
        cookies.set(ACCESS_TOKEN_COOKIE, "fresh");
        proxy.get("/short-links", &[]).await.unwrap();

        let sent = proxy.transport().requests();
        assert_eq!(sent[0].header("authorization"), None);
        assert_eq!(sent[1].header("authorization"), Some("Bearer fresh"));
    }

    #[tokio::test]
    async fn test_extra_middleware_cannot_override_builtins() {
        struct Spoof;
        impl RequestMiddleware for Spoof {
            fn on_request(&self, request: &mut PreparedRequest) {
                request.set_header(AGENT_CODE, "spoofed");
                request.set_header(reqwest::header::HeaderName::from_static("x-trace"), "t1");
            }
        }

        let store = MemoryStore::new();
        let proxy = Proxy::new(echo_ok(), cookies(), &store, ProxyOptions::default())
            .with_request_middleware(Spoof);
        proxy.get("/", &[]).await.unwrap();

        let sent = proxy.transport().requests();
        assert_eq!(sent[0].header("agent-code"), Some(proxy.client_id().as_str()));
        assert_eq!(sent[0].header("x-trace"), Some("t1"));
    }

    #[test]
    fn test_identity_reused_across_construction() {
        let store = MemoryStore::new();
        assert_eq!(store.get(CLIENT_ID_STORAGE_KEY).unwrap(), None);

        let first = Proxy::new(echo_ok(), cookies(), &store, ProxyOptions::default());
        let second = Proxy::new(echo_ok(), cookies(), &store, ProxyOptions::default());
        assert_eq!(first.client_id(), second.client_id());
    }

    #[tokio::test]
    async fn test_query_and_body_forwarded() {
        let store = MemoryStore::new();
        let proxy = Proxy::new(echo_ok(), cookies(), &store, ProxyOptions::default());

        proxy
            .get("/statistics", &[("startDate", "2024-01-01"), ("endDate", "2024-01-31")])
            .await
            .unwrap();
        proxy
            .post("/short-links", &json!({ "originalUrl": "https://example.com" }))
            .await
            .unwrap();

        let sent = proxy.transport().requests();
        assert_eq!(sent[0].method, Method::GET);
        assert_eq!(
            sent[0].query,
            vec![
                ("startDate".to_string(), "2024-01-01".to_string()),
                ("endDate".to_string(), "2024-01-31".to_string()),
            ]
        );
        assert_eq!(sent[1].method, Method::POST);
        assert_eq!(
            sent[1].body,
            Some(json!({ "originalUrl": "https://example.com" }))
        );
    }

    #[tokio::test]
    async fn test_get_json_decode_error() {
        let store = MemoryStore::new();
        let proxy = Proxy::new(echo_ok(), cookies(), &store, ProxyOptions::default());

        let result: Result<Vec<String>, Error> = proxy.get_json("/short-links", &[]).await;
        assert!(matches!(result, Err(Error::Decode(_))));
    }
}
