//! Request and response middleware.
//!
//! The proxy runs request middleware in order over every [`PreparedRequest`]
//! before it is sent, then runs response middleware in order over the
//! outcome. The built-in chain carries the header rules every request needs.

use std::sync::Arc;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderName};

use super::request::{PreparedRequest, RawResponse};
use crate::cookies::{ACCESS_TOKEN_COOKIE, CookieStore};
use crate::error::ErrorResponse;
use crate::identity::ClientId;

/// Result of a call as it travels through response middleware.
pub type Outcome = Result<RawResponse, ErrorResponse>;

pub const AGENT_CODE: HeaderName = HeaderName::from_static("agent-code");
pub const AGENT_IP: HeaderName = HeaderName::from_static("agent-ip");

const JSON: &str = "application/json";
/// What an unset token renders as on the web front end; never a real credential.
const PLACEHOLDER_AUTHORIZATION: &str = "Bearer undefined";

pub trait RequestMiddleware: Send + Sync {
    fn on_request(&self, request: &mut PreparedRequest);
}

pub trait ResponseMiddleware: Send + Sync {
    fn on_response(&self, request: &PreparedRequest, outcome: Outcome) -> Outcome;
}

/// `Authorization` header.
///
/// A token in the cookie store always wins; otherwise the caller-supplied
/// fallback is used unless it is the placeholder.
pub struct AuthorizationHeader {
    cookies: Arc<CookieStore>,
    fallback: Option<String>,
}

impl AuthorizationHeader {
    #[must_use]
    pub fn new(cookies: Arc<CookieStore>, fallback: Option<String>) -> Self {
        Self { cookies, fallback }
    }
}

impl RequestMiddleware for AuthorizationHeader {
    fn on_request(&self, request: &mut PreparedRequest) {
        if let Some(token) = self.cookies.get(ACCESS_TOKEN_COOKIE) {
            request.set_header(AUTHORIZATION, &format!("Bearer {token}"));
        } else if let Some(fallback) = self
            .fallback
            .as_deref()
            .filter(|value| *value != PLACEHOLDER_AUTHORIZATION)
        {
            request.set_header(AUTHORIZATION, fallback);
        }
    }
}

/// `Agent-Code` and `Agent-Ip`, both set to the client identity.
pub struct ClientIdentityHeaders {
    client_id: ClientId,
}

impl ClientIdentityHeaders {
    #[must_use]
    pub fn new(client_id: ClientId) -> Self {
        Self { client_id }
    }
}

impl RequestMiddleware for ClientIdentityHeaders {
    fn on_request(&self, request: &mut PreparedRequest) {
        request.set_header(AGENT_CODE, self.client_id.as_str());
        request.set_header(AGENT_IP, self.client_id.as_str());
    }
}

/// `Accept` and `Content-Type`, JSON unless overridden.
pub struct ContentHeaders {
    accept: String,
    content_type: String,
}

impl ContentHeaders {
    #[must_use]
    pub fn new(accept: Option<String>, content_type: Option<String>) -> Self {
        Self {
            accept: accept.unwrap_or_else(|| JSON.into()),
            content_type: content_type.unwrap_or_else(|| JSON.into()),
        }
    }
}

impl RequestMiddleware for ContentHeaders {
    fn on_request(&self, request: &mut PreparedRequest) {
        request.set_header(ACCEPT, &self.accept);
        request.set_header(CONTENT_TYPE, &self.content_type);
    }
}

/// Logs each outbound request. Header values are not logged.
pub struct RequestLog {
    client_id: ClientId,
}

impl RequestLog {
    #[must_use]
    pub fn new(client_id: ClientId) -> Self {
        Self { client_id }
    }
}

impl RequestMiddleware for RequestLog {
    fn on_request(&self, request: &mut PreparedRequest) {
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            client_id = %self.client_id,
            has_body = request.body.is_some(),
            "[REQ]"
        );
    }
}

/// Turns anything outside 2xx into the rejected server response.
pub struct RejectNonSuccess;

impl ResponseMiddleware for RejectNonSuccess {
    fn on_response(&self, request: &PreparedRequest, outcome: Outcome) -> Outcome {
        let response = outcome?;
        if response.status.is_success() {
            return Ok(response);
        }
        tracing::warn!(
            method = %request.method,
            path = %request.path,
            status = response.status.as_u16(),
            "Request rejected"
        );
        Err(ErrorResponse::new(response.status.as_u16(), response.body))
    }
}

/// Logs the status of every response, and transport failures.
pub struct ResponseLog;

impl ResponseMiddleware for ResponseLog {
    fn on_response(&self, request: &PreparedRequest, outcome: Outcome) -> Outcome {
        match &outcome {
            Ok(response) => tracing::debug!(
                method = %request.method,
                path = %request.path,
                status = response.status.as_u16(),
                "[RES]"
            ),
            Err(e) if e.status.is_none() => tracing::warn!(
                method = %request.method,
                path = %request.path,
                error = %e,
                "No response"
            ),
            Err(_) => {}
        }
        outcome
    }
}
