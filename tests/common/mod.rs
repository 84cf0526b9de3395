//! In-memory stand-in for the short-link API.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use shortlink_client::{PreparedRequest, RawResponse, Transport, TransportError};

#[derive(Default)]
struct State {
    users: Vec<Value>,
    passwords: Vec<(String, String)>,
    links: Vec<(i64, Value)>,
    requests: Vec<PreparedRequest>,
}

/// Cheap to clone; clones share one backend.
#[derive(Clone, Default)]
pub struct FakeApi {
    state: Arc<Mutex<State>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    fn handle(&self, request: &PreparedRequest) -> (u16, Value) {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());
        let body = request.body.clone().unwrap_or(Value::Null);

        match (&request.method, request.path.as_str()) {
            (&Method::POST, "/auth/register") => {
                let email = body["email"].as_str().unwrap_or_default().to_owned();
                if state.users.iter().any(|u| u["email"] == email.as_str()) {
                    return (409, json!({ "statusCode": 409, "message": "Email already exists" }));
                }
                let id = state.users.len() as i64 + 1;
                let user = json!({
                    "id": id,
                    "email": email,
                    "fullName": body["fullName"],
                    "status": "active",
                    "createdAt": "2024-05-01T10:00:00.000Z",
                    "updatedAt": "2024-05-01T10:00:00.000Z",
                    "shortLinks": null
                });
                let password = body["password"].as_str().unwrap_or_default().to_owned();
                state.passwords.push((email, password));
                state.users.push(user.clone());
                (201, json!({ "statusCode": 201, "message": "Registered", "data": user }))
            }
            (&Method::POST, "/auth/login") => {
                let email = body["email"].as_str().unwrap_or_default();
                let password = body["password"].as_str().unwrap_or_default();
                let known = state
                    .passwords
                    .iter()
                    .any(|(e, p)| e == email && p == password);
                match state.users.iter().find(|u| u["email"] == email).filter(|_| known) {
                    Some(user) => (
                        201,
                        json!({
                            "statusCode": 201,
                            "data": { "user": user, "accessToken": format!("tok-{}", user["id"]) }
                        }),
                    ),
                    None => (401, json!({ "statusCode": 401, "message": "Invalid credentials" })),
                }
            }
            (&Method::GET, "/auth/verify-token") => match current_user(&state, request) {
                Some(user) => (200, json!({ "statusCode": 200, "data": user })),
                None => unauthorized(),
            },
            (&Method::POST, "/short-links") => {
                let Some(user) = current_user(&state, request) else {
                    return unauthorized();
                };
                let owner = user["id"].as_i64().unwrap_or_default();
                let id = state.links.len() as i64 + 1;
                let code = format!("s{id}");
                let link = json!({
                    "id": id,
                    "originalUrl": body["originalUrl"],
                    "shortCode": code,
                    "shortUrl": format!("http://localhost:3000/{code}"),
                    "clickCount": 0,
                    "expiresAt": null,
                    "createdAt": "2024-05-02T10:00:00.000Z",
                    "updatedAt": "2024-05-02T10:00:00.000Z"
                });
                state.links.push((owner, link.clone()));
                (201, json!({ "statusCode": 201, "data": link }))
            }
            (&Method::GET, "/short-links/me") => {
                let Some(user) = current_user(&state, request) else {
                    return unauthorized();
                };
                let owner = user["id"].as_i64().unwrap_or_default();
                let mine: Vec<Value> = state
                    .links
                    .iter()
                    .filter(|(o, _)| *o == owner)
                    .map(|(_, link)| link.clone())
                    .collect();
                (200, json!({ "statusCode": 200, "data": mine }))
            }
            (&Method::GET, path) if path.starts_with("/short-links/redirect/") => {
                let code = &path["/short-links/redirect/".len()..];
                match state.links.iter().find(|(_, l)| l["shortCode"] == code) {
                    Some((_, link)) => (
                        200,
                        json!({
                            "statusCode": 200,
                            "data": { "originalUrl": link["originalUrl"] }
                        }),
                    ),
                    None => (404, json!({ "statusCode": 404, "message": "Short link not found" })),
                }
            }
            (&Method::GET, "/statistics") => (
                200,
                json!({
                    "statusCode": 200,
                    "data": {
                        "totalLink": state.links.len(),
                        "totalClick": "42",
                        "totalLinkExpired": 0
                    }
                }),
            ),
            (&Method::GET, "/statistics/click-count-chart") => (
                200,
                json!({
                    "statusCode": 200,
                    "data": [
                        { "date": "2024-05-01", "count": "10" },
                        { "date": "2024-05-03", "count": 32 }
                    ]
                }),
            ),
            (&Method::GET, "/statistics/browser-chart") => (
                200,
                json!({
                    "statusCode": 200,
                    "data": [
                        { "name": "Chrome", "count": 30 },
                        { "name": null, "count": "10" },
                        { "name": "Firefox", "count": 2 }
                    ]
                }),
            ),
            _ => (404, json!({ "statusCode": 404, "message": "Not found" })),
        }
    }
}

impl Transport for FakeApi {
    async fn send(&self, request: &PreparedRequest) -> Result<RawResponse, TransportError> {
        let (status, body) = self.handle(request);
        let status =
            StatusCode::from_u16(status).map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(RawResponse::new(status, body))
    }
}

fn current_user(state: &State, request: &PreparedRequest) -> Option<Value> {
    let token = request.header("authorization")?.strip_prefix("Bearer tok-")?;
    state
        .users
        .iter()
        .find(|u| u["id"].to_string() == token)
        .cloned()
}

fn unauthorized() -> (u16, Value) {
    (401, json!({ "statusCode": 401, "message": "Unauthorized" }))
}
