use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde_json::Value as JsonValue;

/// An outbound call after the caller has described it and before it is sent.
///
/// Request middleware mutate this in place.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    /// Path relative to the API base URL, starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<JsonValue>,
}

impl PreparedRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: &[(&str, &str)]) -> Self {
        self.query = query
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Set a header, replacing any previous value.
    ///
    /// Values that are not valid header text are logged and skipped.
    pub fn set_header(&mut self, name: HeaderName, value: &str) {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.insert(name, value);
            }
            Err(e) => tracing::warn!(header = %name, error = %e, "Dropping invalid header value"),
        }
    }

    /// Header value as text, if present and printable.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// What came back over the wire, before response middleware run.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    /// Parsed JSON body; `Null` for an empty body, a JSON string for non-JSON text.
    pub body: JsonValue,
}

impl RawResponse {
    #[must_use]
    pub fn new(status: StatusCode, body: JsonValue) -> Self {
        Self { status, body }
    }

    /// Interpret raw body bytes.
    #[must_use]
    pub fn from_bytes(status: StatusCode, bytes: &[u8]) -> Self {
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            JsonValue::Null
        } else {
            serde_json::from_slice(bytes).unwrap_or_else(|_| {
                JsonValue::String(String::from_utf8_lossy(bytes).into_owned())
            })
        };
        Self { status, body }
    }
}
