use std::future::Future;

use url::Url;

use super::request::{PreparedRequest, RawResponse};
use crate::config::ClientConfig;
use crate::error::Error;

/// Failure to obtain any response at all.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TransportError {
    #[error("Request timed out")]
    Timeout,
    #[error("Connection failed: {0}")]
    Connect(String),
    #[error("Transport error: {0}")]
    Other(String),
}

/// Sends a fully prepared request somewhere and returns what came back.
///
/// Non-2xx statuses are not errors at this level; only the absence of a
/// response is.
pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        request: &PreparedRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

/// `reqwest`-backed transport bound to the configured base URL and timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Config(format!("HTTP client: {e}")))?;
        Ok(Self {
            base_url: config.base_url().clone(),
            http,
        })
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    ///
    /// The client's own timeout applies instead of the configured one.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Absolute URL for a base-relative path.
    ///
    /// Appends rather than resolves, so a base of `.../api` keeps its `/api`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Other`] if the result is not a valid URL.
    pub fn url_for(&self, path: &str) -> Result<Url, TransportError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
            .parse()
            .map_err(|e| TransportError::Other(format!("invalid URL for {path}: {e}")))
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: &PreparedRequest) -> Result<RawResponse, TransportError> {
        let url = self.url_for(&request.path)?;

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .headers(request.headers.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body)
                .map_err(|e| TransportError::Other(format!("request body: {e}")))?;
            builder = builder.body(bytes);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(RawResponse::from_bytes(status, &bytes))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_keeps_base_path() {
        let transport = HttpTransport::new(&ClientConfig::default()).unwrap();

        assert_eq!(
            transport.url_for("/auth/login").unwrap().as_str(),
            "http://localhost:3000/api/auth/login"
        );
        assert_eq!(
            transport.url_for("short-links/me").unwrap().as_str(),
            "http://localhost:3000/api/short-links/me"
        );
    }

    #[test]
    fn test_url_with_trailing_slash_base() {
        let config = ClientConfig::new("https://api.example.com/v1/".parse().unwrap());
        let transport = HttpTransport::new(&config).unwrap();

        assert_eq!(
            transport.url_for("/statistics").unwrap().as_str(),
            "https://api.example.com/v1/statistics"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_transport_error() {
        let config = ClientConfig::new("http://127.0.0.1:9/api".parse().unwrap())
            .with_timeout(std::time::Duration::from_secs(2));
        let transport = HttpTransport::new(&config).unwrap();

        let request = PreparedRequest::new(reqwest::Method::GET, "/auth/verify-token");
        assert!(transport.send(&request).await.is_err());
    }
}
