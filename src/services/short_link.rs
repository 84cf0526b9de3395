use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::error::Error;
use crate::proxy::{HttpTransport, Proxy, Transport};
use crate::types::{ApiResponse, ShortLink, ShortLinkRequest};

/// `/short-links` endpoints.
pub struct ShortLinkService<T = HttpTransport> {
    proxy: Arc<Proxy<T>>,
}

impl<T> Clone for ShortLinkService<T> {
    fn clone(&self) -> Self {
        Self {
            proxy: self.proxy.clone(),
        }
    }
}

impl<T: Transport> ShortLinkService<T> {
    #[must_use]
    pub fn new(proxy: Arc<Proxy<T>>) -> Self {
        Self { proxy }
    }

    /// `GET /short-links/redirect/:code`; returns the envelope's `data`.
    ///
    /// # Errors
    ///
    /// Propagates the proxy's [`Error`] unchanged.
    pub async fn redirect(&self, short_code: &str) -> Result<JsonValue, Error> {
        let path = format!("/short-links/redirect/{}", urlencoding::encode(short_code));
        let mut body = self.proxy.get(&path, &[]).await?;
        Ok(body
            .get_mut("data")
            .map(JsonValue::take)
            .unwrap_or(JsonValue::Null))
    }

    /// `GET /short-links`.
    ///
    /// # Errors
    ///
    /// Propagates the proxy's [`Error`] unchanged.
    pub async fn find_all(&self) -> Result<ApiResponse<Vec<ShortLink>>, Error> {
        self.proxy.get_json("/short-links", &[]).await
    }

    /// `POST /short-links`.
    ///
    /// # Errors
    ///
    /// Propagates the proxy's [`Error`] unchanged.
    pub async fn create(
        &self,
        payload: &ShortLinkRequest,
    ) -> Result<ApiResponse<ShortLink>, Error> {
        self.proxy.post_json("/short-links", payload).await
    }

    /// `GET /short-links/me`: links owned by the authenticated user.
    ///
    /// # Errors
    ///
    /// Propagates the proxy's [`Error`] unchanged.
    pub async fn me(&self) -> Result<ApiResponse<Vec<ShortLink>>, Error> {
        self.proxy.get_json("/short-links/me", &[]).await
    }
}
