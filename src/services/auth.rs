use std::sync::Arc;

use crate::error::Error;
use crate::proxy::{HttpTransport, Proxy, Transport};
use crate::types::{ApiResponse, LoginRequest, LoginResponse, RegisterRequest, User};

/// `/auth` endpoints. Validation is left to the server.
pub struct AuthService<T = HttpTransport> {
    proxy: Arc<Proxy<T>>,
}

// Manual Clone: avoid derive adding a `T: Clone` bound.
impl<T> Clone for AuthService<T> {
    fn clone(&self) -> Self {
        Self {
            proxy: self.proxy.clone(),
        }
    }
}

impl<T: Transport> AuthService<T> {
    #[must_use]
    pub fn new(proxy: Arc<Proxy<T>>) -> Self {
        Self { proxy }
    }

    /// `POST /auth/login`. The server answers `201` with the user and token.
    ///
    /// # Errors
    ///
    /// Propagates the proxy's [`Error`] unchanged.
    pub async fn login(&self, payload: &LoginRequest) -> Result<ApiResponse<LoginResponse>, Error> {
        self.proxy.post_json("/auth/login", payload).await
    }

    /// `POST /auth/register`.
    ///
    /// # Errors
    ///
    /// Propagates the proxy's [`Error`] unchanged.
    pub async fn register(&self, payload: &RegisterRequest) -> Result<ApiResponse<User>, Error> {
        self.proxy.post_json("/auth/register", payload).await
    }

    /// `GET /auth/verify-token`, authenticated by the stored access token.
    ///
    /// # Errors
    ///
    /// Propagates the proxy's [`Error`] unchanged.
    pub async fn verify(&self) -> Result<ApiResponse<User>, Error> {
        self.proxy.get_json("/auth/verify-token", &[]).await
    }
}
