//! Client-side authentication session.
//!
//! One [`Session`] exists per running client; construct it once and hand
//! references (or an `Arc`) to whatever needs to read or drive it.
//!
//! ```text
//! Anonymous --authorize()/login()--> Authenticating --ok--> Authenticated
//!                                          |
//!                                          +--fail--> AuthFailed / Anonymous
//! Authenticated --logout()--> Anonymous
//! ```
//!
//! Overlapping `authorize`/`login`/`logout` calls are ordered by start time:
//! a result only lands if no newer one of those calls started while it was
//! in flight. Stale results are dropped, including their cookie side effects.

use std::sync::{Arc, PoisonError, RwLock};

use serde_json::json;

use crate::cookies::{ACCESS_TOKEN_COOKIE, CookieStore};
use crate::error::{Error, ErrorResponse};
use crate::locale::Locale;
use crate::messages::Message;
use crate::proxy::{HttpTransport, Transport};
use crate::services::AuthService;
use crate::types::{LoginRequest, LoginResponse, RegisterRequest, User};

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated,
    AuthFailed,
}

/// Point-in-time copy of the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub status: SessionStatus,
    pub user: Option<User>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Sign-up form as entered, confirmation included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    fn to_request(&self) -> RegisterRequest {
        RegisterRequest {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    user: Option<User>,
    error: Option<String>,
    /// Outcome of the last settled `authorize`/`login`/`logout`; never
    /// `Authenticating`.
    settled: SessionStatus,
    /// The newest sequenced operation has not finished yet.
    auth_pending: bool,
    in_flight: usize,
    latest_auth_op: u64,
    locale: Locale,
}

impl Inner {
    fn status(&self) -> SessionStatus {
        if self.auth_pending {
            SessionStatus::Authenticating
        } else {
            self.settled
        }
    }
}

/// Authentication state plus the flows that change it.
pub struct Session<T = HttpTransport> {
    auth: AuthService<T>,
    cookies: Arc<CookieStore>,
    inner: RwLock<Inner>,
}

impl<T: Transport> Session<T> {
    /// An empty (anonymous) session reporting errors in `locale`.
    #[must_use]
    pub fn new(auth: AuthService<T>, cookies: Arc<CookieStore>, locale: Locale) -> Self {
        Self {
            auth,
            cookies,
            inner: RwLock::new(Inner {
                locale,
                ..Inner::default()
            }),
        }
    }

    /// Language used for `error` messages from now on.
    pub fn set_locale(&self, locale: Locale) {
        self.write().locale = locale;
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        let inner = self.read();
        SessionState {
            status: inner.status(),
            user: inner.user.clone(),
            is_loading: inner.in_flight > 0,
            error: inner.error.clone(),
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read().user.is_some()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read().in_flight > 0
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.read().status()
    }

    /// Restore the session from a stored access token.
    ///
    /// Returns whether the session ended up authenticated. Never fails:
    /// an invalid token is removed and the session left anonymous.
    pub async fn authorize(&self) -> bool {
        let op = self.begin(true);

        if !self.cookies.has(ACCESS_TOKEN_COOKIE) {
            op.commit(|inner| {
                self.cookies.remove(ACCESS_TOKEN_COOKIE);
                inner.user = None;
                inner.settled = SessionStatus::Anonymous;
            });
            return false;
        }

        match self.auth.verify().await {
            Ok(response) if response.status_code == 200 => {
                let user = response.data;
                tracing::info!(user_id = %user.id, "Session restored");
                op.commit(|inner| {
                    inner.user = Some(user);
                    inner.settled = SessionStatus::Authenticated;
                })
            }
            outcome => {
                match &outcome {
                    Ok(response) => {
                        tracing::warn!(
                            status = response.status_code,
                            "Token verification refused"
                        );
                    }
                    Err(e) => tracing::warn!(error = %e, "Token verification failed"),
                }
                op.commit(|inner| {
                    self.cookies.remove(ACCESS_TOKEN_COOKIE);
                    inner.user = None;
                    inner.settled = SessionStatus::Anonymous;
                    inner.error = Some(Message::SessionExpired.text(inner.locale).to_owned());
                });
                false
            }
        }
    }

    /// Sign in and persist the returned access token.
    ///
    /// # Errors
    ///
    /// Returns the service error, or an [`Error::Response`] for a reply
    /// other than `201`. Either way `error` is set and no token is written.
    pub async fn login(&self, credentials: LoginRequest) -> Result<User, Error> {
        let op = self.begin(true);

        let response = match self.auth.login(&credentials).await {
            Ok(response) if response.status_code == 201 => response,
            Ok(response) => {
                let err = unexpected_status(response.status_code, response.message);
                return Err(self.fail_login(&op, err));
            }
            Err(e) => return Err(self.fail_login(&op, e)),
        };

        let LoginResponse { user, access_token } = response.data;
        let applied = op.commit(|inner| {
            self.cookies.set(ACCESS_TOKEN_COOKIE, &access_token);
            inner.user = Some(user.clone());
            inner.settled = SessionStatus::Authenticated;
        });
        if applied {
            tracing::info!(user_id = %user.id, "Login successful");
        }
        Ok(user)
    }

    fn fail_login(&self, op: &Operation<'_, T>, err: Error) -> Error {
        tracing::warn!(error = %err, "Login failed");
        op.commit(|inner| {
            inner.settled = SessionStatus::AuthFailed;
            inner.error = Some(Message::LoginFailed.text(inner.locale).to_owned());
        });
        err
    }

    /// Create an account. Does not sign in and never changes
    /// [`status`](Self::status).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] without any network call when the
    /// password confirmation differs; otherwise the service error.
    pub async fn register(&self, form: RegisterForm) -> Result<User, Error> {
        if form.password != form.confirm_password {
            let mut inner = self.write();
            let message = Message::PasswordMismatch.text(inner.locale);
            inner.error = Some(message.to_owned());
            return Err(Error::Validation(message.to_owned()));
        }

        let op = self.begin(false);
        let err = match self.auth.register(&form.to_request()).await {
            Ok(response) if (200..300).contains(&response.status_code) => {
                tracing::info!(user_id = %response.data.id, "Registration successful");
                return Ok(response.data);
            }
            Ok(response) => unexpected_status(response.status_code, response.message),
            Err(e) => e,
        };

        tracing::warn!(error = %err, "Registration failed");
        op.commit(|inner| {
            inner.error = Some(Message::RegisterFailed.text(inner.locale).to_owned());
        });
        Err(err)
    }

    /// Forget the user and the stored token. Supersedes any in-flight
    /// `authorize`/`login`.
    pub fn logout(&self) {
        let mut inner = self.write();
        inner.latest_auth_op += 1;
        inner.auth_pending = false;
        inner.user = None;
        inner.settled = SessionStatus::Anonymous;
        self.cookies.remove(ACCESS_TOKEN_COOKIE);
        tracing::info!("Logged out");
    }

    /// Drop the error message; the status is unchanged.
    pub fn clear_error(&self) {
        self.write().error = None;
    }

    fn begin(&self, sequenced: bool) -> Operation<'_, T> {
        let mut inner = self.write();
        inner.in_flight += 1;
        inner.error = None;
        let id = sequenced.then(|| {
            inner.latest_auth_op += 1;
            inner.auth_pending = true;
            inner.latest_auth_op
        });
        Operation { session: self, id }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One in-flight session operation. Keeps `is_loading` (and, for the newest
/// sequenced operation, `Authenticating`) raised until dropped, on every exit
/// path.
struct Operation<'a, T: Transport> {
    session: &'a Session<T>,
    id: Option<u64>,
}

impl<T: Transport> Operation<'_, T> {
    /// Apply `f` unless a newer sequenced operation has started. Returns
    /// whether it was applied.
    fn commit(&self, f: impl FnOnce(&mut Inner)) -> bool {
        let mut inner = self.session.write();
        if self.id.is_some_and(|id| id != inner.latest_auth_op) {
            tracing::debug!(
                op = ?self.id,
                latest = inner.latest_auth_op,
                "Discarding stale session result"
            );
            return false;
        }
        f(&mut inner);
        true
    }
}

impl<T: Transport> Drop for Operation<'_, T> {
    fn drop(&mut self) {
        let mut inner = self.session.write();
        inner.in_flight = inner.in_flight.saturating_sub(1);
        // Also covers a cancelled call that never committed.
        if self.id.is_some_and(|id| id == inner.latest_auth_op) {
            inner.auth_pending = false;
        }
    }
}

fn unexpected_status(status: u16, message: Option<String>) -> Error {
    Error::Response(ErrorResponse::new(status, json!({ "message": message })))
}
