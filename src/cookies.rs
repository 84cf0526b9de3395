use std::sync::{Arc, PoisonError, RwLock};

use cookie::{Cookie, CookieJar, SameSite};
use time::{Duration, OffsetDateTime};

use crate::storage::KeyValueStore;

/// Cookie holding the bearer access token.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Storage key for persisted cookies.
const PERSIST_KEY: &str = "cookies";

/// Attributes applied to every cookie the client writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    ttl_days: i64,
    secure: bool,
    path: String,
}

impl CookiePolicy {
    /// Seven-day cookies on path `/`, `Secure` only for production builds.
    #[must_use]
    pub fn new(production: bool) -> Self {
        Self {
            ttl_days: 7,
            secure: production,
            path: "/".into(),
        }
    }

    #[cfg(test)]
    #[must_use]
    pub(crate) fn with_ttl_days(mut self, days: i64) -> Self {
        self.ttl_days = days;
        self
    }

    #[must_use]
    pub fn ttl_days(&self) -> i64 {
        self.ttl_days
    }

    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    fn cookie(&self, key: &str, value: &str) -> Cookie<'static> {
        Cookie::build((key.to_string(), value.to_string()))
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path(self.path.clone())
            .max_age(Duration::days(self.ttl_days))
            .expires(OffsetDateTime::now_utc() + Duration::days(self.ttl_days))
            .build()
    }

    // Browsers only match a removal against the path the cookie was set with.
    fn removal(&self, key: &str) -> Cookie<'static> {
        Cookie::build((key.to_string(), ""))
            .path(self.path.clone())
            .build()
    }
}

/// The client's cookie jar.
///
/// Missing keys are never an error: [`get`](Self::get) returns `None`.
/// When built with [`persistent`](Self::persistent), every mutation is
/// written back to durable storage; write failures are logged and dropped.
pub struct CookieStore {
    policy: CookiePolicy,
    jar: RwLock<CookieJar>,
    backing: Option<Arc<dyn KeyValueStore>>,
}

impl CookieStore {
    /// In-memory jar.
    #[must_use]
    pub fn new(policy: CookiePolicy) -> Self {
        Self {
            policy,
            jar: RwLock::new(CookieJar::new()),
            backing: None,
        }
    }

    /// Jar restored from, and written back to, `store`.
    #[must_use]
    pub fn persistent(policy: CookiePolicy, store: Arc<dyn KeyValueStore>) -> Self {
        let jar = load_jar(store.as_ref());
        Self {
            policy,
            jar: RwLock::new(jar),
            backing: Some(store),
        }
    }

    #[must_use]
    pub fn policy(&self) -> &CookiePolicy {
        &self.policy
    }

    pub fn set(&self, key: &str, value: &str) {
        tracing::debug!(cookie = %key, "Setting cookie");
        let cookie = self.policy.cookie(key, value);
        self.jar.write().unwrap_or_else(PoisonError::into_inner).add(cookie);
        self.persist();
    }

    /// Current value of `key`; expired cookies read as absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let jar = self.jar.read().unwrap_or_else(PoisonError::into_inner);
        let cookie = jar.get(key)?;
        if cookie.path().is_some_and(|path| path != self.policy.path) {
            return None;
        }
        let live = cookie
            .expires_datetime()
            .is_none_or(|expires| expires > OffsetDateTime::now_utc());
        live.then(|| cookie.value().to_string())
    }

    pub fn remove(&self, key: &str) {
        tracing::debug!(cookie = %key, "Removing cookie");
        let removal = self.policy.removal(key);
        self.jar.write().unwrap_or_else(PoisonError::into_inner).remove(removal);
        self.persist();
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| !value.is_empty())
    }

    /// `Set-Cookie` header values for every change made through this store,
    /// removals included.
    #[must_use]
    pub fn set_cookie_headers(&self) -> Vec<String> {
        let jar = self.jar.read().unwrap_or_else(PoisonError::into_inner);
        jar.delta().map(|cookie| cookie.encoded().to_string()).collect()
    }

    fn persist(&self) {
        let Some(store) = &self.backing else {
            return;
        };
        let encoded: Vec<String> = {
            let jar = self.jar.read().unwrap_or_else(PoisonError::into_inner);
            jar.iter().map(|cookie| cookie.encoded().to_string()).collect()
        };
        let result = serde_json::to_string(&encoded)
            .map_err(Into::into)
            .and_then(|json| store.set(PERSIST_KEY, &json));
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist cookies");
        }
    }
}

fn load_jar(store: &dyn KeyValueStore) -> CookieJar {
    let mut jar = CookieJar::new();
    let raw = match store.get(PERSIST_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return jar,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read persisted cookies");
            return jar;
        }
    };
    let encoded: Vec<String> = match serde_json::from_str(&raw) {
        Ok(encoded) => encoded,
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable persisted cookies");
            return jar;
        }
    };

    let now = OffsetDateTime::now_utc();
    for value in encoded {
        match Cookie::parse_encoded(value) {
            Ok(cookie) if cookie.expires_datetime().is_none_or(|exp| exp > now) => {
                jar.add_original(cookie);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Skipping malformed persisted cookie"),
        }
    }
    jar
}
