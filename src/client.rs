//! One explicitly constructed client context.
//!
//! ```rust,ignore
//! let app = App::new(ClientConfig::from_env()?)?;
//! app.bootstrap().await;
//! if app.session().is_authenticated() { /* ... */ }
//! ```

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::cookies::{CookiePolicy, CookieStore};
use crate::error::Error;
use crate::locale::{Locale, LocaleCache, UnsupportedLocale};
use crate::proxy::{HttpTransport, Proxy, ProxyOptions, Transport};
use crate::services::{AuthService, DashboardService, ShortLinkService};
use crate::session::Session;
use crate::shortener::Shortener;
use crate::storage::{FileStore, KeyValueStore, MemoryStore};

/// Storage, cookies, API proxy, services and stores, wired together.
pub struct App<T = HttpTransport> {
    config: ClientConfig,
    store: Arc<dyn KeyValueStore>,
    locale: LocaleCache,
    cookies: Arc<CookieStore>,
    proxy: Arc<Proxy<T>>,
    dashboard: DashboardService<T>,
    short_links: ShortLinkService<T>,
    session: Session<T>,
    shortener: Shortener<T>,
}

impl App<HttpTransport> {
    /// Build over HTTP, keeping durable state in [`ClientConfig::data_dir`]
    /// (in memory when no data directory is known).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let store: Arc<dyn KeyValueStore> = match config.data_dir() {
            Some(dir) => Arc::new(FileStore::in_dir(dir)),
            None => {
                tracing::warn!("No data directory; client state will not survive restarts");
                Arc::new(MemoryStore::new())
            }
        };
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_parts(config, store, transport))
    }
}

impl<T: Transport> App<T> {
    #[must_use]
    pub fn with_parts(config: ClientConfig, store: Arc<dyn KeyValueStore>, transport: T) -> Self {
        let locale = LocaleCache::new(store.clone());
        let current = locale.saved_locale();
        let cookies = Arc::new(CookieStore::persistent(
            CookiePolicy::new(config.is_production()),
            store.clone(),
        ));
        let proxy = Arc::new(Proxy::new(
            transport,
            cookies.clone(),
            store.as_ref(),
            ProxyOptions::default(),
        ));
        let short_links = ShortLinkService::new(proxy.clone());

        tracing::debug!(
            base_url = %config.base_url(),
            client_id = %proxy.client_id(),
            locale = %current,
            "Client initialized"
        );

        Self {
            session: Session::new(AuthService::new(proxy.clone()), cookies.clone(), current),
            shortener: Shortener::new(short_links.clone(), current),
            dashboard: DashboardService::new(proxy.clone()),
            short_links,
            config,
            store,
            locale,
            cookies,
            proxy,
        }
    }

    /// Restore the session from a stored token, once at startup.
    pub async fn bootstrap(&self) -> bool {
        self.session.authorize().await
    }

    /// Switch the UI language and remember it.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedLocale`] for codes other than `en`/`vi`; nothing
    /// changes in that case.
    pub fn set_locale(&self, code: &str) -> Result<Locale, UnsupportedLocale> {
        let locale: Locale = code.parse()?;
        self.locale.save_locale(locale.code());
        self.session.set_locale(locale);
        self.shortener.set_locale(locale);
        Ok(locale)
    }

    #[must_use]
    pub fn locale(&self) -> Locale {
        self.locale.saved_locale()
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    #[must_use]
    pub fn cookies(&self) -> &Arc<CookieStore> {
        &self.cookies
    }

    #[must_use]
    pub fn proxy(&self) -> &Arc<Proxy<T>> {
        &self.proxy
    }

    #[must_use]
    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    #[must_use]
    pub fn shortener(&self) -> &Shortener<T> {
        &self.shortener
    }

    #[must_use]
    pub fn dashboard(&self) -> &DashboardService<T> {
        &self.dashboard
    }

    #[must_use]
    pub fn short_links(&self) -> &ShortLinkService<T> {
        &self.short_links
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::cookies::ACCESS_TOKEN_COOKIE;
    use crate::identity::CLIENT_ID_STORAGE_KEY;
    use crate::locale::LOCALE_STORAGE_KEY;
    use crate::proxy::testing::{MockTransport, reply};

    fn backend() -> MockTransport {
        MockTransport::new(|request| match request.header("authorization") {
            Some("Bearer T") => reply(
                200,
                json!({
                    "statusCode": 200,
                    "data": { "id": 1, "email": "a@b.com", "fullName": "Ann Bee" }
                }),
            ),
            _ => reply(401, json!({ "statusCode": 401, "message": "Unauthorized" })),
        })
    }

    #[tokio::test]
    async fn test_bootstrap_restores_persisted_session() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::default().with_data_dir(dir.path());

        {
            let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::in_dir(dir.path()));
            let app = App::with_parts(config.clone(), store, backend());
            app.cookies().set(ACCESS_TOKEN_COOKIE, "T");
        }

        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::in_dir(dir.path()));
        let app = App::with_parts(config, store, backend());
        assert!(app.bootstrap().await);
        assert!(app.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_bootstrap_without_token() {
        let app = App::with_parts(
            ClientConfig::default(),
            Arc::new(MemoryStore::new()),
            backend(),
        );

        assert!(!app.bootstrap().await);
        assert!(app.proxy().transport().requests().is_empty());
        assert!(app.store().get(CLIENT_ID_STORAGE_KEY).unwrap().is_some());
    }

    #[test]
    fn test_set_locale() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let app = App::with_parts(ClientConfig::default(), store.clone(), backend());
        assert_eq!(app.locale(), Locale::En);

        assert_eq!(app.set_locale("vi"), Ok(Locale::Vi));
        assert_eq!(store.get(LOCALE_STORAGE_KEY).unwrap().as_deref(), Some("vi"));
        assert!(app.set_locale("fr").is_err());
        assert_eq!(app.locale(), Locale::Vi);
    }

    #[test]
    fn test_new_with_http_transport() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::new(ClientConfig::default().with_data_dir(dir.path())).unwrap();
        assert_eq!(app.config().base_url().as_str(), "http://localhost:3000/api");
    }
}
