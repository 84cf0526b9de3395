//! Links shortened during this client session.

use std::sync::{PoisonError, RwLock, RwLockWriteGuard};

use url::Url;

use crate::error::Error;
use crate::locale::Locale;
use crate::messages::Message;
use crate::proxy::{HttpTransport, Transport};
use crate::services::ShortLinkService;
use crate::types::{ShortLink, ShortLinkRequest};

/// Links shown in the "recent" list.
pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Default)]
struct Inner {
    links: Vec<ShortLink>,
    in_flight: usize,
    error: Option<String>,
    locale: Locale,
}

/// Creates short links and remembers them, newest first.
pub struct Shortener<T = HttpTransport> {
    service: ShortLinkService<T>,
    inner: RwLock<Inner>,
}

impl<T: Transport> Shortener<T> {
    #[must_use]
    pub fn new(service: ShortLinkService<T>, locale: Locale) -> Self {
        Self {
            service,
            inner: RwLock::new(Inner {
                locale,
                ..Inner::default()
            }),
        }
    }

    pub fn set_locale(&self, locale: Locale) {
        self.write().locale = locale;
    }

    /// Shorten `original_url` for `user_id` and add it to the history.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] without a network call if `original_url` is not
    /// an absolute URL; otherwise the service error. `error` is set in both
    /// cases.
    pub async fn shorten(&self, original_url: &str, user_id: &str) -> Result<ShortLink, Error> {
        if Url::parse(original_url).is_err() {
            let mut inner = self.write();
            let message = Message::InvalidUrl.text(inner.locale);
            inner.error = Some(message.to_owned());
            return Err(Error::Validation(message.to_owned()));
        }

        let _loading = Loading::start(self);
        let request = ShortLinkRequest {
            original_url: original_url.to_owned(),
            user_id: user_id.to_owned(),
        };

        match self.service.create(&request).await {
            Ok(response) => {
                let link = response.data;
                tracing::info!(short_code = %link.short_code, "Short link created");
                self.write().links.insert(0, link.clone());
                Ok(link)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Shortening failed");
                let mut inner = self.write();
                inner.error = Some(Message::ShortenFailed.text(inner.locale).to_owned());
                Err(e)
            }
        }
    }

    /// Up to [`RECENT_LIMIT`] links, newest first.
    #[must_use]
    pub fn recent(&self) -> Vec<ShortLink> {
        let inner = self.read();
        inner.links.iter().take(RECENT_LIMIT).cloned().collect()
    }

    #[must_use]
    pub fn all(&self) -> Vec<ShortLink> {
        self.read().links.clone()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.read().links.len()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read().in_flight > 0
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    pub fn clear_error(&self) {
        self.write().error = None;
    }

    /// Forget the history.
    pub fn clear(&self) {
        self.write().links.clear();
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

struct Loading<'a, T: Transport> {
    owner: &'a Shortener<T>,
}

impl<'a, T: Transport> Loading<'a, T> {
    fn start(owner: &'a Shortener<T>) -> Self {
        let mut inner = owner.write();
        inner.in_flight += 1;
        inner.error = None;
        drop(inner);
        Self { owner }
    }
}

impl<T: Transport> Drop for Loading<'_, T> {
    fn drop(&mut self) {
        let mut inner = self.owner.write();
        inner.in_flight = inner.in_flight.saturating_sub(1);
    }
}
