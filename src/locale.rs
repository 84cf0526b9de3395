//! UI locale preference persisted in durable client storage.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::storage::KeyValueStore;

/// Storage key for the saved locale.
pub const LOCALE_STORAGE_KEY: &str = "app-locale";

/// Supported UI locales.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Vi,
}

impl Locale {
    pub const DEFAULT: Self = Self::En;
    pub const SUPPORTED: [Self; 2] = [Self::En, Self::Vi];

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Vi => "vi",
        }
    }

    /// i18n message key of the language's display name.
    #[must_use]
    pub fn name_key(self) -> &'static str {
        match self {
            Self::En => "language.english",
            Self::Vi => "language.vietnamese",
        }
    }

    /// Flag image path served by the web front end.
    #[must_use]
    pub fn flag_image(self) -> String {
        format!("/images/locales/{}.png", self.code())
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Error for a locale code outside [`Locale::SUPPORTED`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid locale: {0}. Supported locales: en, vi")]
pub struct UnsupportedLocale(pub String);

impl std::str::FromStr for Locale {
    type Err = UnsupportedLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::SUPPORTED
            .into_iter()
            .find(|locale| locale.code() == s)
            .ok_or_else(|| UnsupportedLocale(s.to_owned()))
    }
}

/// Reads and writes the saved locale.
///
/// Never fails: a missing store (no durable storage in this context), a
/// missing or invalid value, and storage errors all fall back to
/// [`Locale::DEFAULT`] or a logged no-op.
#[derive(Clone, Default)]
pub struct LocaleCache {
    store: Option<Arc<dyn KeyValueStore>>,
}

impl LocaleCache {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store: Some(store) }
    }

    /// Cache for a context without durable storage.
    #[must_use]
    pub fn detached() -> Self {
        Self { store: None }
    }

    #[must_use]
    pub fn saved_locale(&self) -> Locale {
        let Some(store) = &self.store else {
            return Locale::DEFAULT;
        };
        match store.get(LOCALE_STORAGE_KEY) {
            Ok(Some(saved)) => saved.parse().unwrap_or(Locale::DEFAULT),
            Ok(None) => Locale::DEFAULT,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to get saved locale from storage");
                Locale::DEFAULT
            }
        }
    }

    /// Persist `locale` if it is a supported code; anything else is logged
    /// and ignored.
    pub fn save_locale(&self, locale: &str) {
        let Some(store) = &self.store else {
            return;
        };
        let locale: Locale = match locale.parse() {
            Ok(locale) => locale,
            Err(e) => {
                tracing::warn!(error = %e, "Refusing to save locale");
                return;
            }
        };
        if let Err(e) = store.set(LOCALE_STORAGE_KEY, locale.code()) {
            tracing::warn!(error = %e, "Failed to save locale to storage");
        }
    }

    pub fn clear_locale(&self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.remove(LOCALE_STORAGE_KEY) {
            tracing::warn!(error = %e, "Failed to clear saved locale from storage");
        }
    }
}
