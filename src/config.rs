use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::Error;

const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DATA_DIR_NAME: &str = "shortlink-client";

/// Short-link API client configuration.
///
/// Use [`from_env()`](ClientConfig::from_env) for convention-based setup,
/// or [`new()`](ClientConfig::new) with `with_*` methods for full control.
///
/// ```rust,ignore
/// use shortlink_client::ClientConfig;
///
/// let config = ClientConfig::new("https://api.example.com/api".parse()?)
///     .with_production(true);
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ClientConfig {
    pub(crate) base_url: Url,
    pub(crate) timeout: Duration,
    pub(crate) production: bool,
    pub(crate) data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(Self::default_base_url())
    }
}

impl ClientConfig {
    /// Create a configuration for the given API base URL.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            production: false,
            data_dir: None,
        }
    }

    fn default_base_url() -> Url {
        DEFAULT_BASE_URL.parse().expect("valid default URL")
    }

    /// Create config from environment variables.
    ///
    /// # Optional env vars
    /// - `SHORTLINK_API_BASE_URL`: API base URL (default `http://localhost:3000/api`)
    /// - `SHORTLINK_PRODUCTION`: `1`/`true` marks a production build (secure cookies),
    ///   `0`/`false` does not
    /// - `SHORTLINK_DATA_DIR`: directory for durable client state
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `SHORTLINK_API_BASE_URL` is not a valid URL or
    /// `SHORTLINK_PRODUCTION` holds any other value.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();

        if let Ok(url_str) = std::env::var("SHORTLINK_API_BASE_URL") {
            let url: Url = url_str
                .parse()
                .map_err(|e| Error::Config(format!("SHORTLINK_API_BASE_URL: {e}")))?;
            config = config.with_base_url(url);
        }

        let production = match std::env::var("SHORTLINK_PRODUCTION").as_deref() {
            Ok("1") | Ok("true") => true,
            Ok("0") | Ok("false") | Err(std::env::VarError::NotPresent) => false,
            Ok(other) => {
                return Err(Error::Config(format!(
                    "SHORTLINK_PRODUCTION: expected 1, true, 0 or false, got {other:?}"
                )));
            }
            Err(e) => return Err(Error::Config(format!("SHORTLINK_PRODUCTION: {e}"))),
        };

        if let Ok(dir) = std::env::var("SHORTLINK_DATA_DIR") {
            config = config.with_data_dir(dir);
        }

        Ok(config.with_production(production))
    }

    #[must_use]
    pub fn with_base_url(mut self, url: Url) -> Self {
        self.base_url = url;
        self
    }

    /// Override the network timeout (default: 10 seconds).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Production builds mark cookies `Secure`.
    #[must_use]
    pub fn with_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Network timeout applied to every request.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        self.production
    }

    /// Directory holding durable client state.
    ///
    /// Falls back to the platform data directory; `None` when neither is known.
    #[must_use]
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(DATA_DIR_NAME)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();

        assert_eq!(config.base_url().as_str(), "http://localhost:3000/api");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(!config.is_production());
    }

    #[test]
    fn test_with_overrides() {
        let config = ClientConfig::new("https://api.example.com/v1".parse().unwrap())
            .with_timeout(Duration::from_secs(3))
            .with_production(true)
            .with_data_dir("/tmp/shortlink");

        assert_eq!(config.base_url().as_str(), "https://api.example.com/v1");
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert!(config.is_production());
        assert_eq!(config.data_dir(), Some(PathBuf::from("/tmp/shortlink")));
    }

    // The only test touching SHORTLINK_PRODUCTION, so parallel tests cannot race on it.
    #[test]
    fn test_from_env_production_flag() {
        std::env::set_var("SHORTLINK_PRODUCTION", "true");
        assert!(ClientConfig::from_env().unwrap().is_production());

        std::env::set_var("SHORTLINK_PRODUCTION", "0");
        assert!(!ClientConfig::from_env().unwrap().is_production());

        std::env::set_var("SHORTLINK_PRODUCTION", "yes");
        let err = ClientConfig::from_env().unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("SHORTLINK_PRODUCTION")));

        std::env::remove_var("SHORTLINK_PRODUCTION");
        assert!(!ClientConfig::from_env().unwrap().is_production());
    }
}
