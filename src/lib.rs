#![doc = include_str!("../README.md")]

pub mod analytics;
pub mod client;
pub mod config;
pub mod cookies;
pub mod error;
pub mod guard;
pub mod identity;
pub mod locale;
pub mod messages;
pub mod proxy;
pub mod services;
pub mod session;
pub mod shortener;
pub mod storage;
pub mod types;

// Re-exports for convenient access
pub use client::App;
pub use config::ClientConfig;
pub use cookies::{ACCESS_TOKEN_COOKIE, CookiePolicy, CookieStore};
pub use error::{Error, ErrorResponse, StorageError};
pub use guard::{Navigation, RouteAccess, guard};
pub use identity::ClientId;
pub use locale::{Locale, LocaleCache, UnsupportedLocale};
pub use messages::Message;
pub use proxy::{
    HttpTransport, PreparedRequest, Proxy, ProxyOptions, RawResponse, RequestMiddleware,
    ResponseMiddleware, Transport, TransportError,
};
pub use services::{AgentType, AnalyticsType, AuthService, DashboardService, ShortLinkService};
pub use session::{RegisterForm, Session, SessionState, SessionStatus};
pub use shortener::Shortener;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use types::{
    AgentAnalytics, ApiResponse, ClickLog, EntityId, LoginRequest, LoginResponse, RegisterRequest,
    ShortLink, ShortLinkAnalytics, ShortLinkRequest, Statistics, User,
};
