//! Page access rules.

/// Landing page for signed-in users.
pub const DASHBOARD_PATH: &str = "/dashboard";
/// Sign-in page.
pub const SIGN_IN_PATH: &str = "/signin";

/// Who may see a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RouteAccess {
    #[default]
    Public,
    /// Signed-in users only (dashboard, link management).
    RequiresAuth,
    /// Guests only (sign-in, sign-up).
    RedirectIfAuthenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(&'static str),
}

/// Decide whether a page may be shown for the current session.
#[must_use]
pub fn guard(access: RouteAccess, is_authenticated: bool) -> Navigation {
    match (access, is_authenticated) {
        (RouteAccess::RequiresAuth, false) => Navigation::Redirect(SIGN_IN_PATH),
        (RouteAccess::RedirectIfAuthenticated, true) => Navigation::Redirect(DASHBOARD_PATH),
        _ => Navigation::Proceed,
    }
}
