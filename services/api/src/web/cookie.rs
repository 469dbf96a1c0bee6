//! services/api/src/web/cookie.rs
//!
//! Builds the `Set-Cookie` values for the session cookie.

use account_core::SessionCookie;
use axum::http::{header::InvalidHeaderValue, HeaderValue};

use crate::config::Config;

/// Name and transport attributes of the session cookie.
#[derive(Clone, Debug)]
pub struct CookieSettings {
    pub name: String,
    /// Only set in production, where the site is served over HTTPS.
    pub secure: bool,
}

impl CookieSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            name: config.session_cookie_name.clone(),
            secure: config.production,
        }
    }
}

/// Build the `HttpOnly` cookie carrying an issued session.
pub fn session_cookie(
    settings: &CookieSettings,
    session: &SessionCookie,
) -> Result<HeaderValue, InvalidHeaderValue> {
    build(settings, &session.value, session.max_age.num_seconds())
}

/// Build a cookie that makes the browser drop the session immediately.
pub fn clear_session_cookie(settings: &CookieSettings) -> Result<HeaderValue, InvalidHeaderValue> {
    build(settings, "", 0)
}

fn build(
    settings: &CookieSettings,
    value: &str,
    max_age: i64,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        settings.name, value, max_age
    );
    if settings.secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}
