//! Explicit cookie-jar modeling for the protocol engine.
//!
//! The engine never touches a live response: it reads a [`CookieSnapshot`]
//! taken once from the request and emits [`SetCookie`] instructions the
//! middleware applies. That keeps the state machine pure and testable
//! without an HTTP stack.

use axum::http::{HeaderMap, HeaderValue, header::COOKIE};
use std::collections::BTreeMap;

/// Name → value view of the request's `Cookie` header.
#[derive(Debug, Default, Clone)]
pub struct CookieSnapshot {
    values: BTreeMap<String, String>,
}

impl CookieSnapshot {
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut values = BTreeMap::new();
        // A client may legally send several Cookie headers; read them all.
        for header in headers.get_all(COOKIE) {
            let Ok(raw) = header.to_str() else { continue };
            for pair in raw.split(';') {
                let trimmed = pair.trim();
                let mut parts = trimmed.splitn(2, '=');
                let (Some(name), Some(value)) = (parts.next(), parts.next()) else {
                    continue;
                };
                values.insert(name.trim().to_string(), value.trim().to_string());
            }
        }
        Self { values }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    #[cfg(test)]
    pub fn insert(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
    }
}

/// One pending `Set-Cookie` for the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub secure: bool,
}

impl SetCookie {
    #[must_use]
    pub fn new(name: &str, value: &str, secure: bool) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            secure,
        }
    }

    /// Render with the protocol's fixed attributes. Both CSRF cookies are
    /// host-wide, hidden from scripts and never sent cross-site.
    #[must_use]
    pub fn render(&self) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Strict",
            self.name, self.value
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// Rendered form as a header value. `None` only for values that cannot
    /// appear in a header, which the engine never produces.
    #[must_use]
    pub fn header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.render()).ok()
    }
}

/// Leading `name=` of a rendered `Set-Cookie` header, for matching
/// downstream cookies against the engine's own.
#[must_use]
pub fn set_cookie_name(rendered: &str) -> Option<&str> {
    rendered.split_once('=').map(|(name, _)| name.trim())
}
