//! Immutable CSRF protocol configuration.

use url::Url;

pub const DEFAULT_CSRF_HEADER: &str = "x-csrf-token";
pub const DEFAULT_ACCEPTED_HEADERS: &[&str] = &["x-csrf-token", "x-xsrf-token"];
pub const DEFAULT_SECRET_COOKIE: &str = "csrf-secret";
pub const DEFAULT_IAT_COOKIE: &str = "csrf-iat";
pub const DEFAULT_SECRET_LEN: usize = 32;
pub const DEFAULT_SALT_LEN: usize = 16;
/// 24 hours.
pub const DEFAULT_ROTATE_AFTER_MS: u64 = 24 * 60 * 60 * 1000;
pub const DEFAULT_PROTECTED_PREFIX: &str = "/api";
pub const ISSUANCE_PATH: &str = "/api/security/csrf";

/// Resolved once at startup; the engine and middleware only ever read it.
#[derive(Debug, Clone)]
pub struct CsrfConfig {
    header_name: String,
    accepted_headers: Vec<String>,
    cookie_prefix: String,
    secret_len: usize,
    salt_len: usize,
    rotate_after_ms: u64,
    secure_cookies: bool,
    protected_paths: Vec<String>,
    app_url: Option<Url>,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            header_name: DEFAULT_CSRF_HEADER.to_string(),
            accepted_headers: DEFAULT_ACCEPTED_HEADERS
                .iter()
                .map(ToString::to_string)
                .collect(),
            cookie_prefix: String::new(),
            secret_len: DEFAULT_SECRET_LEN,
            salt_len: DEFAULT_SALT_LEN,
            rotate_after_ms: DEFAULT_ROTATE_AFTER_MS,
            secure_cookies: true,
            protected_paths: vec![DEFAULT_PROTECTED_PREFIX.to_string()],
            app_url: None,
        }
    }
}

impl CsrfConfig {
    #[must_use]
    pub fn with_header_name(mut self, name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        if !self.accepted_headers.contains(&name) {
            self.accepted_headers.insert(0, name.clone());
        }
        self.header_name = name;
        self
    }

    #[must_use]
    pub fn with_cookie_prefix(mut self, prefix: &str) -> Self {
        self.cookie_prefix = prefix.to_string();
        self
    }

    #[must_use]
    pub fn with_secret_len(mut self, len: usize) -> Self {
        self.secret_len = len;
        self
    }

    #[must_use]
    pub fn with_salt_len(mut self, len: usize) -> Self {
        self.salt_len = len;
        self
    }

    #[must_use]
    pub fn with_rotate_after_ms(mut self, ms: u64) -> Self {
        self.rotate_after_ms = ms;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn with_protected_paths(mut self, prefixes: Vec<String>) -> Self {
        if !prefixes.is_empty() {
            self.protected_paths = prefixes;
        }
        self
    }

    /// Application base URL used as the expected origin. `None` falls back
    /// to forwarded headers at request time.
    #[must_use]
    pub fn with_app_url(mut self, url: Option<Url>) -> Self {
        self.app_url = url;
        self
    }

    #[must_use]
    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    /// Header names checked for a candidate token, in order.
    #[must_use]
    pub fn accepted_headers(&self) -> &[String] {
        &self.accepted_headers
    }

    #[must_use]
    pub fn secret_cookie(&self) -> String {
        format!("{}{DEFAULT_SECRET_COOKIE}", self.cookie_prefix)
    }

    #[must_use]
    pub fn iat_cookie(&self) -> String {
        format!("{}{DEFAULT_IAT_COOKIE}", self.cookie_prefix)
    }

    #[must_use]
    pub fn secret_len(&self) -> usize {
        self.secret_len
    }

    #[must_use]
    pub fn salt_len(&self) -> usize {
        self.salt_len
    }

    #[must_use]
    pub fn rotate_after_ms(&self) -> u64 {
        self.rotate_after_ms
    }

    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    #[must_use]
    pub fn app_url(&self) -> Option<&Url> {
        self.app_url.as_ref()
    }

    /// Whether the CSRF protocol applies to this path at all.
    #[must_use]
    pub fn is_protected_path(&self, path: &str) -> bool {
        self.protected_paths
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// The token issuance endpoint handles its own cookies and is skipped
    /// by the protocol engine.
    #[must_use]
    pub fn is_issuance_path(&self, path: &str) -> bool {
        path == ISSUANCE_PATH
    }
}
