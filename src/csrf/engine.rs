//! The per-request CSRF protocol state machine.
//!
//! There is no state between requests: the secret + issued-at cookie pair
//! read fresh from the request *is* the state. Safe methods get a token
//! issued (minting or time-rotating the secret as needed); unsafe methods
//! must pass the same-origin check and verify their token, after which the
//! secret is always rotated — a verified token is spent the moment it is
//! used, which bounds replay of a captured token to a single mutation.
//!
//! Rapid concurrent mutations reusing one token are therefore expected to
//! fail on all but one request; clients re-read the response token header
//! after every mutation.

use anyhow::Result;
use axum::http::{HeaderMap, Method};
use tracing::debug;

use super::codec;
use super::config::CsrfConfig;
use super::cookies::{CookieSnapshot, SetCookie};
use super::origin;

/// Internal cause of a rejection. Logged, but deliberately collapsed into
/// two public messages so responses give probing clients no oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    CrossOrigin,
    MissingToken,
    MissingSecret,
    InvalidToken,
}

impl RejectReason {
    /// Client-facing message.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::CrossOrigin => "cross-origin request rejected",
            Self::MissingToken | Self::MissingSecret | Self::InvalidToken => {
                "invalid or missing CSRF token"
            }
        }
    }
}

/// A freshly derived token plus the cookie writes that must accompany it.
#[derive(Debug)]
pub struct Issued {
    pub token: String,
    pub cookies: Vec<SetCookie>,
}

/// What the middleware should do with the request.
#[derive(Debug)]
pub enum CsrfAction {
    /// Unprotected path or the issuance endpoint: response untouched.
    Passthrough,
    /// Safe method: attach the token header (and any cookie writes) to the
    /// downstream response.
    Issue(Issued),
    /// Unsafe method that failed a check: 403, downstream never runs.
    Reject(RejectReason),
    /// Unsafe method that verified: run downstream, then attach the
    /// rotated cookie pair and fresh token.
    AcceptAndRotate(Issued),
}

/// Evaluate the protocol for one request.
///
/// Pure over its inputs; `now_ms` is passed in so rotation timing is
/// testable. The same-origin check always completes before any token
/// verification.
///
/// # Errors
///
/// Only on random-source or keyed-hash failure while minting or deriving;
/// protocol violations are [`CsrfAction::Reject`], not errors.
pub fn evaluate(
    config: &CsrfConfig,
    method: &Method,
    path: &str,
    headers: &HeaderMap,
    cookies: &CookieSnapshot,
    now_ms: u64,
) -> Result<CsrfAction> {
    if !config.is_protected_path(path) || config.is_issuance_path(path) {
        return Ok(CsrfAction::Passthrough);
    }

    if is_safe_method(method) {
        return Ok(CsrfAction::Issue(issue(config, cookies, now_ms)?));
    }

    // Fail fast on origin before spending any crypto work.
    if !origin::is_same_origin(config, headers) {
        return Ok(CsrfAction::Reject(RejectReason::CrossOrigin));
    }

    let Some(token) = candidate_token(config, headers) else {
        return Ok(CsrfAction::Reject(RejectReason::MissingToken));
    };

    let secret = cookies
        .get(&config.secret_cookie())
        .and_then(codec::decode_secret);
    let Some(secret) = secret else {
        return Ok(CsrfAction::Reject(RejectReason::MissingSecret));
    };

    if !codec::verify_token(token, &secret) {
        return Ok(CsrfAction::Reject(RejectReason::InvalidToken));
    }

    // Verified: the presented secret is spent. Rotate unconditionally.
    let (fresh_secret, cookie_writes) = rotate(config, now_ms)?;
    let token = codec::derive_token(&fresh_secret, config.salt_len())?;
    debug!(path, "CSRF token verified, secret rotated");
    Ok(CsrfAction::AcceptAndRotate(Issued {
        token,
        cookies: cookie_writes,
    }))
}

/// Issue a token for a safe request, minting or time-rotating the secret
/// when the current one is missing, undecodable or stale.
///
/// Shared with the issuance endpoint, which performs the same dance while
/// being skipped by [`evaluate`].
///
/// # Errors
///
/// Only on random-source or keyed-hash failure.
pub fn issue(config: &CsrfConfig, cookies: &CookieSnapshot, now_ms: u64) -> Result<Issued> {
    let current = cookies
        .get(&config.secret_cookie())
        .and_then(codec::decode_secret);

    let fresh_needed = match (&current, issued_at(config, cookies)) {
        (None, _) => true,
        // Missing, unparseable or future timestamps all force rotation.
        (Some(_), None) => true,
        (Some(_), Some(iat)) => iat > now_ms || now_ms - iat >= config.rotate_after_ms(),
    };

    if fresh_needed {
        let (secret, cookie_writes) = rotate(config, now_ms)?;
        let token = codec::derive_token(&secret, config.salt_len())?;
        return Ok(Issued {
            token,
            cookies: cookie_writes,
        });
    }

    // Reuse the live secret; a fresh salt makes a fresh token anyway.
    let secret = current.unwrap_or_default();
    let token = codec::derive_token(&secret, config.salt_len())?;
    Ok(Issued {
        token,
        cookies: Vec::new(),
    })
}

fn issued_at(config: &CsrfConfig, cookies: &CookieSnapshot) -> Option<u64> {
    cookies
        .get(&config.iat_cookie())
        .and_then(|value| value.parse::<u64>().ok())
}

fn rotate(config: &CsrfConfig, now_ms: u64) -> Result<(Vec<u8>, Vec<SetCookie>)> {
    let secret = codec::mint_secret(config.secret_len())?;
    let cookies = vec![
        SetCookie::new(
            &config.secret_cookie(),
            &codec::encode_secret(&secret),
            config.secure_cookies(),
        ),
        SetCookie::new(
            &config.iat_cookie(),
            &now_ms.to_string(),
            config.secure_cookies(),
        ),
    ];
    Ok((secret, cookies))
}

fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// First non-empty value among the accepted token headers.
fn candidate_token<'a>(config: &CsrfConfig, headers: &'a HeaderMap) -> Option<&'a str> {
    config.accepted_headers().iter().find_map(|name| {
        headers
            .get(name.as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    })
}
