//! Syntax and reserved-word validation for tenant identifiers.

/// Names that can never be claimed as tenant identifiers.
///
/// Shared by every resolution strategy so a hostname label, a header value
/// and a path segment are all held to the same rule. Matching is
/// case-insensitive.
const RESERVED_TENANT_IDS: &[&str] = &[
    "api",
    "www",
    "admin",
    "root",
    "system",
    "public",
    "private",
    "static",
    "assets",
    "cdn",
    "mail",
    "email",
    "ftp",
    "ssh",
    "localhost",
    "staging",
    "prod",
    "production",
    "dev",
    "development",
];

const MAX_TENANT_ID_LEN: usize = 100;

/// Validate a candidate tenant identifier.
///
/// Accepts `[a-zA-Z0-9_-]`, 1 to 100 characters, excluding the reserved
/// set. Anything else (dots, slashes, whitespace, control characters) is
/// rejected. Callers treat `false` as "this strategy produced nothing" and
/// fall through to the next one.
#[must_use]
pub fn is_valid_tenant_id(candidate: &str) -> bool {
    if candidate.is_empty() || candidate.len() > MAX_TENANT_ID_LEN {
        return false;
    }

    // The character class already excludes \r \n \t and NUL; the explicit
    // control check stays as a second line of defense should the class
    // ever be loosened.
    if candidate.chars().any(char::is_control) {
        return false;
    }

    if !candidate
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return false;
    }

    !is_reserved(candidate)
}

/// Case-insensitive membership test against the reserved set.
#[must_use]
pub fn is_reserved(candidate: &str) -> bool {
    RESERVED_TENANT_IDS
        .iter()
        .any(|reserved| candidate.eq_ignore_ascii_case(reserved))
}
