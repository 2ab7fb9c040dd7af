//! # Portico (Multi-Tenant SaaS Gateway)
//!
//! `portico` fronts a multi-tenant SaaS application: it resolves the tenant
//! for every inbound request and enforces a double-submit CSRF protocol on
//! mutating API traffic.
//!
//! ## Tenant Resolution
//!
//! A tenant id can arrive via an explicit header (`x-tenant-id`), the
//! leading hostname label (`acme.example.com`), or a `/tenant/<id>` path
//! prefix, tried in that order with strict validation and a reserved-word
//! deny list. The winning resolution is stamped onto response headers
//! (`x-tenant-id`, `x-tenant-strategy`, ...) for downstream consumers;
//! identity is re-derived per request and never cached in process.
//!
//! ## CSRF Protection
//!
//! The double-submit variant used here keeps a random secret in an
//! HTTP-only `SameSite=Strict` cookie and hands clients salted HMAC tokens
//! bound to it. Safe methods are issued tokens; unsafe methods must present
//! one that verifies against the cookie, after a same-origin check.
//! Successful use **rotates the secret**, so a captured token buys at most
//! one mutation. There is no server-side session table: the cookie pair is
//! the entire state.
//!
//! ## Scope
//!
//! Tenant records and feature flags sit behind provider traits with
//! in-memory implementations; persistence and remote flag backends are out
//! of scope by design.

pub mod api;
pub mod cli;
pub mod csrf;
pub mod flags;
pub mod tenant;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
