//! Multi-strategy tenant resolution.
//!
//! A tenant identifier can arrive three ways, tried in strict priority
//! order: an explicit header, the leading hostname label, or a
//! `/tenant/<id>` path prefix. Every candidate is filtered through
//! [`is_valid_tenant_id`](super::validator::is_valid_tenant_id); a strategy
//! that produces nothing usable falls through silently to the next one, and
//! the configured default tenant is the terminal fallback. Resolution is
//! pure over the request: same inputs, same result.

use axum::http::HeaderMap;
use regex::Regex;
use serde::Serialize;

use super::config::TenantConfig;
use super::validator::is_valid_tenant_id;

/// Mechanism that produced a tenant id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantStrategy {
    Header,
    Subdomain,
    Path,
}

impl TenantStrategy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Subdomain => "subdomain",
            Self::Path => "path",
        }
    }
}

/// Per-request resolution result. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantResolution {
    pub tenant_id: String,
    pub strategy: TenantStrategy,
    /// Leading hostname label, set only for [`TenantStrategy::Subdomain`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    /// Full original `Host` value (port included), set only for
    /// [`TenantStrategy::Subdomain`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl TenantResolution {
    fn fallback(config: &TenantConfig) -> Self {
        Self {
            tenant_id: config.default_tenant_id().to_string(),
            strategy: TenantStrategy::Header,
            subdomain: None,
            domain: None,
        }
    }
}

/// Resolve the tenant for a request from its headers and path.
///
/// With multi-tenancy disabled this ignores all request data, so no
/// attacker-controlled header, host or path can influence tenant selection
/// while the feature is off.
#[must_use]
pub fn resolve(config: &TenantConfig, headers: &HeaderMap, path: &str) -> TenantResolution {
    if !config.multi_tenant() {
        return TenantResolution::fallback(config);
    }

    if let Some(tenant_id) = from_header(config, headers) {
        return TenantResolution {
            tenant_id,
            strategy: TenantStrategy::Header,
            subdomain: None,
            domain: None,
        };
    }

    if let Some((subdomain, domain)) = from_host(headers) {
        return TenantResolution {
            tenant_id: subdomain.clone(),
            strategy: TenantStrategy::Subdomain,
            subdomain: Some(subdomain),
            domain: Some(domain),
        };
    }

    if let Some(tenant_id) = from_path(path) {
        return TenantResolution {
            tenant_id,
            strategy: TenantStrategy::Path,
            subdomain: None,
            domain: None,
        };
    }

    TenantResolution::fallback(config)
}

fn from_header(config: &TenantConfig, headers: &HeaderMap) -> Option<String> {
    let value = headers.get(config.header_name())?.to_str().ok()?.trim();
    if is_valid_tenant_id(value) {
        Some(value.to_string())
    } else {
        None
    }
}

/// Extract a subdomain candidate from the `Host` header.
///
/// Requires at least three labels once the port is stripped, so bare
/// `localhost` and apex domains like `example.com` never match. The
/// returned domain keeps the original host string, port included.
fn from_host(headers: &HeaderMap) -> Option<(String, String)> {
    let host = headers.get("host")?.to_str().ok()?.trim();
    if host.is_empty() {
        return None;
    }

    let without_port = host.rsplit_once(':').map_or(host, |(name, _port)| name);
    let labels: Vec<&str> = without_port.split('.').collect();
    if labels.len() < 3 {
        return None;
    }

    let candidate = labels[0];
    if is_valid_tenant_id(candidate) {
        Some((candidate.to_string(), host.to_string()))
    } else {
        // Covers `www` and the rest of the reserved set: treated as "no
        // subdomain", not an error.
        None
    }
}

fn from_path(path: &str) -> Option<String> {
    let captured = Regex::new(r"^/tenant/([^/]+)")
        .ok()
        .and_then(|re| re.captures(path).and_then(|c| c.get(1).map(|m| m.as_str().to_string())))?;
    if is_valid_tenant_id(&captured) {
        Some(captured)
    } else {
        None
    }
}
