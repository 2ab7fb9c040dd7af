//! Request middleware that stamps tenant resolution onto responses.
//!
//! Stamped headers are the only channel through which tenant identity
//! crosses from request-time resolution into downstream consumers; there is
//! no shared registry, and API handlers re-derive identity with
//! [`resolver::resolve`] instead of reading these headers.

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use super::config::TenantConfig;
use super::resolver::{self, TenantStrategy};

pub const TENANT_ID_HEADER: &str = "x-tenant-id";
pub const TENANT_STRATEGY_HEADER: &str = "x-tenant-strategy";
pub const TENANT_SUBDOMAIN_HEADER: &str = "x-tenant-subdomain";
pub const TENANT_DOMAIN_HEADER: &str = "x-tenant-domain";

/// Paths the middleware never touches: API routes, framework internals and
/// anything that looks like a static asset.
fn in_scope(path: &str) -> bool {
    if path.starts_with("/api/") || path.starts_with("/_next/") || path.starts_with("/favicon.ico")
    {
        return false;
    }
    // Dotted segments are almost always files with extensions.
    !path.contains('.')
}

/// Resolve the tenant for in-scope requests and stamp the result onto the
/// response headers.
pub async fn stamp(
    State(config): State<Arc<TenantConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if !in_scope(&path) {
        return next.run(request).await;
    }

    let resolution = resolver::resolve(&config, request.headers(), &path);
    debug!(
        tenant_id = %resolution.tenant_id,
        strategy = resolution.strategy.as_str(),
        path = %path,
        "resolved tenant"
    );

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    insert_header(headers, TENANT_ID_HEADER, &resolution.tenant_id);
    insert_header(
        headers,
        TENANT_STRATEGY_HEADER,
        resolution.strategy.as_str(),
    );
    if resolution.strategy == TenantStrategy::Subdomain {
        if let Some(subdomain) = &resolution.subdomain {
            insert_header(headers, TENANT_SUBDOMAIN_HEADER, subdomain);
        }
        if let Some(domain) = &resolution.domain {
            insert_header(headers, TENANT_DOMAIN_HEADER, domain);
        }
    }

    response
}

fn insert_header(headers: &mut axum::http::HeaderMap, name: &'static str, value: &str) {
    // Validated tenant ids and host names are always legal header values;
    // anything that is not gets dropped rather than poisoning the response.
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(HeaderName::from_static(name), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request as HttpRequest, middleware, routing::get};
    use tower::ServiceExt;

    fn app(config: TenantConfig) -> Router {
        Router::new()
            .route("/dashboard", get(|| async { "ok" }))
            .route("/tenant/{id}/dashboard", get(|| async { "ok" }))
            .route("/api/ping", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(Arc::new(config), stamp))
    }

    async fn send(app: Router, uri: &str, headers: &[(&str, &str)]) -> axum::response::Response {
        let mut request = HttpRequest::builder().uri(uri);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        app.oneshot(request.body(Body::empty()).expect("request"))
            .await
            .expect("response")
    }

    #[tokio::test]
    async fn stamps_header_strategy() {
        let response = send(
            app(TenantConfig::default()),
            "/dashboard",
            &[("x-tenant-id", "acme")],
        )
        .await;

        assert_eq!(response.headers()[TENANT_ID_HEADER], "acme");
        assert_eq!(response.headers()[TENANT_STRATEGY_HEADER], "header");
        assert!(!response.headers().contains_key(TENANT_SUBDOMAIN_HEADER));
    }

    #[tokio::test]
    async fn stamps_subdomain_strategy_with_domain() {
        let response = send(
            app(TenantConfig::default()),
            "/dashboard",
            &[("host", "acme.example.com:8080")],
        )
        .await;

        assert_eq!(response.headers()[TENANT_ID_HEADER], "acme");
        assert_eq!(response.headers()[TENANT_STRATEGY_HEADER], "subdomain");
        assert_eq!(response.headers()[TENANT_SUBDOMAIN_HEADER], "acme");
        assert_eq!(
            response.headers()[TENANT_DOMAIN_HEADER],
            "acme.example.com:8080"
        );
    }

    #[tokio::test]
    async fn skips_api_paths() {
        let response = send(app(TenantConfig::default()), "/api/ping", &[]).await;
        assert!(!response.headers().contains_key(TENANT_ID_HEADER));
    }

    #[tokio::test]
    async fn skips_static_assets() {
        for uri in ["/favicon.ico", "/_next/chunk", "/logo.svg"] {
            let response = send(app(TenantConfig::default()), uri, &[]).await;
            assert!(
                !response.headers().contains_key(TENANT_ID_HEADER),
                "stamped {uri}"
            );
        }
    }

    #[tokio::test]
    async fn stamps_default_when_nothing_resolves() {
        let response = send(app(TenantConfig::default()), "/dashboard", &[]).await;
        assert_eq!(response.headers()[TENANT_ID_HEADER], "default");
        assert_eq!(response.headers()[TENANT_STRATEGY_HEADER], "header");
    }

    #[test]
    fn scope_rules() {
        assert!(in_scope("/"));
        assert!(in_scope("/dashboard"));
        assert!(in_scope("/tenant/acme/dashboard"));
        assert!(!in_scope("/api/widgets"));
        assert!(!in_scope("/_next/static/chunk"));
        assert!(!in_scope("/favicon.ico"));
        assert!(!in_scope("/images/logo.png"));
    }
}
