use crate::{
    api::handlers::{csrf as csrf_handlers, flags, health, root, tenants, widgets},
    csrf::CsrfConfig,
    flags::{FlagProvider, FlagSet, StaticFlagProvider},
    tenant::{self, InMemoryTenantProvider, TenantConfig, TenantProvider},
};
use anyhow::Result;
use axum::{
    Extension,
    body::Body,
    http::{
        HeaderName, HeaderValue, Method, Request,
        header::{CONTENT_SECURITY_POLICY, CONTENT_TYPE},
    },
    middleware,
    routing::get,
};
use std::sync::{Arc, RwLock};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::{SetRequestHeaderLayer, SetResponseHeaderLayer},
    trace::TraceLayer,
};
use tracing::{Span, debug_span, info};
use ulid::Ulid;
use utoipa::openapi::{InfoBuilder, License, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

pub mod handlers;

pub use handlers::widgets::Widget;

/// Everything a handler can reach, assembled once at startup. Configs are
/// immutable; providers are chosen at construction time.
#[derive(Clone)]
pub struct AppContext {
    pub tenant_config: Arc<TenantConfig>,
    pub csrf_config: Arc<CsrfConfig>,
    pub tenants: Arc<dyn TenantProvider>,
    pub flags: Arc<dyn FlagProvider>,
    pub widgets: Arc<RwLock<Vec<Widget>>>,
}

impl AppContext {
    #[must_use]
    pub fn new(
        tenant_config: TenantConfig,
        csrf_config: CsrfConfig,
        tenants: Arc<dyn TenantProvider>,
        flags: Arc<dyn FlagProvider>,
    ) -> Self {
        Self {
            tenant_config: Arc::new(tenant_config),
            csrf_config: Arc::new(csrf_config),
            tenants,
            flags,
            widgets: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Context with empty in-memory providers.
    #[must_use]
    pub fn with_defaults(tenant_config: TenantConfig, csrf_config: CsrfConfig) -> Self {
        Self::new(
            tenant_config,
            csrf_config,
            Arc::new(InMemoryTenantProvider::new()),
            Arc::new(StaticFlagProvider::new(FlagSet::default())),
        )
    }

    #[must_use]
    pub fn with_tenants(mut self, tenants: Arc<dyn TenantProvider>) -> Self {
        self.tenants = tenants;
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: Arc<dyn FlagProvider>) -> Self {
        self.flags = flags;
        self
    }
}

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Reuse the same router wiring and only return the generated spec.
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Build the router that also drives the `OpenAPI` document.
///
/// Add new endpoints here via `.routes(routes!(...))` so they are both
/// served and documented. `/` is wired separately and intentionally not
/// documented.
fn api_router() -> OpenApiRouter {
    let mut router = OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::live))
        .routes(routes!(health::health))
        .routes(routes!(csrf_handlers::issue))
        .routes(routes!(flags::list))
        .routes(routes!(flags::refresh))
        .routes(routes!(tenants::current))
        .routes(routes!(widgets::list, widgets::create));

    let mut gateway_tag = Tag::new("security");
    gateway_tag.description = Some("Tenant resolution and CSRF protection".to_string());
    router.get_openapi_mut().tags = Some(vec![gateway_tag]);

    router
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    // Cargo.toml metadata instead of the utoipa defaults.
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(Some(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    let identifier = env!("CARGO_PKG_LICENSE");
    if !identifier.is_empty() {
        let mut license = License::new(identifier);
        license.identifier = Some(identifier.to_string());
        info.license = Some(license);
    }

    OpenApiBuilder::new().info(info).build()
}

/// Assemble the full application: routes plus the middleware stack.
///
/// Exposed separately from [`new`] so tests can drive the exact production
/// wiring in process.
#[must_use]
pub fn app(ctx: &AppContext) -> axum::Router {
    let cors = cors_layer(ctx);

    let (router, _openapi) = api_router().split_for_parts();
    router.route("/", get(root::root)).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(SetResponseHeaderLayer::if_not_present(
                CONTENT_SECURITY_POLICY,
                HeaderValue::from_static(
                    "default-src 'self'; frame-ancestors 'none'; base-uri 'self'",
                ),
            ))
            .layer(cors)
            .layer(middleware::from_fn_with_state(
                ctx.tenant_config.clone(),
                tenant::middleware::stamp,
            ))
            .layer(middleware::from_fn_with_state(
                ctx.csrf_config.clone(),
                crate::csrf::middleware::protect,
            ))
            .layer(Extension(ctx.clone())),
    )
}

fn cors_layer(ctx: &AppContext) -> CorsLayer {
    let exact = ctx
        .csrf_config
        .app_url()
        .map(|url| url.origin().ascii_serialization())
        .and_then(|origin| HeaderValue::from_str(&origin).ok());

    let mut allow_headers = vec![CONTENT_TYPE];
    for name in ctx.csrf_config.accepted_headers() {
        if let Ok(header) = HeaderName::from_bytes(name.as_bytes()) {
            allow_headers.push(header);
        }
    }

    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE];
    match exact {
        // Pin browsers to the configured frontend and let them send the
        // CSRF cookies along.
        Some(origin) => CorsLayer::new()
            .allow_methods(methods)
            .allow_headers(allow_headers)
            .allow_origin(AllowOrigin::exact(origin))
            .allow_credentials(true),
        None => CorsLayer::new()
            .allow_methods(methods)
            .allow_headers(allow_headers)
            .allow_origin(Any),
    }
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, ctx: AppContext) -> Result<()> {
    let app = app(&ctx);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let method = request.method().as_str();
    let path = request.uri().path();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", method, path, request_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_documented_routes() {
        let doc = openapi();
        let paths = &doc.paths.paths;
        for path in [
            "/live",
            "/health",
            "/api/security/csrf",
            "/api/flags",
            "/api/flags/refresh",
            "/api/tenants/current",
            "/api/widgets",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
        // `/` is wired outside the documented router.
        assert!(!paths.contains_key("/"));
    }

    #[test]
    fn openapi_carries_cargo_metadata() {
        let doc = openapi();
        assert_eq!(doc.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(doc.info.version, env!("CARGO_PKG_VERSION"));
    }
}
