//! Axum middleware applying the CSRF protocol engine.
//!
//! The middleware is a thin transport shim: it snapshots the cookie jar,
//! asks [`engine::evaluate`] what to do, and applies the result to the
//! response. All protocol decisions live in the engine.

use axum::{
    Json,
    extract::{Request, State},
    http::{
        HeaderName, HeaderValue, StatusCode,
        header::{CACHE_CONTROL, SET_COOKIE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error};
use utoipa::ToSchema;

use super::config::CsrfConfig;
use super::cookies::{CookieSnapshot, set_cookie_name};
use super::engine::{self, CsrfAction, Issued};

/// Error body for protocol rejections. Deliberately generic.
#[derive(Debug, Serialize, ToSchema)]
pub struct CsrfErrorBody {
    pub status: &'static str,
    pub error: String,
}

impl CsrfErrorBody {
    #[must_use]
    pub fn new(error: &str) -> Self {
        Self {
            status: "server_error",
            error: error.to_string(),
        }
    }
}

/// Enforce the double-submit protocol on protected paths.
pub async fn protect(
    State(config): State<Arc<CsrfConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let cookies = CookieSnapshot::from_headers(request.headers());

    let action = match engine::evaluate(
        &config,
        &method,
        &path,
        request.headers(),
        &cookies,
        now_ms(),
    ) {
        Ok(action) => action,
        Err(err) => {
            error!("CSRF evaluation failed: {err:#}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match action {
        CsrfAction::Passthrough => next.run(request).await,
        CsrfAction::Issue(issued) => {
            let mut response = next.run(request).await;
            apply_issued(&config, &mut response, &issued, false);
            response
        }
        CsrfAction::Reject(reason) => {
            debug!(%method, %path, ?reason, "CSRF rejection");
            (
                StatusCode::FORBIDDEN,
                Json(CsrfErrorBody::new(reason.message())),
            )
                .into_response()
        }
        CsrfAction::AcceptAndRotate(issued) => {
            let mut response = next.run(request).await;
            apply_issued(&config, &mut response, &issued, true);
            response
        }
    }
}

/// Attach a derived token, its cookie writes and `no-store` to a response.
///
/// With `exclusive_cookies`, downstream `Set-Cookie` entries for the CSRF
/// cookie names are dropped first so nothing can clobber a just-rotated
/// pair; all other downstream headers and cookies are preserved.
fn apply_issued(config: &CsrfConfig, response: &mut Response, issued: &Issued, exclusive: bool) {
    if exclusive {
        drop_csrf_cookies(config, response);
    }

    let headers = response.headers_mut();
    if let Ok(name) = HeaderName::from_bytes(config.header_name().as_bytes())
        && let Ok(value) = HeaderValue::from_str(&issued.token)
    {
        headers.insert(name, value);
    }
    for cookie in &issued.cookies {
        if let Some(value) = cookie.header_value() {
            headers.append(SET_COOKIE, value);
        }
    }
    // Token-bearing responses must never be cached or shared.
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
}

fn drop_csrf_cookies(config: &CsrfConfig, response: &mut Response) {
    let protected = [config.secret_cookie(), config.iat_cookie()];
    let headers = response.headers_mut();
    let existing: Vec<HeaderValue> = headers.get_all(SET_COOKIE).iter().cloned().collect();
    headers.remove(SET_COOKIE);
    for value in existing {
        let ours = value
            .to_str()
            .ok()
            .and_then(set_cookie_name)
            .is_some_and(|name| protected.iter().any(|p| p == name));
        if !ours {
            headers.append(SET_COOKIE, value);
        }
    }
}

/// Milliseconds since the epoch, saturating on clock weirdness.
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::Request as HttpRequest,
        middleware,
        routing::{get, post},
    };
    use tower::ServiceExt;
    use url::Url;

    fn test_config() -> Arc<CsrfConfig> {
        Arc::new(
            CsrfConfig::default()
                .with_secure_cookies(false)
                .with_app_url(Some(Url::parse("https://app.example.com").expect("url"))),
        )
    }

    fn app(config: Arc<CsrfConfig>) -> Router {
        Router::new()
            .route("/api/widgets", get(|| async { "list" }).post(|| async { "created" }))
            .route(
                "/api/leaky",
                post(|| async {
                    (
                        axum::response::AppendHeaders([
                            (SET_COOKIE, "csrf-secret=downstream; Path=/"),
                            (SET_COOKIE, "app=1"),
                        ]),
                        "done",
                    )
                }),
            )
            .route("/public", get(|| async { "open" }))
            .layer(middleware::from_fn_with_state(config, protect))
    }

    fn cookies_of(response: &Response) -> Vec<String> {
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok().map(ToString::to_string))
            .collect()
    }

    fn cookie_pair(cookies: &[String]) -> (String, String) {
        let secret = cookies
            .iter()
            .find(|cookie| cookie.starts_with("csrf-secret="))
            .expect("secret cookie");
        let iat = cookies
            .iter()
            .find(|cookie| cookie.starts_with("csrf-iat="))
            .expect("iat cookie");
        let value = |raw: &str| {
            raw.split_once('=')
                .and_then(|(_, rest)| rest.split(';').next())
                .expect("cookie value")
                .to_string()
        };
        (value(secret), value(iat))
    }

    #[tokio::test]
    async fn get_issues_token_and_cookies() {
        let response = app(test_config())
            .oneshot(
                HttpRequest::get("/api/widgets")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-csrf-token"));
        assert_eq!(response.headers()[CACHE_CONTROL], "no-store");

        let cookies = cookies_of(&response);
        assert_eq!(cookies.len(), 2);
        for cookie in &cookies {
            assert!(cookie.contains("HttpOnly"), "{cookie}");
            assert!(cookie.contains("SameSite=Strict"), "{cookie}");
            assert!(cookie.contains("Path=/"), "{cookie}");
        }
    }

    #[tokio::test]
    async fn public_path_untouched() {
        let response = app(test_config())
            .oneshot(
                HttpRequest::get("/public")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(!response.headers().contains_key("x-csrf-token"));
        assert!(cookies_of(&response).is_empty());
    }

    #[tokio::test]
    async fn post_without_anything_is_forbidden_with_error_body() {
        let response = app(test_config())
            .oneshot(
                HttpRequest::post("/api/widgets")
                    .header("origin", "https://app.example.com")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["status"], "server_error");
        assert_eq!(json["error"], "invalid or missing CSRF token");
    }

    #[tokio::test]
    async fn cross_origin_post_is_forbidden() {
        let response = app(test_config())
            .oneshot(
                HttpRequest::post("/api/widgets")
                    .header("origin", "https://evil.com")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["error"], "cross-origin request rejected");
    }

    #[tokio::test]
    async fn verified_post_rotates_and_downstream_csrf_cookies_lose() {
        let config = test_config();
        let app = app(config.clone());

        // Bootstrap cookies + token with a GET.
        let issued = app
            .clone()
            .oneshot(
                HttpRequest::get("/api/widgets")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let (secret, iat) = cookie_pair(&cookies_of(&issued));
        let token = issued.headers()["x-csrf-token"]
            .to_str()
            .expect("token")
            .to_string();

        // POST to a handler that tries to set its own csrf-secret cookie.
        let response = app
            .oneshot(
                HttpRequest::post("/api/leaky")
                    .header("origin", "https://app.example.com")
                    .header("x-csrf-token", &token)
                    .header(COOKIE, format!("csrf-secret={secret}; csrf-iat={iat}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let cookies = cookies_of(&response);
        // Downstream app cookie preserved, downstream csrf-secret dropped,
        // rotated pair present exactly once.
        assert!(cookies.iter().any(|cookie| cookie == "app=1"));
        assert!(!cookies.iter().any(|cookie| cookie.contains("downstream")));
        let (new_secret, _) = cookie_pair(&cookies);
        assert_ne!(new_secret, secret);

        let new_token = response.headers()["x-csrf-token"]
            .to_str()
            .expect("token");
        assert_ne!(new_token, token);
    }
}
