//! Explicit CSRF token issuance endpoint.
//!
//! Single-page frontends bootstrap from here before their first mutation.
//! The protocol engine skips this path, so the handler runs the safe-method
//! issuance itself and returns the token in the body as well as the header.

use axum::{
    Json,
    extract::Extension,
    http::{
        HeaderMap, HeaderName, HeaderValue, StatusCode,
        header::{CACHE_CONTROL, SET_COOKIE},
    },
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};
use utoipa::ToSchema;

use crate::api::AppContext;
use crate::csrf::engine;
use crate::csrf::cookies::CookieSnapshot;
use crate::csrf::middleware::now_ms;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CsrfTokenData {
    token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CsrfTokenEnvelope {
    status: String,
    data: CsrfTokenData,
}

#[utoipa::path(
    get,
    path = "/api/security/csrf",
    responses (
        (status = 200, description = "Freshly issued CSRF token", body = CsrfTokenEnvelope),
        (status = 500, description = "Token could not be issued")
    ),
    tag = "security",
)]
/// Issue a CSRF token, minting or rotating the secret cookie as needed.
#[instrument(skip(ctx, headers))]
pub async fn issue(Extension(ctx): Extension<AppContext>, headers: HeaderMap) -> impl IntoResponse {
    let config = &ctx.csrf_config;
    let cookies = CookieSnapshot::from_headers(&headers);

    let issued = match engine::issue(config, &cookies, now_ms()) {
        Ok(issued) => issued,
        Err(err) => {
            error!("CSRF issuance failed: {err:#}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut response_headers = HeaderMap::new();
    if let Ok(name) = HeaderName::from_bytes(config.header_name().as_bytes())
        && let Ok(value) = HeaderValue::from_str(&issued.token)
    {
        response_headers.insert(name, value);
    }
    for cookie in &issued.cookies {
        if let Some(value) = cookie.header_value() {
            response_headers.append(SET_COOKIE, value);
        }
    }
    response_headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

    let envelope = CsrfTokenEnvelope {
        status: "ok".to_string(),
        data: CsrfTokenData {
            token: issued.token,
        },
    };

    (StatusCode::OK, response_headers, Json(envelope)).into_response()
}
