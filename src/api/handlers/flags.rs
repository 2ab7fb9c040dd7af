//! Feature-flag endpoints, evaluated for the resolved tenant.
//!
//! `/api/*` paths are outside the stamping middleware's scope, so tenant
//! identity is re-derived here with the same resolver.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{error, instrument};
use utoipa::ToSchema;

use crate::api::AppContext;
use crate::flags::FlagValue;
use crate::tenant;

#[derive(ToSchema, Serialize, Debug)]
pub struct FlagsData {
    tenant_id: String,
    flags: BTreeMap<String, FlagValue>,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct FlagsEnvelope {
    status: String,
    data: FlagsData,
}

#[utoipa::path(
    get,
    path = "/api/flags",
    responses (
        (status = 200, description = "Flags evaluated for the resolved tenant", body = FlagsEnvelope)
    ),
    tag = "flags",
)]
/// Evaluate all flags for the request's tenant.
#[instrument(skip(ctx, headers))]
pub async fn list(Extension(ctx): Extension<AppContext>, headers: HeaderMap) -> impl IntoResponse {
    let resolution = tenant::resolve(&ctx.tenant_config, &headers, "/api/flags");
    let flags = ctx.flags.all_flags(&resolution.tenant_id);

    let envelope = FlagsEnvelope {
        status: "ok".to_string(),
        data: FlagsData {
            tenant_id: resolution.tenant_id,
            flags,
        },
    };
    (StatusCode::OK, Json(envelope))
}

#[utoipa::path(
    post,
    path = "/api/flags/refresh",
    responses (
        (status = 204, description = "Provider re-read its backing data"),
        (status = 500, description = "Refresh failed")
    ),
    tag = "flags",
)]
/// Ask the flag provider to re-read its backing data.
#[instrument(skip(ctx))]
pub async fn refresh(Extension(ctx): Extension<AppContext>) -> impl IntoResponse {
    match ctx.flags.refresh() {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!("flag refresh failed: {err:#}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
