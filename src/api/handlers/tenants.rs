//! Tenant introspection endpoint.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use crate::api::AppContext;
use crate::tenant::{self, TenantRecord, TenantResolution};

#[derive(ToSchema, Serialize, Debug)]
pub struct CurrentTenantData {
    #[schema(value_type = Object)]
    resolution: TenantResolution,
    /// Record for the resolved tenant; absent when the id is not a known
    /// tenant (the default id included, unless seeded).
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<TenantRecord>,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct CurrentTenantEnvelope {
    status: String,
    data: CurrentTenantData,
}

#[utoipa::path(
    get,
    path = "/api/tenants/current",
    responses (
        (status = 200, description = "Resolution and record for the request's tenant", body = CurrentTenantEnvelope)
    ),
    tag = "tenants",
)]
/// Resolve the request's tenant and look up its record.
#[instrument(skip(ctx, headers))]
pub async fn current(
    Extension(ctx): Extension<AppContext>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let resolution = tenant::resolve(&ctx.tenant_config, &headers, "/api/tenants/current");
    let record = ctx.tenants.fetch(&resolution.tenant_id);

    let envelope = CurrentTenantEnvelope {
        status: "ok".to_string(),
        data: CurrentTenantData { resolution, record },
    };
    (StatusCode::OK, Json(envelope))
}
