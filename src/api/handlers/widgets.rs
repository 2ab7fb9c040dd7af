//! Sample protected resource.
//!
//! The smallest mutating API the CSRF engine can guard end-to-end; widgets
//! are scoped to the resolved tenant and live only in process memory.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::AppContext;
use crate::tenant;

#[derive(ToSchema, Serialize, Clone, Debug)]
pub struct Widget {
    pub id: Uuid,
    pub name: String,
    pub tenant_id: String,
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct NewWidget {
    name: String,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct WidgetListEnvelope {
    status: String,
    data: Vec<Widget>,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct WidgetEnvelope {
    status: String,
    data: Widget,
}

#[utoipa::path(
    get,
    path = "/api/widgets",
    responses (
        (status = 200, description = "Widgets for the resolved tenant", body = WidgetListEnvelope)
    ),
    tag = "widgets",
)]
/// List the resolved tenant's widgets.
#[instrument(skip(ctx, headers))]
pub async fn list(Extension(ctx): Extension<AppContext>, headers: HeaderMap) -> impl IntoResponse {
    let resolution = tenant::resolve(&ctx.tenant_config, &headers, "/api/widgets");
    let data = ctx
        .widgets
        .read()
        .map(|widgets| {
            widgets
                .iter()
                .filter(|widget| widget.tenant_id == resolution.tenant_id)
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    let envelope = WidgetListEnvelope {
        status: "ok".to_string(),
        data,
    };
    (StatusCode::OK, Json(envelope))
}

#[utoipa::path(
    post,
    path = "/api/widgets",
    request_body = NewWidget,
    responses (
        (status = 201, description = "Widget created", body = WidgetEnvelope),
        (status = 422, description = "Empty widget name")
    ),
    tag = "widgets",
)]
/// Create a widget for the resolved tenant.
#[instrument(skip(ctx, headers, body))]
pub async fn create(
    Extension(ctx): Extension<AppContext>,
    headers: HeaderMap,
    Json(body): Json<NewWidget>,
) -> impl IntoResponse {
    let name = body.name.trim();
    if name.is_empty() {
        return StatusCode::UNPROCESSABLE_ENTITY.into_response();
    }

    let resolution = tenant::resolve(&ctx.tenant_config, &headers, "/api/widgets");
    let widget = Widget {
        id: Uuid::new_v4(),
        name: name.to_string(),
        tenant_id: resolution.tenant_id,
    };

    if let Ok(mut widgets) = ctx.widgets.write() {
        widgets.push(widget.clone());
    }

    let envelope = WidgetEnvelope {
        status: "ok".to_string(),
        data: widget,
    };
    (StatusCode::CREATED, Json(envelope)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csrf::CsrfConfig;
    use crate::tenant::TenantConfig;
    use anyhow::Result;
    use axum::body::to_bytes;
    use axum::http::HeaderValue;

    fn context() -> AppContext {
        AppContext::with_defaults(TenantConfig::default(), CsrfConfig::default())
    }

    fn tenant_headers(tenant: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-tenant-id", HeaderValue::from_str(tenant).expect("value"));
        headers
    }

    #[tokio::test]
    async fn create_then_list_is_tenant_scoped() -> Result<()> {
        let ctx = context();

        let created = create(
            Extension(ctx.clone()),
            tenant_headers("acme"),
            Json(NewWidget {
                name: "gizmo".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(created.status(), StatusCode::CREATED);

        let listed = list(Extension(ctx.clone()), tenant_headers("acme"))
            .await
            .into_response();
        let body = to_bytes(listed.into_body(), usize::MAX).await?;
        let json: serde_json::Value = serde_json::from_slice(&body)?;
        assert_eq!(json["data"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["data"][0]["name"], "gizmo");

        // Another tenant sees nothing.
        let other = list(Extension(ctx), tenant_headers("globex"))
            .await
            .into_response();
        let body = to_bytes(other.into_body(), usize::MAX).await?;
        let json: serde_json::Value = serde_json::from_slice(&body)?;
        assert_eq!(json["data"].as_array().map(Vec::len), Some(0));
        Ok(())
    }

    #[tokio::test]
    async fn empty_name_is_unprocessable() {
        let response = create(
            Extension(context()),
            HeaderMap::new(),
            Json(NewWidget {
                name: "   ".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
