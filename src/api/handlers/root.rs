use axum::response::IntoResponse;
use tracing::instrument;

// axum handler for /
#[instrument]
pub async fn root() -> impl IntoResponse {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::root;
    use anyhow::Result;
    use axum::{body::to_bytes, response::IntoResponse};

    #[tokio::test]
    async fn root_reports_name_and_version() -> Result<()> {
        let response = root().await.into_response();
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let text = String::from_utf8(body.to_vec())?;
        assert!(text.starts_with(env!("CARGO_PKG_NAME")));
        assert!(text.ends_with(env!("CARGO_PKG_VERSION")));
        Ok(())
    }
}
