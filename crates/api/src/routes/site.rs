//! Public pages
//!
//! Tenant pages live under `/app/{tenant}`; requests only reach them through
//! a tenant hostname, never directly on the apex.

use axum::{
    extract::{Path, State},
    Json,
};
use hostgate_shared::TenantId;
use serde::Serialize;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct LandingResponse {
    pub public_domain: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct TenantPageResponse {
    pub tenant_id: TenantId,
    pub title: String,
    pub message: String,
    /// Path within the tenant site
    pub path: String,
}

/// Apex landing page
pub async fn landing(State(state): State<AppState>) -> Json<LandingResponse> {
    Json(LandingResponse {
        public_domain: state.config.public_domain.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Render a tenant page; `path` is everything after `/app/`
pub async fn tenant_page(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<TenantPageResponse>, ApiError> {
    let (tenant, rest) = path.split_once('/').unwrap_or((path.as_str(), ""));
    let tenant_id = TenantId::parse(tenant).map_err(|_| ApiError::NotFound)?;

    let content = state
        .directory
        .get_public_content(&tenant_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(TenantPageResponse {
        tenant_id,
        title: content.title,
        message: content.message,
        path: format!("/{}", rest),
    }))
}
