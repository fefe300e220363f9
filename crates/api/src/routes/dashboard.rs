//! Tenant dashboard
//!
//! Owner-scoped management of the caller's tenant: claim a tenant id, edit
//! the page, and move it to a custom hostname.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use hostgate_shared::{HostnameRebindRequest, PageContent, TenantId, TenantRecord};
use serde::{Deserialize, Serialize};

use crate::{auth::AuthUser, error::ApiError, rebind::RebindOutcome, state::AppState};

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub tenant: Option<TenantRecord>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTenantRequest {
    pub tenant_id: String,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub tenant_id: TenantId,
    pub available: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePageRequest {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateHostnameRequest {
    pub hostname: String,
}

// ============================================================================
// Route handlers
// ============================================================================

/// The caller's tenant, if any
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let tenant = state.directory.find_by_owner(&auth_user.user_id).await?;
    Ok(Json(DashboardResponse { tenant }))
}

/// Claim a tenant id for the caller
pub async fn create_tenant(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<CreateTenantRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TenantRecord>), ApiError> {
    let Json(req) = payload?;
    let tenant_id = TenantId::parse(&req.tenant_id)?;
    if tenant_id.is_reserved() {
        return Err(ApiError::Validation(format!("Tenant id '{}' is reserved", tenant_id)));
    }

    // One tenant per user
    if state.directory.find_by_owner(&auth_user.user_id).await?.is_some() {
        return Err(ApiError::Conflict("User already has a tenant id".to_string()));
    }

    if state.directory.exists_by_id(&tenant_id).await? {
        return Err(ApiError::Conflict("Tenant id already taken".to_string()));
    }

    state.directory.create(&tenant_id, &auth_user.user_id).await?;
    tracing::info!(tenant_id = %tenant_id, user_id = %auth_user.user_id, "Tenant created");

    Ok((
        StatusCode::CREATED,
        Json(TenantRecord::new(tenant_id, auth_user.user_id)),
    ))
}

/// Whether a tenant id can still be claimed
pub async fn tenant_availability(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let tenant_id = TenantId::parse(&tenant_id)?;
    let available = !tenant_id.is_reserved() && !state.directory.exists_by_id(&tenant_id).await?;
    Ok(Json(AvailabilityResponse { tenant_id, available }))
}

/// Update the caller's page content
pub async fn update_page(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<UpdatePageRequest>, JsonRejection>,
) -> Result<Json<PageContent>, ApiError> {
    let Json(req) = payload?;
    if req.title.trim().is_empty() || req.message.trim().is_empty() {
        return Err(ApiError::Validation("Title and message required".to_string()));
    }

    let tenant = state
        .directory
        .find_by_owner(&auth_user.user_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    state
        .directory
        .update_content(&tenant.id, &auth_user.user_id, &req.title, &req.message)
        .await?;

    Ok(Json(PageContent {
        title: req.title,
        message: req.message,
    }))
}

/// Move the caller's tenant to a new custom hostname
pub async fn update_hostname(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<UpdateHostnameRequest>, JsonRejection>,
) -> Result<Json<RebindOutcome>, ApiError> {
    let Json(req) = payload?;
    let outcome = state
        .rebind
        .rebind(HostnameRebindRequest {
            tenant_id: None,
            owner_user_id: auth_user.user_id,
            new_hostname: req.hostname,
        })
        .await?;

    Ok(Json(outcome))
}
