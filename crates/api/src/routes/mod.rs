//! API routes

pub mod dashboard;
pub mod health;
pub mod site;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::Layer;
use tower_http::trace::TraceLayer;

use crate::{auth::require_user, routing::resolve_tenant, state::AppState};

/// Create the full application.
///
/// Health probes are answered directly. Every other request passes through
/// tenant resolution first, which may rewrite its URI before route matching.
pub fn create_router(state: AppState) -> Router {
    // Health check routes (outside tenant resolution so bare-IP probes work)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    // Dashboard routes (auth required)
    let dashboard_routes = Router::new()
        .route("/dashboard", get(dashboard::get_dashboard))
        .route("/dashboard/tenant", post(dashboard::create_tenant))
        .route(
            "/dashboard/tenant/:tenant_id/availability",
            get(dashboard::tenant_availability),
        )
        .route("/dashboard/page", put(dashboard::update_page))
        .route("/dashboard/hostname", put(dashboard::update_hostname))
        .route_layer(middleware::from_fn(require_user));

    // Public pages; tenant subdomains are rewritten onto /app/{tenant}
    let site_routes = Router::new()
        .route("/", get(site::landing))
        .route("/app/*path", get(site::tenant_page));

    let tenant_app = Router::new()
        .merge(dashboard_routes)
        .merge(site_routes)
        .with_state(state.clone());

    // Wrapping the router as a service lets the rewrite take effect
    let resolved =
        middleware::from_fn_with_state(Arc::clone(&state.resolution), resolve_tenant).layer(tenant_app);

    health_routes
        .fallback_service(resolved)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
