//! Tenant resolution for inbound requests
//!
//! Runs once per request, before route matching, and turns the classifier's
//! decision into either a (possibly rewritten) URI or a terminal response.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, uri::PathAndQuery, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, warn};

use super::classifier::{HostnameClassifier, RejectReason, RoutingDecision};

/// What the request pipeline should do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Continue with this path (and query) for route matching
    Forward(String),
    /// Stop with a terminal response
    Reject(RejectReason),
}

/// Translates hostname classification into the router's dispatch
#[derive(Debug, Clone)]
pub struct TenantResolutionRouter {
    classifier: HostnameClassifier,
}

impl TenantResolutionRouter {
    pub fn new(classifier: HostnameClassifier) -> Self {
        Self { classifier }
    }

    /// Resolve a raw Host header value and request target
    pub fn dispatch(&self, host: &str, path_and_query: &str) -> Dispatch {
        let hostname = normalize_host(host);
        match self.classifier.classify(&hostname, path_and_query) {
            RoutingDecision::Unchanged(path) | RoutingDecision::Rewrite(path) => Dispatch::Forward(path),
            RoutingDecision::Rejected(reason) => Dispatch::Reject(reason),
        }
    }
}

/// Middleware applying [`TenantResolutionRouter`] to every request.
///
/// Must wrap the router as a service (not be added with `Router::layer`),
/// otherwise the rewritten URI would not take part in route matching.
pub async fn resolve_tenant(
    State(router): State<Arc<TenantResolutionRouter>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(host) = request_host(&request) else {
        debug!("Request without host rejected");
        return RejectReason::NotFound.into_response();
    };

    let original = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    match router.dispatch(&host, &original) {
        Dispatch::Forward(target) => {
            if target != original {
                match rewrite_uri(request.uri(), &target) {
                    Ok(uri) => {
                        debug!(host = %host, from = %original, to = %target, "Rewrote tenant request");
                        *request.uri_mut() = uri;
                    }
                    Err(e) => {
                        warn!(host = %host, target = %target, error = %e, "Unusable rewrite target");
                        return RejectReason::NotFound.into_response();
                    }
                }
            }
            next.run(request).await
        }
        Dispatch::Reject(reason) => {
            debug!(host = %host, path = %original, reason = reason.as_str(), "Request rejected by tenant resolution");
            reason.into_response()
        }
    }
}

impl IntoResponse for RejectReason {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            RejectReason::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", "Not found"),
            RejectReason::InvalidSubdomain => (
                StatusCode::BAD_REQUEST,
                "INVALID_SUBDOMAIN",
                "This address has too many subdomain levels",
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Host header value, falling back to the URI authority (HTTP/2)
fn request_host(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().host().map(str::to_string))
        .filter(|h| !h.is_empty())
}

/// Normalize a host header value
pub fn normalize_host(host: &str) -> String {
    // Remove port if present
    let host = host.split(':').next().unwrap_or(host);
    // Fully qualified form
    let host = host.trim_end_matches('.');
    host.to_lowercase()
}

fn rewrite_uri(uri: &Uri, path_and_query: &str) -> Result<Uri, axum::http::Error> {
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query)?);
    Ok(Uri::from_parts(parts)?)
}
