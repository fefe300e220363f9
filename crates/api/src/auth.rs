//! Caller identity
//!
//! Sessions are issued by the upstream auth gateway, which forwards the
//! authenticated user id in a trusted header. This module only lifts that
//! header into an [`AuthUser`] extension.

use axum::{extract::Request, middleware::Next, response::Response};

use crate::error::ApiError;

/// Header carrying the authenticated user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
}

/// Middleware that rejects requests without an authenticated user
pub async fn require_user(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let user_id = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ApiError::Unauthorized)?;

    request.extensions_mut().insert(AuthUser { user_id });
    Ok(next.run(request).await)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::get, Extension, Router};
    use tower::ServiceExt;

    async fn whoami(Extension(user): Extension<AuthUser>) -> String {
        user.user_id
    }

    fn app() -> Router {
        Router::new()
            .route("/", get(whoami))
            .layer(axum::middleware::from_fn(require_user))
    }

    #[tokio::test]
    async fn test_missing_user_is_unauthorized() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app()
            .oneshot(Request::builder().uri("/").header(USER_ID_HEADER, "  ").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_user_is_forwarded() {
        let response = app()
            .oneshot(Request::builder().uri("/").header(USER_ID_HEADER, "user-1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"user-1");
    }
}
