//! Admin authentication.
//!
//! Admin routes take the session's access token as a bearer header. The request is
//! admitted only while that session's guard is in the admin state.

mod guard;

pub use guard::*;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use subtle::ConstantTimeEq;

use crate::errors::{codes, ErrorDetails, ErrorResponse};
use crate::models::AuthUser;
use crate::AppState;

/// Admitted admin, inserted into request extensions by [`admin_auth_layer`].
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub token: String,
    pub user: AuthUser,
}

/// Gate admin routes on a live, admitted session.
pub async fn admin_auth_layer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return unauthorized_response("Missing bearer token");
    };

    match state.sessions.admin_user(&token).await {
        Some(user) => {
            request.extensions_mut().insert(AdminContext { token, user });
            next.run(request).await
        }
        None => unauthorized_response("Admin session required"),
    }
}

/// Token from an `Authorization: Bearer ...` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Perform constant-time string comparison.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorResponse {
        success: false,
        error: ErrorDetails {
            code: codes::UNAUTHORIZED.to_string(),
            message: message.to_string(),
            details: None,
        },
        revision_id: 0,
    };

    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("test-key-123", "test-key-123"));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("test-key-123", "test-key-124"));
    }

    #[test]
    fn test_constant_time_compare_different_lengths() {
        assert!(!constant_time_compare("short", "much-longer-key"));
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc".to_string()));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[tokio::test]
    async fn test_admin_layer_admits_only_admitted_sessions() {
        use crate::gateway::{testing::MockBackend, Gateway};
        use axum::body::Body;
        use std::sync::Arc;
        use tower::ServiceExt;

        let backend = Arc::new(MockBackend::new());
        backend.allow_admin("ops@zentura.in");
        let config = crate::tests::test_config("unused.sqlite".into());
        let state = AppState::new(Gateway::new(backend), config);
        let app = crate::create_router(state.clone());

        let request = |token: &str| {
            axum::http::Request::builder()
                .uri("/api/admin/trips")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap()
        };

        let resp = app.clone().oneshot(request("token-ops@zentura.in")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let user = AuthUser {
            id: "ops@zentura.in".to_string(),
            email: Some("ops@zentura.in".to_string()),
        };
        state
            .sessions
            .dispatch("token-ops@zentura.in", AuthEvent::SignedIn(user))
            .await;

        let resp = app.oneshot(request("token-ops@zentura.in")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
