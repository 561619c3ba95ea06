//! Login, session restore and logout endpoints.

use axum::{extract::State, http::HeaderMap, Json};

use super::{error, success, ApiResult};
use crate::auth::{bearer_token, AuthEvent, GuardState, Transition};
use crate::errors::AppError;
use crate::models::{LoginRequest, SessionView};
use crate::AppState;

fn session_view(transition: &Transition, token: &str) -> SessionView {
    let username = match &transition.state {
        GuardState::Admin { user, .. } | GuardState::CheckingAdmin { user } => Some(user.label()),
        _ => None,
    };
    SessionView {
        state: transition.state.name(),
        username,
        access_token: (!transition.state.is_signed_out()).then(|| token.to_string()),
    }
}

fn signed_out_view() -> SessionView {
    SessionView {
        state: GuardState::SignedOut.name(),
        username: None,
        access_token: None,
    }
}

/// Reload the dashboard data when a transition asks for it.
async fn apply_refresh(state: &AppState, transition: &Transition, token: &str) -> i64 {
    if transition.refresh {
        state
            .store
            .refresh(&state.gateway, Some(token))
            .await
            .snapshot
            .version
    } else {
        state.store.version().await
    }
}

/// POST /api/auth/login - Sign in and run the admin check.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<SessionView> {
    let revision_id = state.store.version().await;

    if request.username.trim().is_empty() || request.password.is_empty() {
        return error(
            AppError::Validation("Username and password are required".to_string()),
            revision_id,
        );
    }

    let email = state.config.login_email(&request.username);
    let session = match state.gateway.sign_in(&email, &request.password).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(%email, "Login failed: {}", e);
            return error(e, revision_id);
        }
    };

    let token = session.access_token;
    let transition = state
        .sessions
        .dispatch(&token, AuthEvent::SignedIn(session.user))
        .await;

    if let GuardState::SignedOutForced { reason } = &transition.state {
        return error(AppError::Forbidden(reason.clone()), revision_id);
    }

    let revision_id = apply_refresh(&state, &transition, &token).await;
    success(session_view(&transition, &token), revision_id)
}

/// GET /api/auth/session - Restore a stored session.
///
/// A token the guard has not seen yet is treated as the initial session of a page
/// load and admitted without the allow-list check.
pub async fn get_session(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<SessionView> {
    let revision_id = state.store.version().await;

    let Some(token) = bearer_token(&headers) else {
        return success(signed_out_view(), revision_id);
    };

    if let Some(user) = state.sessions.admin_user(&token).await {
        return success(
            SessionView {
                state: "admin",
                username: Some(user.label()),
                access_token: Some(token),
            },
            revision_id,
        );
    }

    let user = match state.gateway.get_session(&token).await {
        Ok(user) => user,
        Err(e) => return error(e, revision_id),
    };
    let transition = state
        .sessions
        .dispatch(&token, AuthEvent::InitialSession(user))
        .await;

    let revision_id = apply_refresh(&state, &transition, &token).await;
    success(session_view(&transition, &token), revision_id)
}

/// POST /api/auth/logout - Sign out. Local traces are cleared even if the backend
/// call fails.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<SessionView> {
    let revision_id = state.store.version().await;

    let Some(token) = bearer_token(&headers) else {
        return error(
            AppError::Unauthorized("Missing bearer token".to_string()),
            revision_id,
        );
    };

    let transition = state.sessions.sign_out(&token).await;
    tracing::info!("Admin signed out");
    success(session_view(&transition, &token), revision_id)
}
