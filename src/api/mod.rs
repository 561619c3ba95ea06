//! REST API module.
//!
//! Public routes serve the page, the catalogue and the contact form. Admin routes sit
//! behind the session guard. Every response carries the client store version as
//! `revisionId`.

mod auth;
mod content;
mod images;
mod messages;
mod public;
mod trips;

pub use auth::*;
pub use content::*;
pub use images::*;
pub use messages::*;
pub use public::*;
pub use trips::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::AdminContext;
use crate::AppState;

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub revision_id: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, revision_id: i64) -> Self {
        Self {
            success: true,
            data,
            revision_id,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::errors::AppErrorWithRevision>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T, revision_id: i64) -> ApiResult<T> {
    Ok(ApiResponse::new(data, revision_id))
}

/// Create an error API response.
pub fn error<T: Serialize>(err: crate::errors::AppError, revision_id: i64) -> ApiResult<T> {
    Err(crate::errors::AppErrorWithRevision {
        error: err,
        revision_id,
    })
}

/// Reload the store after an admin write and return the new version.
async fn refresh_store(state: &AppState, admin: &AdminContext) -> i64 {
    let refreshed = state
        .store
        .refresh(&state.gateway, Some(&admin.token))
        .await;
    for warning in &refreshed.warnings {
        tracing::warn!("Store refresh degraded: {}", warning);
    }
    refreshed.snapshot.version
}
