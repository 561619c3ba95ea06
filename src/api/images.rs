//! Admin image library endpoints.

use axum::{
    extract::{Multipart, Query, State},
    Extension,
};
use serde::{Deserialize, Serialize};

use super::{error, success, ApiResult};
use crate::auth::AdminContext;
use crate::errors::AppError;
use crate::models::{ImageUpload, StoredImage};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub prefix: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadedImage {
    pub url: String,
}

/// GET /api/admin/images - Previously uploaded images.
pub async fn list_images(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Query(query): Query<ImageQuery>,
) -> ApiResult<Vec<StoredImage>> {
    let revision_id = state.store.version().await;
    let images = state
        .gateway
        .list_images(Some(&admin.token), query.prefix.as_deref())
        .await;

    match images.error {
        Some(e) => error(e, revision_id),
        None => success(images.data, revision_id),
    }
}

/// POST /api/admin/images - Upload a multipart `file`, optionally under `prefix`.
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    mut multipart: Multipart,
) -> ApiResult<UploadedImage> {
    let revision_id = state.store.version().await;
    let mut upload = None;
    let mut prefix = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return error(AppError::BadRequest(e.body_text()), revision_id),
        };

        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = match field.bytes().await {
                    Ok(bytes) => bytes,
                    Err(e) => return error(AppError::BadRequest(e.body_text()), revision_id),
                };
                if !bytes.is_empty() {
                    upload = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            Some("prefix") => match field.text().await {
                Ok(text) => prefix = Some(text.trim().to_string()),
                Err(e) => return error(AppError::BadRequest(e.body_text()), revision_id),
            },
            _ => {}
        }
    }

    match state
        .gateway
        .upload_image(Some(&admin.token), upload.as_ref(), prefix.as_deref())
        .await
    {
        Ok(url) => success(UploadedImage { url }, revision_id),
        Err(e) => error(e, revision_id),
    }
}
