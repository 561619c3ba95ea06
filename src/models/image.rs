//! Uploaded image models.

use serde::{Deserialize, Serialize};

/// Folder used when an upload names none.
pub const DEFAULT_IMAGE_PREFIX: &str = "trips";

/// A file selected for upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// An object already in the image library.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    pub name: String,
    pub path: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}
