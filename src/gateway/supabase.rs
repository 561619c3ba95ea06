//! Hosted backend over its REST surface: PostgREST tables, GoTrue auth and object storage.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::{Backend, Bearer};
use crate::errors::AppError;
use crate::models::{
    AuthSession, AuthUser, ImageUpload, Message, MessageRow, MessageStatus, StoredImage, Trip,
    TripRow, SITE_CONTENT_ID,
};

/// Objects listed per image-library page.
const LIST_LIMIT: u32 = 100;

pub struct SupabaseBackend {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    bucket: String,
}

#[derive(Deserialize)]
struct ContentRow {
    #[serde(default)]
    content: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    user: AuthUser,
}

#[derive(Deserialize)]
struct ObjectEntry {
    name: String,
    /// Null for folder placeholders.
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl SupabaseBackend {
    pub fn new(base_url: &str, anon_key: &str, bucket: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            bucket: bucket.to_string(),
        }
    }

    fn rest(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn storage(&self, path: &str) -> String {
        format!("{}/storage/v1/{}", self.base_url, path)
    }

    /// Attach the project key and either the user's token or the anon key.
    fn authed(&self, request: RequestBuilder, bearer: Bearer<'_>) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer.unwrap_or(&self.anon_key))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, AppError> {
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(backend_error(status, &body));
        }
        Ok(resp)
    }
}

/// Turn an error response into an `AppError`, preferring the service's own message.
fn backend_error(status: StatusCode, body: &str) -> AppError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "error_description", "msg", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        StatusCode::FORBIDDEN => AppError::Forbidden(message),
        _ => AppError::Backend(format!("{} (status {})", message, status.as_u16())),
    }
}

#[async_trait]
impl Backend for SupabaseBackend {
    fn name(&self) -> &'static str {
        "supabase"
    }

    async fn load_site_content(&self) -> Result<Option<serde_json::Value>, AppError> {
        let id_filter = format!("eq.{}", SITE_CONTENT_ID);
        let request = self
            .client
            .get(self.rest("site_content"))
            .query(&[("select", "content"), ("id", id_filter.as_str())]);
        let rows: Vec<ContentRow> = self.send(self.authed(request, None)).await?.json().await?;
        Ok(rows.into_iter().next().and_then(|row| row.content))
    }

    async fn store_site_content(
        &self,
        bearer: Bearer<'_>,
        content: &serde_json::Value,
    ) -> Result<(), AppError> {
        let request = self
            .client
            .post(self.rest("site_content"))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&json!({
                "id": SITE_CONTENT_ID,
                "content": content,
                "updated_at": Utc::now().to_rfc3339(),
            }));
        self.send(self.authed(request, bearer)).await?;
        Ok(())
    }

    async fn list_trips(&self) -> Result<Vec<Trip>, AppError> {
        let request = self
            .client
            .get(self.rest("trips"))
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        let rows: Vec<TripRow> = self.send(self.authed(request, None)).await?.json().await?;
        Ok(rows.into_iter().map(Trip::from).collect())
    }

    async fn has_trips(&self) -> Result<bool, AppError> {
        let request = self
            .client
            .get(self.rest("trips"))
            .query(&[("select", "id"), ("limit", "1")]);
        let rows: Vec<serde_json::Value> =
            self.send(self.authed(request, None)).await?.json().await?;
        Ok(!rows.is_empty())
    }

    async fn insert_trips(&self, bearer: Bearer<'_>, trips: &[Trip]) -> Result<Vec<Trip>, AppError> {
        let payload: Vec<TripRow> = trips.iter().map(|t| TripRow::for_write(t, None)).collect();
        let request = self
            .client
            .post(self.rest("trips"))
            .header("Prefer", "return=representation")
            .json(&payload);
        let rows: Vec<TripRow> = self.send(self.authed(request, bearer)).await?.json().await?;
        Ok(rows.into_iter().map(Trip::from).collect())
    }

    async fn update_trip(&self, bearer: Bearer<'_>, trip: &Trip) -> Result<(), AppError> {
        let payload = TripRow::for_write(trip, Some(Utc::now().to_rfc3339()));
        let request = self
            .client
            .patch(self.rest("trips"))
            .query(&[("id", format!("eq.{}", trip.id))])
            .json(&payload);
        self.send(self.authed(request, bearer)).await?;
        Ok(())
    }

    async fn delete_trip(&self, bearer: Bearer<'_>, id: &str) -> Result<(), AppError> {
        let request = self
            .client
            .delete(self.rest("trips"))
            .query(&[("id", format!("eq.{}", id))]);
        self.send(self.authed(request, bearer)).await?;
        Ok(())
    }

    async fn list_messages(&self, bearer: Bearer<'_>) -> Result<Vec<Message>, AppError> {
        let request = self
            .client
            .get(self.rest("messages"))
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        let rows: Vec<MessageRow> = self.send(self.authed(request, bearer)).await?.json().await?;
        Ok(rows.into_iter().map(Message::from).collect())
    }

    async fn insert_message(&self, message: &Message) -> Result<(), AppError> {
        let request = self
            .client
            .post(self.rest("messages"))
            .header("Prefer", "return=minimal")
            .json(&MessageRow::from(message));
        self.send(self.authed(request, None)).await?;
        Ok(())
    }

    async fn set_message_status(
        &self,
        bearer: Bearer<'_>,
        id: &str,
        status: MessageStatus,
    ) -> Result<(), AppError> {
        let request = self
            .client
            .patch(self.rest("messages"))
            .query(&[("id", format!("eq.{}", id))])
            .json(&json!({ "status": status }));
        self.send(self.authed(request, bearer)).await?;
        Ok(())
    }

    async fn put_object(
        &self,
        bearer: Bearer<'_>,
        path: &str,
        upload: &ImageUpload,
    ) -> Result<(), AppError> {
        let request = self
            .client
            .post(self.storage(&format!("object/{}/{}", self.bucket, path)))
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, &upload.content_type)
            .body(upload.bytes.clone());
        self.send(self.authed(request, bearer)).await?;
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        self.storage(&format!("object/public/{}/{}", self.bucket, path))
    }

    async fn list_objects(&self, bearer: Bearer<'_>, prefix: &str) -> Result<Vec<StoredImage>, AppError> {
        let request = self
            .client
            .post(self.storage(&format!("object/list/{}", self.bucket)))
            .json(&json!({
                "prefix": prefix,
                "limit": LIST_LIMIT,
                "offset": 0,
                "sortBy": { "column": "created_at", "order": "desc" },
            }));
        let entries: Vec<ObjectEntry> = self.send(self.authed(request, bearer)).await?.json().await?;

        Ok(entries
            .into_iter()
            .filter(|e| e.id.is_some())
            .map(|e| {
                let path = format!("{}/{}", prefix.trim_end_matches('/'), e.name);
                StoredImage {
                    url: self.public_url(&path),
                    name: e.name,
                    path,
                    created_at: e.created_at,
                }
            })
            .collect())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let request = self
            .client
            .post(self.auth("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }));

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(match backend_error(status, &body) {
                AppError::Backend(msg) if status == StatusCode::BAD_REQUEST => {
                    AppError::Unauthorized(msg.replace(" (status 400)", ""))
                }
                other => other,
            });
        }

        let token: TokenResponse = resp.json().await?;
        Ok(AuthSession {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            user: token.user,
        })
    }

    async fn sign_out(&self, token: &str) -> Result<(), AppError> {
        let request = self.client.post(self.auth("logout"));
        self.send(self.authed(request, Some(token))).await?;
        Ok(())
    }

    async fn get_user(&self, token: &str) -> Result<Option<AuthUser>, AppError> {
        let request = self.authed(self.client.get(self.auth("user")), Some(token));
        match self.send(request).await {
            Ok(resp) => Ok(Some(resp.json().await?)),
            Err(AppError::Unauthorized(_)) | Err(AppError::Forbidden(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn is_admin(&self, bearer: Bearer<'_>, user_id: &str) -> Result<bool, AppError> {
        let request = self
            .client
            .get(self.rest("admin_users"))
            .query(&[("select", "user_id".to_string()), ("user_id", format!("eq.{}", user_id))]);
        let rows: Vec<serde_json::Value> =
            self.send(self.authed(request, bearer)).await?.json().await?;
        Ok(!rows.is_empty())
    }
}
