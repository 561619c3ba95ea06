//! In-memory backend for tests. No network or database required.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::{Backend, Bearer};
use crate::errors::AppError;
use crate::models::{
    AuthSession, AuthUser, ImageUpload, Message, MessageStatus, StoredImage, Trip,
};

pub struct MockBackend {
    fail_reads: AtomicBool,
    content: Mutex<Option<serde_json::Value>>,
    trips: Mutex<Vec<Trip>>,
    messages: Mutex<Vec<Message>>,
    objects: Mutex<Vec<String>>,
    admins: Mutex<Vec<String>>,
    admin_check_delay: Mutex<Duration>,
    next_id: AtomicUsize,
    pub admin_checks_started: AtomicUsize,
    pub admin_checks_finished: AtomicUsize,
    pub sign_outs: AtomicUsize,
    pub local_clears: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            fail_reads: AtomicBool::new(false),
            content: Mutex::new(None),
            trips: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
            objects: Mutex::new(Vec::new()),
            admins: Mutex::new(Vec::new()),
            admin_check_delay: Mutex::new(Duration::ZERO),
            next_id: AtomicUsize::new(1),
            admin_checks_started: AtomicUsize::new(0),
            admin_checks_finished: AtomicUsize::new(0),
            sign_outs: AtomicUsize::new(0),
            local_clears: AtomicUsize::new(0),
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_content(&self, content: serde_json::Value) {
        *self.content.lock().unwrap() = Some(content);
    }

    pub fn allow_admin(&self, user_id: &str) {
        self.admins.lock().unwrap().push(user_id.to_string());
    }

    pub fn set_admin_check_delay(&self, delay: Duration) {
        *self.admin_check_delay.lock().unwrap() = delay;
    }

    fn read_guard(&self) -> Result<(), AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            Err(AppError::Backend("mock read failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn load_site_content(&self) -> Result<Option<serde_json::Value>, AppError> {
        self.read_guard()?;
        Ok(self.content.lock().unwrap().clone())
    }

    async fn store_site_content(
        &self,
        _bearer: Bearer<'_>,
        content: &serde_json::Value,
    ) -> Result<(), AppError> {
        *self.content.lock().unwrap() = Some(content.clone());
        Ok(())
    }

    async fn list_trips(&self) -> Result<Vec<Trip>, AppError> {
        self.read_guard()?;
        let mut trips = self.trips.lock().unwrap().clone();
        trips.reverse();
        Ok(trips)
    }

    async fn has_trips(&self) -> Result<bool, AppError> {
        Ok(!self.trips.lock().unwrap().is_empty())
    }

    async fn insert_trips(&self, _bearer: Bearer<'_>, trips: &[Trip]) -> Result<Vec<Trip>, AppError> {
        let mut created = Vec::with_capacity(trips.len());
        for trip in trips {
            let mut trip = trip.clone();
            trip.id = format!("trip-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
            trip.created_at = Some(Utc::now().to_rfc3339());
            created.push(trip);
        }
        self.trips.lock().unwrap().extend(created.iter().cloned());
        Ok(created)
    }

    async fn update_trip(&self, _bearer: Bearer<'_>, trip: &Trip) -> Result<(), AppError> {
        let mut trips = self.trips.lock().unwrap();
        match trips.iter_mut().find(|t| t.id == trip.id) {
            Some(existing) => {
                *existing = trip.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Trip {} not found", trip.id))),
        }
    }

    async fn delete_trip(&self, _bearer: Bearer<'_>, id: &str) -> Result<(), AppError> {
        self.trips.lock().unwrap().retain(|t| t.id != id);
        Ok(())
    }

    async fn list_messages(&self, _bearer: Bearer<'_>) -> Result<Vec<Message>, AppError> {
        self.read_guard()?;
        Ok(self.messages.lock().unwrap().clone())
    }

    async fn insert_message(&self, message: &Message) -> Result<(), AppError> {
        self.messages.lock().unwrap().insert(0, message.clone());
        Ok(())
    }

    async fn set_message_status(
        &self,
        _bearer: Bearer<'_>,
        id: &str,
        status: MessageStatus,
    ) -> Result<(), AppError> {
        let mut messages = self.messages.lock().unwrap();
        if let Some(message) = messages.iter_mut().find(|m| m.id == id) {
            message.status = status;
        }
        Ok(())
    }

    async fn put_object(
        &self,
        _bearer: Bearer<'_>,
        path: &str,
        _upload: &ImageUpload,
    ) -> Result<(), AppError> {
        self.objects.lock().unwrap().push(path.to_string());
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("mock://{}", path)
    }

    async fn list_objects(&self, _bearer: Bearer<'_>, prefix: &str) -> Result<Vec<StoredImage>, AppError> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.starts_with(prefix))
            .map(|p| StoredImage {
                name: p.rsplit('/').next().unwrap_or(p).to_string(),
                path: p.clone(),
                url: self.public_url(p),
                created_at: None,
            })
            .collect())
    }

    async fn sign_in(&self, email: &str, _password: &str) -> Result<AuthSession, AppError> {
        Ok(AuthSession {
            access_token: format!("token-{}", email),
            refresh_token: None,
            user: AuthUser {
                id: email.to_string(),
                email: Some(email.to_string()),
            },
        })
    }

    async fn sign_out(&self, _token: &str) -> Result<(), AppError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_user(&self, token: &str) -> Result<Option<AuthUser>, AppError> {
        Ok(token.strip_prefix("token-").map(|email| AuthUser {
            id: email.to_string(),
            email: Some(email.to_string()),
        }))
    }

    async fn is_admin(&self, _bearer: Bearer<'_>, user_id: &str) -> Result<bool, AppError> {
        self.admin_checks_started.fetch_add(1, Ordering::SeqCst);
        let delay = *self.admin_check_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.admin_checks_finished.fetch_add(1, Ordering::SeqCst);
        Ok(self.admins.lock().unwrap().iter().any(|a| a == user_id))
    }

    async fn clear_local_session(&self) -> Result<(), AppError> {
        self.local_clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
