//! Contact form and inquiry status handling.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::gateway::{Bearer, Gateway};
use crate::models::{Message, MessageStatus};
use crate::store::ClientStore;

/// Public contact form fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub trip: String,
    pub month: String,
    pub message: String,
}

impl ContactForm {
    /// A new inquiry with a fresh id, stamped now.
    pub fn into_message(self) -> Message {
        Message {
            id: uuid::Uuid::new_v4().to_string(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            trip: self.trip.trim().to_string(),
            month: self.month.trim().to_string(),
            message: self.message.trim().to_string(),
            status: MessageStatus::New,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Submit the contact form.
pub async fn submit_contact(gateway: &Gateway, form: ContactForm) -> Result<Message, AppError> {
    let message = form.into_message();
    gateway.add_message(&message).await?;
    tracing::info!(id = %message.id, trip = %message.trip, "Inquiry received");
    Ok(message)
}

/// Flip an inquiry between new and resolved, based on its cached status.
pub async fn toggle_message_status(
    gateway: &Gateway,
    bearer: Bearer<'_>,
    store: &ClientStore,
    id: &str,
) -> Result<MessageStatus, AppError> {
    let message = store
        .find_message(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Message {} not found", id)))?;

    let status = message.status.toggled();
    gateway.update_message_status(bearer, id, status).await?;
    Ok(status)
}
