//! Contact inquiry model.

use serde::{Deserialize, Serialize};

/// Handling state of an inquiry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    #[default]
    New,
    Resolved,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::New => "new",
            MessageStatus::Resolved => "resolved",
        }
    }

    /// The other state; applying it twice is the identity.
    pub fn toggled(self) -> Self {
        match self {
            MessageStatus::New => MessageStatus::Resolved,
            MessageStatus::Resolved => MessageStatus::New,
        }
    }
}

/// An inquiry submitted through the public contact form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub trip: String,
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: MessageStatus,
    pub created_at: String,
}

/// Row shape of the hosted `messages` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub trip: Option<String>,
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: MessageStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            name: row.name,
            email: row.email.unwrap_or_default(),
            phone: row.phone.unwrap_or_default(),
            trip: row.trip.unwrap_or_default(),
            month: row.month.unwrap_or_default(),
            message: row.message.unwrap_or_default(),
            status: row.status,
            created_at: row.created_at.unwrap_or_default(),
        }
    }
}

impl From<&Message> for MessageRow {
    fn from(message: &Message) -> Self {
        MessageRow {
            id: message.id.clone(),
            name: message.name.clone(),
            email: Some(message.email.clone()),
            phone: Some(message.phone.clone()),
            trip: Some(message.trip.clone()),
            month: Some(message.month.clone()),
            message: Some(message.message.clone()),
            status: message.status,
            created_at: Some(message.created_at.clone()),
        }
    }
}

/// Request body for flipping an inquiry's status.
#[derive(Debug, Clone, Deserialize)]
pub struct ToggleStatusRequest {
    pub status: MessageStatus,
}
