//! Authentication session models.

use serde::{Deserialize, Serialize};

/// The user behind an authenticated session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl AuthUser {
    /// Short name shown in the dashboard header.
    pub fn label(&self) -> String {
        match &self.email {
            Some(email) => email.split('@').next().unwrap_or(email).to_string(),
            None => self.id.clone(),
        }
    }
}

/// A signed-in session as returned by the auth backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub user: AuthUser,
}

/// Local-only credential record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

/// Local-only session record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalSession {
    pub username: String,
    pub created_at: String,
    pub token: String,
}

/// Request body for the login form.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Visible session state reported to the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_uses_email_local_part() {
        let user = AuthUser {
            id: "u-1".to_string(),
            email: Some("ops@zentura.in".to_string()),
        };
        assert_eq!(user.label(), "ops");

        let anonymous = AuthUser {
            id: "u-2".to_string(),
            email: None,
        };
        assert_eq!(anonymous.label(), "u-2");
    }
}
