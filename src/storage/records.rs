//! Records shared with the admin side of the application.
//!
//! These are plain serde types; only their persisted shape matters here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    /// Subscription plan name, e.g. `free` or `pro`
    #[serde(default)]
    pub plan: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub signs_created: u32,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: String,
    pub user_id: String,
    pub action: String,
    #[serde(default)]
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

impl ActivityLog {
    pub fn now(user_id: &str, action: &str, details: &str) -> Self {
        let timestamp = Utc::now();
        Self {
            id: format!("log-{}", timestamp.timestamp_millis()),
            user_id: user_id.to_string(),
            action: action.to_string(),
            details: details.to_string(),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecuritySettings {
    pub session_timeout_minutes: u32,
    pub max_login_attempts: u32,
    pub require_strong_passwords: bool,
    pub two_factor_enabled: bool,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            session_timeout_minutes: 30,
            max_login_attempts: 5,
            require_strong_passwords: true,
            two_factor_enabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub email_notifications: bool,
    pub new_user_alerts: bool,
    pub document_request_alerts: bool,
    pub weekly_reports: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            new_user_alerts: true,
            document_request_alerts: true,
            weekly_reports: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_fill_missing_fields() {
        let s: SecuritySettings = serde_json::from_str(r#"{"maxLoginAttempts":3}"#).unwrap();
        assert_eq!(s.max_login_attempts, 3);
        assert_eq!(s.session_timeout_minutes, 30);
    }

    #[test]
    fn user_record_uses_camel_case() {
        let json = r#"{"id":"u1","name":"Ana","email":"ana@example.com","role":"admin",
            "createdAt":"2024-05-01T08:00:00Z","signsCreated":4}"#;
        let user: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, UserRole::Admin);
        assert_eq!(user.signs_created, 4);
        assert!(serde_json::to_string(&user).unwrap().contains("\"createdAt\""));
    }
}
