use crate::jobs::FlushStatus;
use serde::{Deserialize, Serialize};

/// `{ "active": bool }`. Also the on-disk shape of `formStatus.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormStatus {
    pub active: bool,
}

impl Default for FormStatus {
    fn default() -> Self {
        Self { active: true }
    }
}

/// `{ "folderId": "..." }`. Also the on-disk shape of `driveFolder.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveFolder {
    #[serde(rename = "folderId", default)]
    pub folder_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventNameResponse {
    #[serde(rename = "eventName")]
    pub event_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventDescriptionResponse {
    #[serde(rename = "eventDescription")]
    pub event_description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Admin credentials as exposed by the diagnostic `GET /admins` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(rename = "queueLength")]
    pub queue_length: usize,
    #[serde(rename = "lastFlush")]
    pub last_flush: FlushStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
