use serde::Deserialize;

#[derive(Deserialize)]
/// Body of `POST /update-event-name`.
pub struct UpdateEventNameRequest {
    #[serde(rename = "eventName")]
    pub event_name: Option<String>,
}

#[derive(Deserialize)]
/// Body of `POST /update-event-description`.
pub struct UpdateEventDescriptionRequest {
    #[serde(rename = "eventDescription")]
    pub event_description: Option<String>,
}

#[derive(Deserialize)]
/// Body of `POST /update-drive-folder-id`. An empty id unsets the folder.
pub struct UpdateDriveFolderRequest {
    #[serde(rename = "folderId")]
    pub folder_id: Option<String>,
}

#[derive(Deserialize)]
/// Body of `POST /admin/login`. Missing fields compare as empty strings.
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}
