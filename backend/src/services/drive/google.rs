use super::{DriveBackend, DriveError, FileId};
use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

const CSV_MIME: &str = "text/csv";

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileEntry>,
}

#[derive(Deserialize)]
struct FileEntry {
    id: String,
}

/// `DriveBackend` over the Google Drive v3 REST API.
///
/// Requests are authorized with a bearer token handed in at construction.
/// Obtaining and refreshing that token is the job of whoever deploys the
/// server.
pub struct GoogleDriveBackend {
    client: Client,
    api_base: String,
    access_token: String,
}

impl GoogleDriveBackend {
    pub fn new(api_base: &str, access_token: &str) -> Result<Self, DriveError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        })
    }

    fn files_url(&self) -> String {
        format!("{}/drive/v3/files", self.api_base)
    }

    fn multipart_url(&self) -> String {
        format!("{}/upload/drive/v3/files?uploadType=multipart", self.api_base)
    }

    fn media_url(&self, file_id: &str) -> String {
        format!(
            "{}/upload/drive/v3/files/{}?uploadType=media",
            self.api_base, file_id
        )
    }
}

impl From<reqwest::Error> for DriveError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => DriveError::Status {
                status: status.as_u16(),
                message: e.to_string(),
            },
            None => DriveError::Transport(e.to_string()),
        }
    }
}

/// Turns a non-2xx response into `DriveError::Status`, keeping the body as the
/// message since the Drive API explains failures there.
async fn ensure_success(response: Response) -> Result<Response, DriveError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(DriveError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Body of a `multipart/related` upload: the JSON metadata part, then the
/// CSV content part.
fn multipart_related_body(boundary: &str, metadata: &serde_json::Value, content: &str) -> String {
    format!(
        "--{boundary}\r\n\
         Content-Type: application/json; charset=UTF-8\r\n\r\n\
         {metadata}\r\n\
         --{boundary}\r\n\
         Content-Type: {CSV_MIME}\r\n\r\n\
         {content}\r\n\
         --{boundary}--\r\n"
    )
}

fn quote_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[async_trait]
impl DriveBackend for GoogleDriveBackend {
    async fn find_file(&self, name: &str, folder_id: &str) -> Result<Option<FileId>, DriveError> {
        let query = format!(
            "name='{}' and '{}' in parents and trashed=false",
            quote_query_literal(name),
            quote_query_literal(folder_id)
        );
        let response = self
            .client
            .get(self.files_url())
            .bearer_auth(&self.access_token)
            .query(&[("q", query.as_str()), ("fields", "files(id, name)")])
            .send()
            .await?;
        let list: FileList = ensure_success(response).await?.json().await?;
        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    /// Creates the file with its metadata and body in one multipart request,
    /// so a failed upload never leaves an empty file behind.
    async fn create_file(
        &self,
        name: &str,
        folder_id: &str,
        content: &str,
    ) -> Result<FileId, DriveError> {
        let metadata = serde_json::json!({
            "name": name,
            "parents": [folder_id],
            "mimeType": CSV_MIME,
        });
        let boundary = format!("csv-{}", Uuid::new_v4().simple());
        let response = self
            .client
            .post(self.multipart_url())
            .bearer_auth(&self.access_token)
            .query(&[("fields", "id")])
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(multipart_related_body(&boundary, &metadata, content))
            .send()
            .await?;
        let created: FileEntry = ensure_success(response).await?.json().await?;
        debug!("Created drive file {} in folder {}", created.id, folder_id);
        Ok(created.id)
    }

    async fn download(&self, file_id: &str) -> Result<String, DriveError> {
        let response = self
            .client
            .get(format!("{}/{}", self.files_url(), file_id))
            .bearer_auth(&self.access_token)
            .query(&[("alt", "media")])
            .send()
            .await?;
        Ok(ensure_success(response).await?.text().await?)
    }

    async fn update(&self, file_id: &str, content: &str) -> Result<(), DriveError> {
        let response = self
            .client
            .patch(self.media_url(file_id))
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, CSV_MIME)
            .body(content.to_string())
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}
