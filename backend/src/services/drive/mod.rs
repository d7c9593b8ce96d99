//! # Cloud Drive Access
//!
//! The registration ledger lives in a single CSV file on a cloud drive. This
//! module narrows the drive's file API down to the four calls the rest of the
//! server needs, behind the `DriveBackend` trait:
//!
//! - `find_file`: look a file up by name inside a folder.
//! - `create_file`: create a file with an initial body.
//! - `download`: fetch the full body of a file.
//! - `update`: replace the full body of a file.
//!
//! `google::GoogleDriveBackend` implements the trait over the Drive v3 REST
//! API. Tests use `memory::MemoryDrive`.

pub mod google;
#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

/// Opaque identifier the drive assigns to a file.
pub type FileId = String;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriveError {
    #[error("drive request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("drive transport error: {0}")]
    Transport(String),
}

impl DriveError {
    /// Rate limiting (429), conflicts (409, 412) and server errors (5xx) are
    /// worth retrying. Everything else, transport failures included, is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            DriveError::Status { status, .. } => {
                matches!(status, 409 | 412 | 429) || *status >= 500
            }
            DriveError::Transport(_) => false,
        }
    }
}

#[async_trait]
pub trait DriveBackend: Send + Sync {
    async fn find_file(&self, name: &str, folder_id: &str) -> Result<Option<FileId>, DriveError>;

    async fn create_file(
        &self,
        name: &str,
        folder_id: &str,
        content: &str,
    ) -> Result<FileId, DriveError>;

    async fn download(&self, file_id: &str) -> Result<String, DriveError>;

    async fn update(&self, file_id: &str, content: &str) -> Result<(), DriveError>;
}
