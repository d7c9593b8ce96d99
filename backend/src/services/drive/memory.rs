use super::{DriveBackend, DriveError, FileId};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct StoredFile {
    pub name: String,
    pub folder_id: String,
    pub content: String,
}

/// In-memory drive used by tests. Failures can be scripted per call kind.
#[derive(Default)]
pub struct MemoryDrive {
    pub files: Mutex<HashMap<FileId, StoredFile>>,
    pub update_failures: Mutex<VecDeque<DriveError>>,
    pub download_failures: Mutex<VecDeque<DriveError>>,
    pub update_calls: AtomicU64,
    pub download_calls: AtomicU64,
}

impl MemoryDrive {
    pub async fn fail_next_updates(&self, errors: impl IntoIterator<Item = DriveError>) {
        self.update_failures.lock().await.extend(errors);
    }

    pub async fn fail_next_download(&self, error: DriveError) {
        self.download_failures.lock().await.push_back(error);
    }

    /// Content of the single file named `name` in `folder_id`, if any.
    pub async fn content_of(&self, name: &str, folder_id: &str) -> Option<String> {
        self.files
            .lock()
            .await
            .values()
            .find(|f| f.name == name && f.folder_id == folder_id)
            .map(|f| f.content.clone())
    }

    pub async fn file_count(&self) -> usize {
        self.files.lock().await.len()
    }

    pub fn updates(&self) -> u64 {
        self.update_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DriveBackend for MemoryDrive {
    async fn find_file(&self, name: &str, folder_id: &str) -> Result<Option<FileId>, DriveError> {
        Ok(self
            .files
            .lock()
            .await
            .iter()
            .find(|(_, f)| f.name == name && f.folder_id == folder_id)
            .map(|(id, _)| id.clone()))
    }

    async fn create_file(
        &self,
        name: &str,
        folder_id: &str,
        content: &str,
    ) -> Result<FileId, DriveError> {
        let id = Uuid::new_v4().to_string();
        self.files.lock().await.insert(
            id.clone(),
            StoredFile {
                name: name.to_string(),
                folder_id: folder_id.to_string(),
                content: content.to_string(),
            },
        );
        Ok(id)
    }

    async fn download(&self, file_id: &str) -> Result<String, DriveError> {
        self.download_calls.fetch_add(1, Ordering::Relaxed);
        if let Some(err) = self.download_failures.lock().await.pop_front() {
            return Err(err);
        }
        self.files
            .lock()
            .await
            .get(file_id)
            .map(|f| f.content.clone())
            .ok_or_else(|| DriveError::Status {
                status: 404,
                message: format!("file {file_id} not found"),
            })
    }

    async fn update(&self, file_id: &str, content: &str) -> Result<(), DriveError> {
        self.update_calls.fetch_add(1, Ordering::Relaxed);
        if let Some(err) = self.update_failures.lock().await.pop_front() {
            return Err(err);
        }
        match self.files.lock().await.get_mut(file_id) {
            Some(file) => {
                file.content = content.to_string();
                Ok(())
            }
            None => Err(DriveError::Status {
                status: 404,
                message: format!("file {file_id} not found"),
            }),
        }
    }
}
