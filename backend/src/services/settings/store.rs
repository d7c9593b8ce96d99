//! Local JSON settings documents.
//!
//! Each setting lives in its own small file under the data directory. Reads
//! of a missing file yield the setting's default. Writes replace the whole
//! file. Nothing is locked: two concurrent writers of the same file can lose
//! an update, which is acceptable for an admin-only settings store.

use crate::error::AppError;
use common::model::field::{default_fields, FieldDefinition};
use common::responses::{DriveFolder, FormStatus};
use log::{info, warn};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

pub const FORM_FIELDS_FILE: &str = "formFields.json";
pub const DRIVE_FOLDER_FILE: &str = "driveFolder.json";
pub const SETTINGS_FILE: &str = "config.json";
pub const FORM_STATUS_FILE: &str = "formStatus.json";

pub const EVENT_NAME: &str = "eventName";
pub const EVENT_DESCRIPTION: &str = "eventDescription";

pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates the data directory and seeds the schema and folder files so an
    /// operator can find and edit them before the first admin action.
    pub async fn init(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.dir).await?;
        if !self.path(FORM_FIELDS_FILE).exists() {
            info!("Seeding {} with the default schema", FORM_FIELDS_FILE);
            self.write_json(FORM_FIELDS_FILE, &default_fields()).await?;
        }
        if !self.path(DRIVE_FOLDER_FILE).exists() {
            self.write_json(DRIVE_FOLDER_FILE, &DriveFolder::default())
                .await?;
        }
        Ok(())
    }

    /// Current schema. A missing file yields the default schema; an unreadable
    /// one is an error.
    pub async fn read_form_fields(&self) -> Result<Vec<FieldDefinition>, AppError> {
        Ok(self
            .read_json(FORM_FIELDS_FILE)
            .await?
            .unwrap_or_else(default_fields))
    }

    /// Schema used for submissions and CSV layout. Never fails: a broken file
    /// is logged and the default schema is used instead.
    pub async fn form_fields(&self) -> Vec<FieldDefinition> {
        self.read_form_fields().await.unwrap_or_else(|e| {
            warn!("Error reading form fields, using defaults: {}", e);
            default_fields()
        })
    }

    pub async fn save_form_fields(&self, fields: &[FieldDefinition]) -> Result<(), AppError> {
        self.write_json(FORM_FIELDS_FILE, &fields).await
    }

    pub async fn folder_id(&self) -> Result<String, AppError> {
        Ok(self
            .read_json::<DriveFolder>(DRIVE_FOLDER_FILE)
            .await?
            .unwrap_or_default()
            .folder_id)
    }

    pub async fn set_folder_id(&self, folder_id: &str) -> Result<(), AppError> {
        self.write_json(
            DRIVE_FOLDER_FILE,
            &DriveFolder {
                folder_id: folder_id.to_string(),
            },
        )
        .await
    }

    /// Form status; a missing file is created with the default (active).
    pub async fn form_status(&self) -> Result<FormStatus, AppError> {
        match self.read_json(FORM_STATUS_FILE).await? {
            Some(status) => Ok(status),
            None => {
                let status = FormStatus::default();
                self.write_json(FORM_STATUS_FILE, &status).await?;
                Ok(status)
            }
        }
    }

    pub async fn set_form_status(&self, active: bool) -> Result<(), AppError> {
        self.write_json(FORM_STATUS_FILE, &FormStatus { active })
            .await
    }

    /// A string entry of the free-form settings map, `""` when unset.
    pub async fn setting(&self, name: &str) -> Result<String, AppError> {
        let settings = self.read_settings().await?;
        Ok(settings
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    /// Sets one entry of the settings map, keeping all other entries.
    pub async fn set_setting(&self, name: &str, value: &str) -> Result<(), AppError> {
        let mut settings = self.read_settings().await?;
        settings.insert(name.to_string(), Value::String(value.to_string()));
        self.write_json(SETTINGS_FILE, &settings).await
    }

    async fn read_settings(&self) -> Result<Map<String, Value>, AppError> {
        Ok(self.read_json(SETTINGS_FILE).await?.unwrap_or_default())
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    async fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>, AppError> {
        match fs::read(self.path(file)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_json<T>(&self, file: &str, value: &T) -> Result<(), AppError>
    where
        T: Serialize + ?Sized,
    {
        let bytes = serde_json::to_vec_pretty(value)?;
        fs::write(self.path(file), bytes).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::field::FieldType;
    use tempfile::TempDir;

    fn store() -> (TempDir, ConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        (dir, store)
    }

    #[actix_web::test]
    async fn missing_files_yield_defaults() {
        let (_dir, store) = store();
        assert_eq!(store.read_form_fields().await.unwrap(), default_fields());
        assert_eq!(store.folder_id().await.unwrap(), "");
        assert!(store.form_status().await.unwrap().active);
        assert_eq!(store.setting(EVENT_NAME).await.unwrap(), "");
    }

    #[actix_web::test]
    async fn init_seeds_schema_and_folder_files() {
        let (dir, store) = store();
        store.init().await.unwrap();
        assert!(dir.path().join(FORM_FIELDS_FILE).exists());
        assert!(dir.path().join(DRIVE_FOLDER_FILE).exists());
    }

    #[actix_web::test]
    async fn settings_keep_unrelated_entries() {
        let (_dir, store) = store();
        store.set_setting(EVENT_NAME, "RustConf").await.unwrap();
        store
            .set_setting(EVENT_DESCRIPTION, "Two days of talks")
            .await
            .unwrap();
        assert_eq!(store.setting(EVENT_NAME).await.unwrap(), "RustConf");
        assert_eq!(
            store.setting(EVENT_DESCRIPTION).await.unwrap(),
            "Two days of talks"
        );
    }

    #[actix_web::test]
    async fn persists_schema_status_and_folder() {
        let (_dir, store) = store();
        let fields = vec![FieldDefinition::new("Company", "company", FieldType::Text)];
        store.save_form_fields(&fields).await.unwrap();
        store.set_form_status(false).await.unwrap();
        store.set_folder_id("folder-1").await.unwrap();

        assert_eq!(store.form_fields().await, fields);
        assert!(!store.form_status().await.unwrap().active);
        assert_eq!(store.folder_id().await.unwrap(), "folder-1");
    }

    #[actix_web::test]
    async fn corrupt_schema_falls_back_for_submissions_only() {
        let (dir, store) = store();
        std::fs::write(dir.path().join(FORM_FIELDS_FILE), b"{not json").unwrap();
        assert!(store.read_form_fields().await.is_err());
        assert_eq!(store.form_fields().await, default_fields());
    }
}
