//! # Remote CSV Repository
//!
//! Owns the one registration document on the drive. It is named
//! `event_registration.csv` and lives in the folder configured by the admin.
//!
//! Every mutation is a whole-document replace: download, rebuild, upload. The
//! upload is a single `update` call, so callers never observe a half-written
//! file, but nothing stops two server instances from overwriting each other.
//! The last write wins. A revision check on `update` would be the first thing
//! to add if the document ever needs stronger guarantees.

use super::codec;
use crate::error::AppError;
use crate::services::drive::{DriveBackend, DriveError, FileId};
use crate::services::settings::store::ConfigStore;
use common::model::csv::CsvRow;
use common::model::field::FieldDefinition;
use common::model::registration::RegistrationRecord;
use log::{debug, info};
use std::sync::Arc;

pub const DOCUMENT_NAME: &str = "event_registration.csv";

pub struct CsvRepository {
    drive: Arc<dyn DriveBackend>,
    store: Arc<ConfigStore>,
}

impl CsvRepository {
    pub fn new(drive: Arc<dyn DriveBackend>, store: Arc<ConfigStore>) -> Self {
        Self { drive, store }
    }

    /// Finds the document in the configured folder, creating it with a
    /// header-only body from the current schema when absent.
    pub async fn resolve_document(&self) -> Result<FileId, AppError> {
        let folder_id = self.store.folder_id().await?;
        if folder_id.is_empty() {
            return Err(AppError::Configuration(
                "Drive folder ID is not set".to_string(),
            ));
        }

        if let Some(file_id) = self.drive.find_file(DOCUMENT_NAME, &folder_id).await? {
            return Ok(file_id);
        }

        let fields = self.store.form_fields().await;
        self.create_fresh_document(&folder_id, &fields).await
    }

    /// Creates a new header-only document in `folder_id`, regardless of any
    /// document already there.
    pub async fn create_fresh_document(
        &self,
        folder_id: &str,
        fields: &[FieldDefinition],
    ) -> Result<FileId, AppError> {
        let body = codec::header_document(fields)?;
        let file_id = self
            .drive
            .create_file(DOCUMENT_NAME, folder_id, &body)
            .await?;
        info!("Created {} in drive folder {}", DOCUMENT_NAME, folder_id);
        Ok(file_id)
    }

    /// All stored rows, keyed by the document's own header.
    pub async fn read_all(&self) -> Result<Vec<CsvRow>, AppError> {
        let file_id = self.resolve_document().await?;
        self.read_rows(&file_id).await
    }

    pub async fn read_rows(&self, file_id: &str) -> Result<Vec<CsvRow>, AppError> {
        let content = self.drive.download(file_id).await?;
        Ok(codec::parse_rows(&content))
    }

    /// Replaces the document body. A single attempt; retrying is up to the
    /// caller.
    pub async fn write(&self, file_id: &str, content: &str) -> Result<(), DriveError> {
        self.drive.update(file_id, content).await
    }

    /// Rewrites document `file_id` as header + `existing` + `new` laid out by
    /// `fields`, in a single upload.
    pub async fn rewrite_with(
        &self,
        file_id: &str,
        existing: &[CsvRow],
        new: &[RegistrationRecord],
        fields: &[FieldDefinition],
    ) -> Result<(), AppError> {
        let content = codec::render(fields, existing, new)?;
        self.write(file_id, &content).await?;
        Ok(())
    }

    /// Drops every registration, leaving only the header for `fields`.
    pub async fn clear(&self, fields: &[FieldDefinition]) -> Result<(), AppError> {
        let file_id = self.resolve_document().await?;
        self.write(&file_id, &codec::header_document(fields)?)
            .await?;
        info!("Cleared {}", DOCUMENT_NAME);
        Ok(())
    }

    /// Re-lays the stored rows onto a new schema. Values are carried over
    /// through the codec's lookup chain. Columns with no match become empty,
    /// and data of removed fields is dropped. Returns whether the document
    /// changed.
    pub async fn migrate_schema(&self, fields: &[FieldDefinition]) -> Result<bool, AppError> {
        let file_id = self.resolve_document().await?;
        let current = self.drive.download(&file_id).await?;
        let rows = codec::parse_rows(&current);
        let migrated = codec::render(fields, &rows, &[])?;

        if digest(&current) == digest(&migrated) {
            debug!("Schema change leaves {} unchanged", DOCUMENT_NAME);
            return Ok(false);
        }

        self.write(&file_id, &migrated).await?;
        info!(
            "Migrated {} rows of {} to {} columns",
            rows.len(),
            DOCUMENT_NAME,
            fields.len() + 1
        );
        Ok(true)
    }
}

fn digest(content: &str) -> String {
    let mut context = md5::Context::new();
    context.consume(content.as_bytes());
    format!("{:x}", context.finalize())
}
