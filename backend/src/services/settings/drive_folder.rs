use crate::error::AppError;
use crate::services::failure;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder};
use common::requests::UpdateDriveFolderRequest;
use common::responses::{DriveFolder, MessageResponse};
use log::info;
use regex::Regex;
use std::sync::LazyLock;

static FOLDER_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid folder id pattern"));

pub(crate) async fn get_folder(state: web::Data<AppState>) -> impl Responder {
    match state.store.folder_id().await {
        Ok(folder_id) => HttpResponse::Ok().json(DriveFolder { folder_id }),
        Err(e) => failure("Error reading drive folder ID", e),
    }
}

/// `POST /update-drive-folder-id`.
///
/// Stores the new id. When it differs from the previous one and is not
/// empty, a fresh header-only document is created in the new folder so
/// registrations for the new folder start from an empty ledger.
pub(crate) async fn update_folder(
    state: web::Data<AppState>,
    payload: web::Json<UpdateDriveFolderRequest>,
) -> impl Responder {
    match update_drive_folder(&state, payload.into_inner()).await {
        Ok(true) => HttpResponse::Ok().json(MessageResponse::new(
            "Drive folder ID updated successfully with new empty CSV file",
        )),
        Ok(false) => {
            HttpResponse::Ok().json(MessageResponse::new("Drive folder ID updated successfully"))
        }
        Err(e) => failure("Error updating drive folder ID", e),
    }
}

/// Returns whether a new document was created.
async fn update_drive_folder(
    state: &AppState,
    req: UpdateDriveFolderRequest,
) -> Result<bool, AppError> {
    let folder_id = req
        .folder_id
        .map(|id| id.trim().to_string())
        .ok_or_else(|| AppError::Validation("folderId is required".to_string()))?;
    validate_folder_id(&folder_id)?;

    let current = state.store.folder_id().await.unwrap_or_default();
    state.store.set_folder_id(&folder_id).await?;
    info!("Drive folder ID set to {:?}", folder_id);

    if folder_id == current || folder_id.is_empty() {
        return Ok(false);
    }

    let fields = state.store.form_fields().await;
    state
        .repository
        .create_fresh_document(&folder_id, &fields)
        .await?;
    Ok(true)
}

/// Folder ids end up inside a drive search query, so only the characters
/// drive ids are made of are accepted.
fn validate_folder_id(folder_id: &str) -> Result<(), AppError> {
    if folder_id.is_empty() {
        return Ok(());
    }
    if FOLDER_ID.is_match(folder_id) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Invalid drive folder ID: {folder_id:?}"
        )))
    }
}
