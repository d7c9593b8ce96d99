//! # Settings Endpoints
//!
//! Admin-managed configuration, persisted by `store::ConfigStore`:
//!
//! - `GET /form-status`, `POST /update-form-status`: whether the public form
//!   accepts registrations.
//! - `GET /event-name`, `POST /update-event-name`,
//!   `GET /event-description`, `POST /update-event-description`: free-form
//!   event texts.
//! - `GET /drive-folder-id`, `POST /update-drive-folder-id`: the drive folder
//!   holding the registration document. Switching folders starts a fresh
//!   header-only document in the new folder.
//! - `GET /form-fields`, `POST /update-form-fields`: the form schema. Saving a
//!   schema migrates the remote document to the new columns.

mod drive_folder;
mod event;
mod form_fields;
mod form_status;
pub mod store;

use actix_web::web::{self, get, post};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/form-status", get().to(form_status::get_status))
        .route("/update-form-status", post().to(form_status::update_status))
        .route("/event-name", get().to(event::get_name))
        .route("/update-event-name", post().to(event::update_name))
        .route("/event-description", get().to(event::get_description))
        .route("/update-event-description", post().to(event::update_description))
        .route("/drive-folder-id", get().to(drive_folder::get_folder))
        .route("/update-drive-folder-id", post().to(drive_folder::update_folder))
        .route("/form-fields", get().to(form_fields::get_fields))
        .route("/update-form-fields", post().to(form_fields::update_fields));
}
