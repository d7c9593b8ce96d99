//! # Registration Endpoints
//!
//! - `POST /upload`: normalizes a submission against the current schema and
//!   queues it. The response only acknowledges the queueing. The record
//!   reaches the drive on a later flush.
//! - `GET /registrations`: every row of the remote document.
//! - `POST /clear-csv`: resets the remote document to its header.
//!
//! The CSV layout lives in `codec` and the drive document in `repository`.

mod clear;
pub mod codec;
mod list;
pub mod repository;
mod upload;

use actix_web::web::{self, get, post};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/upload", post().to(upload::process))
        .route("/registrations", get().to(list::process))
        .route("/clear-csv", post().to(clear::process));
}
