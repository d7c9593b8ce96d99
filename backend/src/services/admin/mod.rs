//! # Admin Endpoints
//!
//! - `POST /admin/login`: compares the submitted credentials with the
//!   configured ones and echoes a success flag. No session or token is
//!   issued; the dashboard keeps its own logged-in flag.
//! - `GET /admins`: returns the configured credentials. Diagnostic only.
//!
//! Credentials are compared as plain strings with no hashing or rate limiting.
//! That is a known security gap of this service, not a pattern to copy.

mod credentials;
mod login;

use actix_web::web::{self, get, post};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/admin/login", post().to(login::process))
        .route("/admins", get().to(credentials::process));
}
