pub mod admin;
pub mod drive;
pub mod health;
pub mod registrations;
pub mod settings;

use crate::error::AppError;
use actix_cors::Cors;
use actix_web::{web, HttpResponse, ResponseError};
use log::{error, warn};

/// Registers every endpoint at the root of the application.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .configure(settings::configure_routes)
        .configure(registrations::configure_routes)
        .configure(admin::configure_routes)
        .configure(health::configure_routes);
}

/// Cross-origin policy for the browser client, which is served from another
/// origin. Any origin, method and header is allowed and no credentials are
/// involved, so the wildcard origin is sent back.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allow_any_method()
        .allow_any_header()
}

/// JSON extractor settings: 1 MB bodies, and malformed payloads answered with
/// the same `{ "error": ... }` body as every other failure.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(1024 * 1024)
        .error_handler(|err, _req| {
            AppError::Validation(format!("Invalid request body: {}", err)).into()
        })
}

/// Logs a handler failure and turns it into its JSON error response.
pub(crate) fn failure(context: &str, e: AppError) -> HttpResponse {
    if e.status_code().is_client_error() {
        warn!("{}: {}", context, e);
    } else {
        error!("{}: {}", context, e);
    }
    e.error_response()
}
