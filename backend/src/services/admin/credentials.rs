use crate::error::AppError;
use crate::services::failure;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder};
use log::debug;

pub(crate) async fn process(state: web::Data<AppState>) -> impl Responder {
    debug!("Received request for admin credentials");
    match &state.admin {
        Some(admin) => HttpResponse::Ok().json(admin),
        None => failure(
            "Admin credentials not configured",
            AppError::Configuration("Admin configuration error".to_string()),
        ),
    }
}
