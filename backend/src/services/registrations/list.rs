use crate::services::failure;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder};

/// `GET /registrations`: the full remote dataset, one object per row.
pub(crate) async fn process(state: web::Data<AppState>) -> impl Responder {
    match state.repository.read_all().await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => failure("Error reading registrations from Drive", e),
    }
}
