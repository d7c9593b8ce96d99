use crate::state::AppState;
use actix_web::web::{self, get};
use actix_web::{HttpResponse, Responder};
use common::responses::HealthResponse;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", get().to(process));
}

/// Liveness probe. Also reports how many submissions are waiting and how the
/// last flush went.
async fn process(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        queue_length: state.flusher.queue().len(),
        last_flush: state.flusher.last_status().await,
    })
}
