use crate::services::failure;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder};
use common::responses::MessageResponse;

/// `POST /clear-csv`. Records still waiting in the queue are not affected
/// and will be written on the next flush.
pub(crate) async fn process(state: web::Data<AppState>) -> impl Responder {
    let fields = state.store.form_fields().await;
    let _guard = state.flusher.document_guard().await;
    match state.repository.clear(&fields).await {
        Ok(()) => HttpResponse::Ok().json(MessageResponse::new("CSV file cleared successfully")),
        Err(e) => failure("Error clearing CSV", e),
    }
}
