use crate::error::AppError;
use crate::services::failure;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder};
use common::responses::SuccessResponse;
use log::info;
use serde_json::Value;

pub(crate) async fn get_status(state: web::Data<AppState>) -> impl Responder {
    match state.store.form_status().await {
        Ok(status) => HttpResponse::Ok().json(status),
        Err(e) => failure("Error reading form status", e),
    }
}

/// `POST /update-form-status`. The body must carry a boolean `active`; any
/// other shape is a 400.
pub(crate) async fn update_status(
    state: web::Data<AppState>,
    payload: web::Json<Value>,
) -> impl Responder {
    match update_form_status(&state, &payload).await {
        Ok(active) => HttpResponse::Ok().json(SuccessResponse {
            success: true,
            message: format!("Form is now {}", if active { "active" } else { "inactive" }),
        }),
        Err(e) => failure("Error updating form status", e),
    }
}

async fn update_form_status(state: &AppState, body: &Value) -> Result<bool, AppError> {
    let active = body
        .get("active")
        .and_then(Value::as_bool)
        .ok_or_else(|| {
            AppError::Validation("Invalid status value. Expected a boolean.".to_string())
        })?;
    state.store.set_form_status(active).await?;
    info!("Form status set to active={}", active);
    Ok(active)
}
