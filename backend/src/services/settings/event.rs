use crate::error::AppError;
use crate::services::failure;
use crate::services::settings::store::{EVENT_DESCRIPTION, EVENT_NAME};
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder};
use common::requests::{UpdateEventDescriptionRequest, UpdateEventNameRequest};
use common::responses::{EventDescriptionResponse, EventNameResponse, SuccessResponse};
use log::info;

pub(crate) async fn get_name(state: web::Data<AppState>) -> impl Responder {
    match state.store.setting(EVENT_NAME).await {
        Ok(event_name) => HttpResponse::Ok().json(EventNameResponse { event_name }),
        Err(e) => failure("Error fetching event name", e),
    }
}

pub(crate) async fn get_description(state: web::Data<AppState>) -> impl Responder {
    match state.store.setting(EVENT_DESCRIPTION).await {
        Ok(event_description) => {
            HttpResponse::Ok().json(EventDescriptionResponse { event_description })
        }
        Err(e) => failure("Error fetching event description", e),
    }
}

/// `POST /update-event-name`. A missing or empty name is rejected.
pub(crate) async fn update_name(
    state: web::Data<AppState>,
    payload: web::Json<UpdateEventNameRequest>,
) -> impl Responder {
    let result = match payload.into_inner().event_name.filter(|n| !n.is_empty()) {
        Some(name) => save(&state, EVENT_NAME, &name).await,
        None => Err(AppError::Validation("Event name is required".to_string())),
    };
    match result {
        Ok(()) => updated("Event name updated successfully"),
        Err(e) => failure("Error updating event name", e),
    }
}

/// `POST /update-event-description`. The description may be empty but must
/// be present.
pub(crate) async fn update_description(
    state: web::Data<AppState>,
    payload: web::Json<UpdateEventDescriptionRequest>,
) -> impl Responder {
    let result = match payload.into_inner().event_description {
        Some(description) => save(&state, EVENT_DESCRIPTION, &description).await,
        None => Err(AppError::Validation(
            "Event description is required".to_string(),
        )),
    };
    match result {
        Ok(()) => updated("Event description updated successfully"),
        Err(e) => failure("Error updating event description", e),
    }
}

async fn save(state: &AppState, name: &str, value: &str) -> Result<(), AppError> {
    state.store.set_setting(name, value).await?;
    info!("Updated setting {}", name);
    Ok(())
}

fn updated(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(SuccessResponse {
        success: true,
        message: message.to_string(),
    })
}
