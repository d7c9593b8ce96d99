use crate::error::AppError;
use crate::services::failure;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder};
use common::requests::LoginRequest;
use common::responses::{AdminCredentials, LoginResponse};
use log::info;

/// `POST /admin/login`.
///
/// - `200` with `success: true` and the admin username on a match.
/// - `401` with `success: false` on any mismatch.
/// - `500` when no admin credentials are configured.
pub(crate) async fn process(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> impl Responder {
    let Some(admin) = &state.admin else {
        return failure(
            "Admin login attempted without configured credentials",
            AppError::Configuration("Admin configuration error".to_string()),
        );
    };

    info!("Admin login attempt: {}", payload.username);
    if credentials_match(admin, &payload) {
        HttpResponse::Ok().json(LoginResponse {
            success: true,
            message: "Login successful".to_string(),
            username: Some(admin.username.clone()),
        })
    } else {
        info!("Rejected admin login for {}", payload.username);
        HttpResponse::Unauthorized().json(LoginResponse {
            success: false,
            message: "Invalid credentials".to_string(),
            username: None,
        })
    }
}

fn credentials_match(admin: &AdminCredentials, attempt: &LoginRequest) -> bool {
    attempt.username == admin.username && attempt.password == admin.password
}
