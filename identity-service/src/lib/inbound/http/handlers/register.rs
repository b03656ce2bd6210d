use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::RegistrationForm;
use crate::domain::user::models::UserProfile;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationForm>, JsonRejection>,
) -> Result<ApiSuccess<UserProfile>, ApiError> {
    let Json(form) = payload?;
    state
        .auth_service
        .register(form)
        .await
        .map_err(ApiError::from)
        .map(|profile| ApiSuccess::new(StatusCode::CREATED, profile))
}
