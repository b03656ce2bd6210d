use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::Form;
use axum::Json;

use super::ApiError;
use crate::domain::user::models::AccessToken;
use crate::domain::user::models::LoginCredentials;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

/// OAuth2 password grant: same as [`super::login::login`] with a form body.
pub async fn token(
    State(state): State<AppState>,
    payload: Result<Form<LoginCredentials>, FormRejection>,
) -> Result<Json<AccessToken>, ApiError> {
    let Form(credentials) = payload?;
    state
        .auth_service
        .authenticate(credentials)
        .await
        .map(Json)
        .map_err(ApiError::from)
}
