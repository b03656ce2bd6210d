use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use super::ApiError;
use crate::domain::user::models::AccessToken;
use crate::domain::user::models::LoginCredentials;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

/// Exchange a username (or email) and password for a bearer token.
///
/// The body is the bare token object rather than the usual envelope, so
/// standard OAuth2 clients can read `access_token` directly.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginCredentials>, JsonRejection>,
) -> Result<Json<AccessToken>, ApiError> {
    let Json(credentials) = payload?;
    state
        .auth_service
        .authenticate(credentials)
        .await
        .map(Json)
        .map_err(ApiError::from)
}
