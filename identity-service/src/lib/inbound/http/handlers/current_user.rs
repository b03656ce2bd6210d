use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::UserProfile;
use crate::inbound::http::middleware::CurrentUser;

pub async fn current_user(
    Extension(CurrentUser(profile)): Extension<CurrentUser>,
) -> Result<ApiSuccess<UserProfile>, ApiError> {
    Ok(ApiSuccess::new(StatusCode::OK, profile))
}
