use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::user::models::UserProfile;
use crate::domain::user::ports::AuthGatePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Extension holding the active user that presented the request's bearer token
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserProfile);

/// Middleware that admits only requests carrying a valid token of an active user
pub async fn require_active_user(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let profile = state
        .auth_gate
        .current_active_user(bearer_token(req.headers()))
        .await?;

    req.extensions_mut().insert(CurrentUser(profile));

    Ok(next.run(req).await)
}

/// A missing or malformed `Authorization` header counts as no credentials.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    scheme.eq_ignore_ascii_case("bearer").then_some(token.trim())
}
