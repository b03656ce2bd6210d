use axum::extract::rejection::FormRejection;
use axum::extract::rejection::JsonRejection;
use axum::http::header;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::user::errors::FieldViolation;
use crate::user::errors::UserError;

pub mod current_user;
pub mod login;
pub mod register;
pub mod token;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest {
        message: String,
        details: Vec<FieldViolation>,
    },
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, Vec::new()),
            ApiError::BadRequest { message, details } => (StatusCode::BAD_REQUEST, message, details),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg, Vec::new()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, Vec::new()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, Vec::new()),
        };

        let mut response =
            (status, Json(ApiResponseBody::new_error(status, message, details))).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Validation(errors) => ApiError::BadRequest {
                message: "Validation failed".to_string(),
                details: errors.into_violations(),
            },
            UserError::AlreadyExists | UserError::ConstraintViolation(_) => {
                ApiError::Conflict(UserError::AlreadyExists.to_string())
            }
            UserError::InvalidCredentials | UserError::Unauthorized => {
                ApiError::Unauthorized(err.to_string())
            }
            UserError::InactiveUser => ApiError::Forbidden(err.to_string()),
            UserError::NotFound(_)
            | UserError::Password(_)
            | UserError::Token(_)
            | UserError::DatabaseError(_)
            | UserError::Unknown(_) => {
                tracing::error!(error = %err, "Request failed with internal error");
                ApiError::InternalServerError(INTERNAL_ERROR_MESSAGE.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "Rejected JSON body");
        ApiError::BadRequest {
            message: rejection.body_text(),
            details: Vec::new(),
        }
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        tracing::debug!(error = %rejection, "Rejected form body");
        ApiError::BadRequest {
            message: rejection.body_text(),
            details: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String, details: Vec<FieldViolation>) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message, details },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldViolation>,
}
