use axum::Json;
use axum::extract::{FromRequest, rejection::JsonRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::api::ApiClientError;
use crate::booking::BookingError;

/// Error returned by the handlers. The body is `{"error": "..."}`, the same
/// shape the booking API uses, so the UI can show the reason as is.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Unprocessable(String),
    BadGateway(String),
    ServiceUnavailable(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({ "error": msg }))).into_response()
    }
}

impl From<ApiClientError> for ApiError {
    fn from(value: ApiClientError) -> Self {
        match value {
            ApiClientError::MissingApiKey => ApiError::ServiceUnavailable(value.to_string()),
            ApiClientError::Http(err) => {
                error!("HTTP error: {err}");
                ApiError::BadGateway(format!("Failed to reach booking API: {err}"))
            }
            ApiClientError::Status { status, message } => match status.as_u16() {
                404 => ApiError::NotFound(message),
                400 | 422 => ApiError::Unprocessable(message),
                _ => ApiError::BadGateway(message),
            },
            ApiClientError::Url(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(value: BookingError) -> Self {
        match value {
            BookingError::CourseNotFound(_) | BookingError::TutorNotFound(_) => {
                ApiError::NotFound(value.to_string())
            }
            BookingError::Invalid(msg) => ApiError::Unprocessable(msg),
        }
    }
}

/// `Json` extractor whose rejections use the same `{"error": ...}` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let msg = rejection.body_text();
        if rejection.status() == StatusCode::UNPROCESSABLE_ENTITY {
            ApiError::Unprocessable(msg)
        } else {
            ApiError::BadRequest(msg)
        }
    }
}
