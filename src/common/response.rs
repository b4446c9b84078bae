use crate::modules::spot::error::KeyError;
use crate::workers::transcoder::TranscodeError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T, message: &str) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            status: "error".to_string(),
            message: message.to_string(),
            data: None,
        }
    }
}

pub struct ApiSuccess<T>(pub T, pub StatusCode);

impl<T> IntoResponse for ApiSuccess<ApiResponse<T>>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        let (response, status) = (self.0, self.1);
        (status, Json(response)).into_response()
    }
}

#[derive(Debug)]
pub struct ApiError(pub String, pub StatusCode);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (message, status) = (self.0, self.1);
        let response = ApiResponse::<()>::error(&message);
        (status, Json(response)).into_response()
    }
}

impl From<TranscodeError> for ApiError {
    fn from(err: TranscodeError) -> Self {
        let status = match &err {
            TranscodeError::InvalidRecordingId(_) => StatusCode::BAD_REQUEST,
            TranscodeError::NotFound(_) => StatusCode::NOT_FOUND,
            TranscodeError::QueueClosed => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError(err.to_string(), status)
    }
}

impl From<KeyError> for ApiError {
    fn from(err: KeyError) -> Self {
        let status = match &err {
            KeyError::InvalidRecordingId
            | KeyError::DurationTooLong { .. }
            | KeyError::MissingKey => StatusCode::BAD_REQUEST,
            KeyError::NotFound | KeyError::UserNotFound => StatusCode::NOT_FOUND,
            KeyError::Expired | KeyError::WrongRecording(_) => StatusCode::FORBIDDEN,
            KeyError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError(err.to_string(), status)
    }
}
