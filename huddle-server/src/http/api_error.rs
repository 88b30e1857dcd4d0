use crate::room::RoomError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use huddle_core::{ErrorCode, SignalError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Signal(#[from] SignalError),

    #[error(transparent)]
    Room(#[from] RoomError),
}

impl From<ErrorCode> for ApiError {
    fn from(code: ErrorCode) -> Self {
        Self::Signal(code.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::Signal(err) => {
                let status = match err.code {
                    ErrorCode::RoomNotFound => StatusCode::NOT_FOUND,
                    ErrorCode::WrongSecret | ErrorCode::NotAuthorized => StatusCode::FORBIDDEN,
                    ErrorCode::RoomLocked => StatusCode::LOCKED,
                    ErrorCode::RoomUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, err.code.as_str(), err.message.clone())
            }
            Self::Room(err @ RoomError::AlreadyExists(_)) => {
                (StatusCode::CONFLICT, "room-exists", err.to_string())
            }
        };

        (status, Json(json!({ "code": code, "message": message }))).into_response()
    }
}
