use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::LotteryError;

/// API error type with HTTP status code and message
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// Creates a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Creates a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 401 Unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Creates a 403 Forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// Creates a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Creates a 409 Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Creates a 500 Internal Server Error
    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.message, "request failed");
        }

        let body = Json(json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<LotteryError> for ApiError {
    fn from(err: LotteryError) -> Self {
        let message = err.to_string();
        match err {
            LotteryError::NotFound(_) => Self::not_found(message),
            LotteryError::Validation(_) => Self::bad_request(message),
            LotteryError::DuplicateParticipant(_)
            | LotteryError::InvalidStatusTransition { .. }
            | LotteryError::InvalidState(_)
            | LotteryError::Conflict(_) => Self::conflict(message),
            LotteryError::RegistrationClosed => Self::forbidden(message),
            LotteryError::Unauthorized => Self::unauthorized(message),
            LotteryError::Storage(_) => Self::internal_server_error(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::room::RoomStatus;

    #[test]
    fn domain_errors_map_to_status_codes() {
        let cases = [
            (LotteryError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (LotteryError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (LotteryError::DuplicateParticipant("x".into()), StatusCode::CONFLICT),
            (LotteryError::RegistrationClosed, StatusCode::FORBIDDEN),
            (
                LotteryError::InvalidStatusTransition {
                    from: RoomStatus::Finished,
                    to: RoomStatus::Waiting,
                },
                StatusCode::CONFLICT,
            ),
            (LotteryError::InvalidState("x".into()), StatusCode::CONFLICT),
            (LotteryError::Conflict("x".into()), StatusCode::CONFLICT),
            (LotteryError::Unauthorized, StatusCode::UNAUTHORIZED),
            (LotteryError::Storage("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn message_is_the_domain_message() {
        let err = ApiError::from(LotteryError::room_not_found("abc"));
        assert_eq!(err.message, "Room not found: abc");
    }
}
