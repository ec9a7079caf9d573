use application::ApplicationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        use application::ApplicationError as AppErr;
        use domain::{DeliveryError, PersistenceError};

        match error {
            AppErr::Persistence(PersistenceError::ChatNotFound(chat_id)) => ApiError::new(
                StatusCode::NOT_FOUND,
                "CHAT_NOT_FOUND",
                format!("chat {} not found", chat_id),
            ),
            AppErr::Persistence(PersistenceError::Storage(message)) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                format!("storage error: {}", message),
            ),
            AppErr::Delivery(DeliveryError::AlreadyBound { bound_to, .. }) => ApiError::new(
                StatusCode::CONFLICT,
                "ALREADY_BOUND",
                format!("connection already bound to user {}", bound_to),
            ),
            AppErr::Delivery(DeliveryError::MalformedEvent(message)) => {
                ApiError::bad_request(format!("malformed event: {}", message))
            }
            AppErr::Delivery(err) => {
                ApiError::internal_server_error(format!("delivery error: {}", err))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
