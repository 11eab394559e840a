use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use service::ServiceError;
use thiserror::Error;
use tracing::error;

/// Request outcome for failed handlers, rendered as a plain-text body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Service(ServiceError::NotFound(_)) => (StatusCode::NOT_FOUND, "Poll not found".into()),
            ApiError::Service(ServiceError::InvalidInput(msg)) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Service(ServiceError::InvalidOption(_)) => {
                (StatusCode::BAD_REQUEST, "Invalid vote option".into())
            }
            ApiError::Service(e @ (ServiceError::StoreRead(_) | ServiceError::StoreWrite(_))) => {
                error!(error = %e, "poll store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.status_and_message().into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_service_errors_to_status() {
        let cases = [
            (ApiError::from(ServiceError::NotFound(1)), StatusCode::NOT_FOUND),
            (ApiError::from(ServiceError::InvalidInput("x".into())), StatusCode::BAD_REQUEST),
            (ApiError::from(ServiceError::InvalidOption(9)), StatusCode::BAD_REQUEST),
            (ApiError::from(ServiceError::StoreRead("x".into())), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::from(ServiceError::StoreWrite("x".into())), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::BadRequest("missing".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn store_failures_hide_details() {
        let (_, msg) = ApiError::from(ServiceError::StoreWrite("disk full".into())).status_and_message();
        assert_eq!(msg, "Internal server error");
    }
}
