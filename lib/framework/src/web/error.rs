use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;

use crate::exception::Exception;
use crate::exception::error_code;
use crate::json;
use crate::log;

pub type HttpResult<T> = Result<T, HttpError>;

pub struct HttpError {
    pub status: StatusCode,
    pub exception: Exception,
}

#[derive(Serialize, Debug)]
struct ErrorResponse {
    error_code: Option<String>,
    message: String,
}

impl From<Exception> for HttpError {
    fn from(exception: Exception) -> Self {
        let status = match exception.code.as_deref() {
            Some(error_code::BAD_REQUEST | error_code::VALIDATION_ERROR) => StatusCode::BAD_REQUEST,
            Some(error_code::FORBIDDEN) => StatusCode::FORBIDDEN,
            Some(error_code::NOT_FOUND) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        HttpError { status, exception }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        log::log_exception(&self.exception);
        let body = ErrorResponse {
            error_code: self.exception.code,
            message: self.exception.message,
        };
        if let Ok(json) = json::to_json(&body) {
            (
                self.status,
                [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                json,
            )
                .into_response()
        } else {
            self.status.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::HttpError;

    #[test]
    fn status_from_error_code() {
        let error = HttpError::from(validation_error!(message = "levelname is required"));
        assert!(matches!(error.status, StatusCode::BAD_REQUEST), "status={}", error.status);

        let error = HttpError::from(store_error!(message = "insert failed"));
        assert!(
            matches!(error.status, StatusCode::INTERNAL_SERVER_ERROR),
            "status={}",
            error.status
        );
    }
}
