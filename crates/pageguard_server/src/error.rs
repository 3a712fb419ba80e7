//! HTTP error mapping for API handlers.

use crate::AppError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Wrapper that turns [`AppError`] into an HTTP response.
#[derive(Debug)]
pub struct HttpError(pub AppError);

impl From<AppError> for HttpError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl HttpError {
    /// Status code for the wrapped error.
    ///
    /// Storage failures surface as `503 Service Unavailable`.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            err if err.is_storage() => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match &self.0 {
            err if err.is_storage() => "Storage unavailable".to_string(),
            AppError::RandomnessUnavailable(_) => "Secure random source unavailable".to_string(),
            err => err.to_string(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        let body = Json(json!({ "error": self.public_message() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::HttpError;
    use crate::AppError;
    use axum::http::StatusCode;

    #[test]
    fn status_mapping_matrix() {
        let cases = [
            (AppError::NotFound, StatusCode::NOT_FOUND),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (
                AppError::StorageMessage("disk".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::RandomnessUnavailable("rng".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            let label = err.to_string();
            assert_eq!(HttpError::from(err).status(), expected, "error: {}", label);
        }
    }

    #[test]
    fn storage_details_are_not_exposed() {
        let err = HttpError::from(AppError::StorageMessage("/var/lib/secret/path".into()));
        assert_eq!(err.public_message(), "Storage unavailable");
    }
}
