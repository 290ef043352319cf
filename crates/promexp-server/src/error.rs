//! HTTP mapping for `ExporterError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use promexp_core::ExporterError;

/// Response wrapper so handlers can return `Result<_, HttpError>` and use `?`.
#[derive(Debug)]
pub struct HttpError(pub ExporterError);

impl From<ExporterError> for HttpError {
    fn from(e: ExporterError) -> Self {
        Self(e)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = if self.0.is_caller_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = Json(json!({
            "error": self.0.code().as_str(),
            "message": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}
