use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use ws_activity::ActivityError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure of an HTTP handler, rendered as `{ "error": message }`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request itself is malformed; nothing was recorded.
    #[error("{0}")]
    BadRequest(String),

    /// The activity store could not apply the request.
    #[error(transparent)]
    Activity(#[from] ActivityError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Activity(ActivityError::InvalidAttribute { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Activity(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
