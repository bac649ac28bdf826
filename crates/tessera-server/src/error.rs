use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tessera_core::TesseraError;
use tracing::error;

/// Handler error: a [`TesseraError`] rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub TesseraError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            TesseraError::SkillNotFound(_) | TesseraError::HelperFileNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            TesseraError::SkillExists { .. } | TesseraError::HelperFileExists { .. } => {
                StatusCode::CONFLICT
            }
            TesseraError::ProtectedSkill(_) => StatusCode::FORBIDDEN,
            TesseraError::InvalidSkillName(_)
            | TesseraError::InvalidHelperFile(_)
            | TesseraError::UnknownRole(_)
            | TesseraError::NotASkillDirectory(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TesseraError> for ApiError {
    fn from(e: TesseraError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
