use axum::{
    extract::multipart::MultipartRejection,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::services::password::PasswordError;
use crate::services::storage::StorageError;
use crate::services::token::TokenError;

#[derive(Debug)]
pub enum AppError {
    DatabaseError(sea_orm::DbErr),
    NotFound(String),
    Unauthorized(String),
    BadRequest(String),
    InternalServerError(String),
    Conflict(String),
    /// An extractor refused the request (bad JSON, wrong content type, bad path).
    Rejected(StatusCode, String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Rejected(status, _) => *status,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::DatabaseError(e) => write!(f, "database error: {}", e),
            AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::InternalServerError(msg)
            | AppError::Conflict(msg)
            | AppError::Rejected(_, msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            AppError::DatabaseError(e) => {
                tracing::error!("Database error: {}", e);
                "Internal server error".to_string()
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                "Internal server error".to_string()
            }
            AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::Conflict(msg)
            | AppError::Rejected(_, msg) => msg,
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::DatabaseError(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid(_) => AppError::Unauthorized("Invalid or expired token".to_string()),
            TokenError::Encode(e) => AppError::InternalServerError(format!("Failed to sign token: {}", e)),
        }
    }
}
