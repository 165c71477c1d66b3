use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// 调用方重试是否可能成功（仅存储层故障）
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::StoreUnavailable(_))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => AppError::DuplicateEntry(msg),
            StoreError::Unavailable(_) | StoreError::Timeout(_) => {
                AppError::StoreUnavailable(err.to_string())
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateEntry(_) => StatusCode::CONFLICT,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::ConfigError(_) | AppError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, message) = match self {
            AppError::InvalidInput(msg) => {
                log::warn!("Invalid input: {msg}");
                ("INVALID_INPUT", msg.clone())
            }
            AppError::DuplicateEntry(msg) => {
                log::warn!("Duplicate entry: {msg}");
                ("DUPLICATE_ENTRY", msg.clone())
            }
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone()),
            AppError::Forbidden => {
                log::warn!("Forbidden access");
                ("FORBIDDEN", "Forbidden".to_string())
            }
            AppError::StoreUnavailable(msg) => {
                log::error!("Store unavailable: {msg}");
                (
                    "STORE_UNAVAILABLE",
                    "Service temporarily unavailable, please retry".to_string(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                ("UNKNOWN", "Internal server error".to_string())
            }
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message,
                "retryable": self.is_retryable()
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use std::time::Duration;

    #[test]
    fn store_errors_map_to_taxonomy() {
        let conflict: AppError = StoreError::Conflict("0912345678 2025-02-01".into()).into();
        assert!(matches!(conflict, AppError::DuplicateEntry(_)));

        let timeout: AppError = StoreError::Timeout(Duration::from_millis(10)).into();
        assert!(matches!(timeout, AppError::StoreUnavailable(_)));
        assert!(timeout.is_retryable());
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            AppError::InvalidInput("phone".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::DuplicateEntry("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::StoreUnavailable("down".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert!(!AppError::DuplicateEntry("x".into()).is_retryable());
    }
}
