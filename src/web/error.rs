use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::db::models::PageWindowError;
use crate::db::services::ServiceError;

pub const COMPANY_NOT_FOUND: &str = "회사를 찾을 수 없습니다.";
pub const COMPANY_NAME_NOT_FOUND: &str = "Company not found";
pub const TAG_NOT_FOUND: &str = "태그를 찾을 수 없습니다.";
pub const DUPLICATE_COMPANY_TAG: &str = "이미 회사에 등록된 태그입니다.";
pub const DUPLICATE_TAG_NUMBER: &str = "이미 존재하는 태그 번호입니다.";
pub const AMBIGUOUS_COMPANY_NAME: &str = "같은 이름의 회사가 여러 개 존재합니다.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::DatabaseError(msg) => {
                error!(error = %msg, "Request failed with a database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::CompanyNotFound => AppError::NotFound(COMPANY_NOT_FOUND.to_string()),
            ServiceError::TagNotFound => AppError::NotFound(TAG_NOT_FOUND.to_string()),
            ServiceError::AmbiguousCompanyName { .. } => {
                AppError::InvalidInput(AMBIGUOUS_COMPANY_NAME.to_string())
            }
            ServiceError::DuplicateCompanyTag { .. } => {
                AppError::InvalidInput(DUPLICATE_COMPANY_TAG.to_string())
            }
            ServiceError::DuplicateTagNumber(_) => {
                AppError::InvalidInput(DUPLICATE_TAG_NUMBER.to_string())
            }
            ServiceError::InvalidTagToken(token_err) => AppError::Validation(token_err.to_string()),
            ServiceError::Database(db_err) => AppError::DatabaseError(db_err.to_string()),
        }
    }
}

impl From<PageWindowError> for AppError {
    fn from(err: PageWindowError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}
