use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("duplicate value for a unique field")]
    Duplicate,
    #[error("store backend failure: {0}")]
    Backend(String),
    #[error("document codec failure: {0}")]
    Codec(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(error: mongodb::error::Error) -> Self {
        use mongodb::error::{ErrorKind, WriteFailure};

        match error.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(failure)) if failure.code == 11000 => {
                StoreError::Duplicate
            }
            _ => StoreError::Backend(error.to_string()),
        }
    }
}
impl From<mongodb::bson::ser::Error> for StoreError {
    fn from(error: mongodb::bson::ser::Error) -> Self {
        StoreError::Codec(error.to_string())
    }
}
impl From<mongodb::bson::de::Error> for StoreError {
    fn from(error: mongodb::bson::de::Error) -> Self {
        StoreError::Codec(error.to_string())
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("Not authorized, no valid token")]
    Unauthenticated,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Not authorized to modify this {0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn missing_fields(fields: &[&str]) -> Self {
        AppError::Validation(format!(
            "Please provide all required fields: {}",
            fields.join(", ")
        ))
    }
    pub fn invalid(field: &str, reason: impl std::fmt::Display) -> Self {
        AppError::Validation(format!("Invalid {field}: {reason}"))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) | AppError::Store(StoreError::Duplicate) => StatusCode::CONFLICT,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Store(StoreError::Duplicate) => "Record already exists".to_string(),
            AppError::Store(_) | AppError::Internal(_) => {
                error!(error = %self, "request failed");
                "Server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody { message })
    }
}
