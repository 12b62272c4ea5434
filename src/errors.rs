use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Course {0} not found")]
    CourseNotFound(i64),
    #[error("Invalid path: {0}")]
    InvalidPath(#[from] PathRejection),
    #[error("Course name must not be empty")]
    EmptyName,
    #[error("Unknown student ids: {0:?}")]
    UnknownStudents(Vec<i64>),
    #[error("A course cannot have more than {limit} students, got {requested}")]
    TooManyStudents { limit: usize, requested: usize },
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),
    #[error("Invalid query parameters: {0}")]
    InvalidQuery(#[from] QueryRejection),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::CourseNotFound(_) | AppError::InvalidPath(_) => StatusCode::NOT_FOUND,
            AppError::EmptyName
            | AppError::UnknownStudents(_)
            | AppError::TooManyStudents { .. }
            | AppError::InvalidBody(_)
            | AppError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Migration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_message = match &self {
            AppError::CourseNotFound(_) | AppError::InvalidPath(_) => "Not found",
            AppError::EmptyName => "Invalid name",
            AppError::UnknownStudents(_) => "Invalid students",
            AppError::TooManyStudents { .. } => "Too many students",
            AppError::InvalidBody(_) => "Invalid request body",
            AppError::InvalidQuery(_) => "Invalid query parameters",
            AppError::Database(_) => "Database error",
            AppError::Migration(_) => "Internal server error",
        };

        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": error_message,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}
