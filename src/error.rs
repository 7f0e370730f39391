use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

use crate::routes::NotFoundTemplate;

/// Failures of the entry and credential services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("an entry with slug '{0}' already exists")]
    DuplicateSlug(String),

    #[error("an account for '{0}' already exists")]
    DuplicateIdentity(String),

    #[error("email or password does not match")]
    AuthenticationFailure,

    #[error("not found")]
    NotFound,

    #[error("operation conflicts with existing data")]
    Conflict,

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    /// Map a unique-constraint violation to `on_unique`, any other error to
    /// `Database`.
    pub(crate) fn unique_or(e: sqlx::Error, on_unique: impl FnOnce() -> Self) -> Self {
        match e.as_database_error() {
            Some(db) if db.is_unique_violation() => on_unique(),
            _ => ServiceError::Database(e),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    Service(ServiceError),
    Template(askama::Error),
    Session(tower_sessions::session::Error),
    NotFound,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound | AppError::Service(ServiceError::NotFound) => not_found_page(),
            AppError::Service(ServiceError::Conflict) => (
                StatusCode::CONFLICT,
                "The entry could not be deleted because other data depends on it",
            )
                .into_response(),
            AppError::Service(e) => {
                tracing::error!("Service error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            AppError::Template(e) => {
                tracing::error!("Template error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            AppError::Session(e) => {
                tracing::error!("Session error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

pub(crate) fn not_found_page() -> Response {
    match NotFoundTemplate::anonymous().render() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Template error: {e}");
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        AppError::Service(e)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Service(ServiceError::Database(e))
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Template(e)
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(e: tower_sessions::session::Error) -> Self {
        AppError::Session(e)
    }
}
