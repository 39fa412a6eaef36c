//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the
//! application. It centralizes error management, providing a consistent way to
//! represent the error conditions that can occur, from validation failures to
//! database issues.
//!
//! `AppError` implements `actix_web::error::ResponseError` to convert
//! application errors into the HTTP responses the API contract promises. Server
//! side failures (configuration, database, bcrypt) are logged in full and
//! flattened to a generic message: raw storage or crypto error text never
//! reaches the client.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Input failed shape validation (HTTP 400). Carries one message per
    /// violated field rule so the client sees every problem, not just the first.
    Validation(Vec<String>),
    /// A uniqueness conflict, e.g. registering an email that already exists (HTTP 409).
    Conflict(String),
    /// Authentication failed or is missing (HTTP 401).
    Unauthorized(String),
    /// The requested resource does not exist for this caller (HTTP 404).
    NotFound(String),
    /// The server is misconfigured (HTTP 500). Detail is logged, never sent.
    Config(String),
    /// A database operation failed (HTTP 500). Detail is logged, never sent.
    Database(String),
    /// Any other unexpected server-side failure (HTTP 500).
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Validation(errors) => write!(f, "Validation Error: {}", errors.join("; ")),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration Error: {}", msg),
            AppError::Database(msg) => write!(f, "Database Error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Config(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation(errors) => HttpResponse::BadRequest().json(json!({
                "message": "Invalid input data",
                "errors": errors,
            })),
            AppError::Conflict(msg) => HttpResponse::Conflict().json(json!({
                "message": msg
            })),
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized().json(json!({
                "message": msg
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "message": msg
            })),
            // Server-side detail is logged here and replaced by a generic body.
            AppError::Config(msg) | AppError::Database(msg) | AppError::Internal(msg) => {
                log::error!("{}", msg);
                HttpResponse::InternalServerError().json(json!({
                    "message": "Internal server error"
                }))
            }
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::Validation`,
/// flattening the error map into one `"field: message"` entry per violation.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    match &error.message {
                        Some(message) => format!("{}: {}", field, message),
                        None => format!("{}: invalid value ({})", field, error.code),
                    }
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages)
    }
}

impl AppError {
    /// Maps a unique-constraint violation to `Conflict` with the given
    /// message; any other database error goes through the usual conversion.
    ///
    /// Used on inserts whose uniqueness pre-check can race with a concurrent
    /// insert of the same value: the loser hits the constraint instead of the
    /// pre-check and must still surface as a conflict, not a 500.
    pub fn on_unique_violation(error: sqlx::Error, message: &str) -> AppError {
        let is_unique_violation = matches!(
            &error,
            sqlx::Error::Database(db)
                if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation)
        );
        if is_unique_violation {
            AppError::Conflict(message.into())
        } else {
            AppError::from(error)
        }
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `sqlx::Error::RowNotFound` maps to `AppError::NotFound`; every other
/// database error becomes `AppError::Database`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::Database(error.to_string()),
        }
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::Internal`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(format!("Password hashing failed: {}", error))
    }
}
