//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every variant maps to one HTTP status and is rendered through the same
//! `{success, message, data}` envelope as successful responses.
//!
//! `AppError` implements `actix_web::error::ResponseError`, and provides `From`
//! implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error` and `bcrypt::BcryptError` so handlers and services
//! can propagate with `?`.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::response;
use crate::validation::{collect_field_errors, FieldError};

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// One or more request fields failed validation (HTTP 400).
    /// Carries one entry per invalid field.
    Validation(Vec<FieldError>),
    /// Represents a client-side error due to a malformed request (HTTP 400).
    BadRequest(String),
    /// Authentication is missing or failed (HTTP 401).
    Unauthorized(String),
    /// The caller is authenticated but not allowed to do this (HTTP 403).
    Forbidden(String),
    /// Represents a situation where a requested resource was not found (HTTP 404).
    NotFound(String),
    /// A unique constraint would be violated (HTTP 409).
    Conflict(String),
    /// Represents an unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Represents an error originating from database operations (HTTP 500).
    DatabaseError(String),
}

impl AppError {
    /// Message shown to clients. Server-side details are never exposed.
    fn public_message(&self) -> String {
        match self {
            AppError::Validation(_) => "Validation failed".to_string(),
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                "Internal Server Error".to_string()
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Validation(errors) => {
                write!(f, "Validation failed: {} invalid field(s)", errors.len())
            }
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into enveloped `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        }

        let data = match self {
            AppError::Validation(errors) => Some(json!({ "errors": errors })),
            _ => None,
        };

        response::failure(status, self.public_message(), data)
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// Unique violations become `Conflict` naming the offending column, foreign key
/// violations become `BadRequest`, and `RowNotFound` becomes `NotFound`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                let target = conflict_target(db_err.constraint());
                AppError::Conflict(format!("A resource with this {} already exists", target))
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                log::warn!("Foreign key violation: {}", db_err);
                AppError::BadRequest("Database error".into())
            }
            other => AppError::DatabaseError(other.to_string()),
        }
    }
}

/// Derives the column name from a Postgres constraint name such as `users_email_key`.
fn conflict_target(constraint: Option<&str>) -> String {
    constraint
        .map(|name| name.trim_end_matches("_key"))
        .and_then(|name| name.split_once('_').map(|(_, column)| column.to_string()))
        .filter(|column| !column.is_empty())
        .unwrap_or_else(|| "value".to_string())
}

/// Converts `validator::ValidationErrors` into `AppError::Validation`,
/// keeping every invalid field.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        AppError::Validation(collect_field_errors(&errors))
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        log::debug!("Token rejected: {}", error);
        AppError::Unauthorized("Unauthorized: Invalid token".into())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
