//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure a request can run into, from signup rule violations to store errors,
//! is represented here and converted into an HTTP response with a JSON body.
//!
//! Authentication failures are deliberately collapsed: `Unauthenticated` and
//! `TokenInvalid` render the exact same response so that a caller cannot tell an
//! expired token from a forged one or from a deleted account.

use actix_web::{error::ResponseError, http::header, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Message returned for every authentication failure.
pub const UNAUTHENTICATED_MESSAGE: &str = "Could not validate credentials";

/// Message returned when the username/password pair presented to `/token` is wrong.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Incorrect username or password";

/// Message returned when a username is already taken.
pub const DUPLICATE_USERNAME_MESSAGE: &str =
    "Sorry! that username already exists. Please try another username";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// A signup rule was violated (HTTP 417). Carries the human-readable reason.
    ValidationFailed(String),
    /// The requested username is already registered (HTTP 406).
    DuplicateUsername,
    /// Wrong username or password at token issuance (HTTP 401).
    InvalidCredentials,
    /// A bearer token failed verification. The detail is for logs only;
    /// the response is identical to `Unauthenticated`.
    TokenInvalid(String),
    /// The request could not be tied to a live user (HTTP 401).
    Unauthenticated,
    /// Authenticated, but not allowed to touch this task (HTTP 401, distinct message).
    Forbidden(String),
    /// The requested resource does not exist (HTTP 404).
    NotFound(String),
    /// Malformed or meaningless request (HTTP 400).
    BadRequest(String),
    /// Request body failed field validation (HTTP 422).
    InvalidInput(String),
    /// Process configuration is missing or unparseable.
    Configuration(String),
    /// Error originating from the persistence layer (HTTP 500).
    DatabaseError(String),
    /// Any other unexpected server-side failure (HTTP 500).
    InternalServerError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::ValidationFailed(msg) => write!(f, "Validation failed: {}", msg),
            AppError::DuplicateUsername => write!(f, "Duplicate username"),
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::TokenInvalid(msg) => write!(f, "Invalid token: {}", msg),
            AppError::Unauthenticated => write!(f, "Unauthenticated"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationFailed(_) => StatusCode::EXPECTATION_FAILED,
            AppError::DuplicateUsername => StatusCode::NOT_ACCEPTABLE,
            AppError::InvalidCredentials
            | AppError::TokenInvalid(_)
            | AppError::Unauthenticated
            | AppError::Forbidden(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Configuration(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        let message = match self {
            AppError::ValidationFailed(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::InvalidInput(msg) => msg.clone(),
            AppError::DuplicateUsername => DUPLICATE_USERNAME_MESSAGE.to_string(),
            AppError::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE.to_string(),
            AppError::TokenInvalid(_) | AppError::Unauthenticated => {
                builder.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
                UNAUTHENTICATED_MESSAGE.to_string()
            }
            // Server-side details stay in the logs.
            AppError::Configuration(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_) => {
                log::error!("{}", self);
                "Internal server error".to_string()
            }
        };
        builder.json(json!({ "error": message }))
    }
}

/// Unique index on `users.username`.
pub const USERNAME_UNIQUE_CONSTRAINT: &str = "users_username_key";

/// Only a violation of the username index means the username is taken.
fn unique_violation(constraint: Option<&str>, detail: String) -> AppError {
    match constraint {
        Some(USERNAME_UNIQUE_CONSTRAINT) => AppError::DuplicateUsername,
        _ => AppError::DatabaseError(detail),
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`, a violation of the username index becomes
/// `DuplicateUsername`, everything else is a `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                unique_violation(db.constraint(), error.to_string())
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> AppError {
        AppError::DatabaseError(error.to_string())
    }
}

/// Converts `validator::ValidationErrors` into `AppError::InvalidInput`.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::InvalidInput(error.to_string())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
