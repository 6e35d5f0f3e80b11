//! Application error type with HTTP response conversion.
//!
//! Every fallible operation in the API returns [`AppError`]. An error carries
//! an [`ErrorKind`] (the taxonomy the transport layer maps to a status code)
//! and the underlying [`anyhow::Error`].
//!
//! Errors converted with `?` are classified on the way in: storage errors
//! coming from `sqlx` become [`ErrorKind::NotFound`], [`ErrorKind::Duplicate`]
//! or [`ErrorKind::Validation`] where the database tells us so, and validator
//! failures become [`ErrorKind::Validation`]. Anything else is
//! [`ErrorKind::Unexpected`].
//!
//! # Response Body
//!
//! ```json
//! { "error": "Duplicate entry", "message": "A record with this information already exists" }
//! ```
//!
//! Unexpected errors never leak their cause to clients when `APP_ENV` is
//! `production`; otherwise the full error chain is included under `details`.

use std::fmt;
use std::sync::OnceLock;

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use validator::ValidationErrors;

static EXPOSE_DETAILS: OnceLock<bool> = OnceLock::new();

/// Whether internal error details may be sent to clients.
///
/// Reads `APP_ENV` once; anything other than `production` exposes details.
pub fn expose_internal_details() -> bool {
    *EXPOSE_DETAILS.get_or_init(|| {
        std::env::var("APP_ENV")
            .map(|v| !v.eq_ignore_ascii_case("production"))
            .unwrap_or(true)
    })
}

/// Error taxonomy shared by every transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or out-of-range input.
    Validation,
    /// A single-entity lookup found nothing.
    NotFound,
    /// A uniqueness constraint was violated.
    Duplicate,
    /// Missing, invalid or expired credential.
    Unauthenticated,
    /// Authenticated, but not allowed to touch the resource.
    Forbidden,
    /// Anything else.
    Unexpected,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::Validation | ErrorKind::Duplicate => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short, stable error code sent as the `error` field.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Validation => "Validation failed",
            ErrorKind::NotFound => "Not found",
            ErrorKind::Duplicate => "Duplicate entry",
            ErrorKind::Unauthenticated => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::Unexpected => "Internal server error",
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(kind: ErrorKind, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            kind,
            error: err.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Unexpected, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::NotFound, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Validation, err)
    }

    pub fn duplicate<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Duplicate, err)
    }

    pub fn unauthorized<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Unauthenticated, err)
    }

    pub fn forbidden<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Forbidden, err)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    /// Message safe to show to a client.
    pub fn public_message(&self) -> String {
        if let Some(errors) = self.error.downcast_ref::<ValidationErrors>() {
            return format_validation_errors(errors);
        }

        if self.error.downcast_ref::<sqlx::Error>().is_some() {
            return match self.kind {
                ErrorKind::NotFound => "The requested resource was not found".to_string(),
                ErrorKind::Duplicate => {
                    "A record with this information already exists".to_string()
                }
                ErrorKind::Validation => "A referenced record does not exist".to_string(),
                _ => "Internal server error".to_string(),
            };
        }

        match self.kind {
            ErrorKind::Unexpected => "Internal server error".to_string(),
            _ => self.error.to_string(),
        }
    }

    fn classify(error: Error) -> Self {
        let kind = if let Some(db_error) = error.downcast_ref::<sqlx::Error>() {
            match db_error {
                sqlx::Error::RowNotFound => ErrorKind::NotFound,
                sqlx::Error::Database(e) if e.is_unique_violation() => ErrorKind::Duplicate,
                sqlx::Error::Database(e) if e.is_foreign_key_violation() => ErrorKind::Validation,
                _ => ErrorKind::Unexpected,
            }
        } else if error.downcast_ref::<ValidationErrors>().is_some() {
            ErrorKind::Validation
        } else {
            ErrorKind::Unexpected
        };

        Self { kind, error }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.code(), self.error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.public_message();

        let body = if self.kind == ErrorKind::Unexpected {
            tracing::error!(error = ?self.error, "Unexpected error");
            if expose_internal_details() {
                json!({
                    "error": self.kind.code(),
                    "message": message,
                    "details": format!("{:#}", self.error),
                })
            } else {
                json!({ "error": self.kind.code(), "message": message })
            }
        } else {
            json!({ "error": self.kind.code(), "message": message })
        };

        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::classify(err.into())
    }
}

/// Flattens validator errors into a single comma-separated message.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
        name: String,
    }

    #[test]
    fn test_kind_status_mapping() {
        assert_eq!(ErrorKind::Validation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::Duplicate.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorKind::Unauthenticated.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorKind::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ErrorKind::Unexpected.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_row_not_found_becomes_not_found() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.public_message(), "The requested resource was not found");
    }

    #[test]
    fn test_other_sqlx_errors_are_unexpected() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_plain_errors_are_unexpected() {
        let err = AppError::from(anyhow!("disk on fire"));
        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_validation_errors_are_classified() {
        let probe = Probe {
            name: "ab".to_string(),
        };
        let err = AppError::from(probe.validate().unwrap_err());
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.public_message(), "Name must be at least 3 characters");
    }

    #[test]
    fn test_explicit_constructors_keep_message() {
        let err = AppError::forbidden(anyhow!("Not authorized to update this blog"));
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.public_message(), "Not authorized to update this blog");

        let err = AppError::duplicate(anyhow!("Email already exists"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Email already exists");
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::not_found(anyhow!("Blog not found")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::unauthorized(anyhow!("Invalid token")).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_display_includes_code() {
        let err = AppError::not_found(anyhow!("Tag not found"));
        assert_eq!(err.to_string(), "Not found: Tag not found");
    }
}
