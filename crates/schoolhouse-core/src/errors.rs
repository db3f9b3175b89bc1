//! Application error type and its HTTP mapping.
//!
//! Every failure a handler can produce is an [`AppError`]: an [`ErrorKind`]
//! that callers can match on, the HTTP status it maps to, and an
//! [`anyhow::Error`] carrying the message and any context chain.
//!
//! | Kind                   | Status |
//! |------------------------|--------|
//! | `DuplicateConstraint`  | 400    |
//! | `ValidationFailure`    | 400    |
//! | `Unauthenticated`      | 401    |
//! | `Unauthorized`         | 403    |
//! | `NotFound`             | 404    |
//! | `RateLimited`          | 429    |
//! | `Internal`             | 500    |

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use std::fmt;
use utoipa::ToSchema;

/// Classification of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// An email, code or identifier that must be unique is already taken.
    DuplicateConstraint,
    /// A referenced record does not exist.
    NotFound,
    /// The request is malformed or breaks a field rule.
    ValidationFailure,
    /// The caller is known but not allowed to perform the operation.
    Unauthorized,
    /// No valid credentials or token were supplied.
    Unauthenticated,
    RateLimited,
    Internal,
}

impl ErrorKind {
    pub const fn status(self) -> StatusCode {
        match self {
            ErrorKind::DuplicateConstraint | ErrorKind::ValidationFailure => {
                StatusCode::BAD_REQUEST
            }
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::DuplicateConstraint => "DUPLICATE_CONSTRAINT",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::ValidationFailure => "VALIDATION_FAILURE",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Unauthenticated => "UNAUTHENTICATED",
            ErrorKind::RateLimited => "RATE_LIMITED",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON body returned for every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: ErrorKind,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub kind: ErrorKind,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(kind: ErrorKind, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status: kind.status(),
            kind,
            error: err.into(),
        }
    }

    pub fn duplicate<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::DuplicateConstraint, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::NotFound, err)
    }

    pub fn validation<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::ValidationFailure, err)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, anyhow::anyhow!(message.into()))
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthenticated, anyhow::anyhow!(message.into()))
    }

    pub fn rate_limited() -> Self {
        Self::new(
            ErrorKind::RateLimited,
            anyhow::anyhow!("Too many requests, please retry later"),
        )
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Internal, err)
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Internal, err)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Internal failures keep their details in the logs only.
        let message = if self.kind == ErrorKind::Internal {
            tracing::error!(error = ?self.error, "internal error");
            "Internal server error".to_string()
        } else {
            self.error.to_string()
        };

        let body = Json(json!({
            "error": message,
            "kind": self.kind,
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_status_mapping() {
        assert_eq!(
            ErrorKind::DuplicateConstraint.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorKind::ValidationFailure.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::Unauthorized.status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorKind::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorKind::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            ErrorKind::Internal.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_kind_serializes_screaming_snake() {
        let value = serde_json::to_value(ErrorKind::DuplicateConstraint).unwrap();
        assert_eq!(value, "DUPLICATE_CONSTRAINT");
        assert_eq!(ErrorKind::NotFound.to_string(), "NOT_FOUND");
    }

    #[test]
    fn test_constructors_set_kind_and_status() {
        let err = AppError::duplicate(anyhow::anyhow!("Email already exists"));
        assert_eq!(err.kind, ErrorKind::DuplicateConstraint);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = AppError::forbidden("not yours");
        assert_eq!(err.kind, ErrorKind::Unauthorized);
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.error.to_string(), "not yours");

        let err = AppError::unauthenticated("Missing authorization header");
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_foreign_errors_become_internal() {
        let parse_err = "abc".parse::<i64>().unwrap_err();
        let err: AppError = parse_err.into();
        assert_eq!(err.kind, ErrorKind::Internal);
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::not_found(anyhow::anyhow!("Course not found")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::internal(anyhow::anyhow!("pool closed")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
