//! Application error type with HTTP response conversion.
//!
//! Every failure the domain can produce is an [`AppError`] tagged with an
//! [`ErrorKind`]. The kind drives the HTTP status: all domain kinds answer
//! `400 Bad Request` with a `{"error": "<message>"}` body, only store
//! failures surface as `500`.

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::rules::RuleViolation;

/// Classification of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A field constraint was violated.
    Validation,
    /// A unique key collided with an existing record.
    Conflict,
    /// The entity, or an entity it references, does not exist.
    NotFound,
    /// A collection query returned nothing.
    EmptyResult,
    /// An authorization precondition (existing caller, existing target) was not met.
    Unauthorized,
    /// No authorization rule granted the action.
    AccessDenied,
    /// The store or another collaborator failed.
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::NotFound => "not_found",
            ErrorKind::EmptyResult => "empty_result",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::AccessDenied => "access_denied",
            ErrorKind::Internal => "internal",
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(kind: ErrorKind, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            kind,
            status: kind.status(),
            error: err.into(),
        }
    }

    pub fn validation<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Validation, err)
    }

    pub fn conflict<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Conflict, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::NotFound, err)
    }

    pub fn empty_result<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::EmptyResult, err)
    }

    pub fn unauthorized<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Unauthorized, err)
    }

    /// Missing or invalid bearer credentials. Rejected before any domain
    /// logic runs, so this is the one `Unauthorized` answered with 401.
    pub fn unauthenticated<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::unauthorized(err).with_status(StatusCode::UNAUTHORIZED)
    }

    pub fn access_denied<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::AccessDenied, err)
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Internal, err)
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.error.to_string()
        }));

        (self.status, body).into_response()
    }
}

impl From<RuleViolation> for AppError {
    fn from(violation: RuleViolation) -> Self {
        AppError::validation(violation)
    }
}
