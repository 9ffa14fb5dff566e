use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_typed_multipart::TypedMultipartError;
use serde_json::json;
use validator::ValidationErrors;

use crate::utils::{database, response, validation};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    AlreadyExists(String),
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    PermissionDenied(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("validation failed")]
    Validation(#[from] ValidationErrors),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) | Self::InvalidState(_) | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyExists(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::NotFound(_) => "NOT_FOUND",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::PermissionDenied(_) => "PERMISSION_DENIED",
            Self::Internal(_) => "INTERNAL",
            Self::Validation(_) => "VALIDATION_FAILED",
        }
    }

    pub fn not_found(resource: &str) -> Self {
        Self::NotFound(format!("{} not found", resource))
    }
}

impl From<database::Error> for Error {
    fn from(err: database::Error) -> Self {
        match err {
            database::Error::NotFound => Error::NotFound(String::from("Record not found")),
            database::Error::Conflict(message) => Error::AlreadyExists(message),
            database::Error::UnexpectedError(message) => Error::Internal(message),
        }
    }
}

impl From<TypedMultipartError> for Error {
    fn from(err: TypedMultipartError) -> Self {
        Error::InvalidArgument(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            Self::Validation(errors) => response::failure(
                status,
                "Failed to validate payload",
                validation::into_errors(&errors),
            ),
            Self::Internal(detail) => {
                tracing::error!("Request failed with internal error: {}", detail);
                response::failure(
                    status,
                    "Sorry an error occurred",
                    vec![json!({ "message": "Sorry an error occurred", "code": "INTERNAL" })],
                )
            }
            err => {
                let message = err.to_string();
                response::failure(
                    status,
                    &message,
                    vec![json!({ "message": message, "code": err.code() })],
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        let cases = [
            (Error::InvalidArgument(String::new()), StatusCode::BAD_REQUEST),
            (Error::InvalidState(String::new()), StatusCode::BAD_REQUEST),
            (Error::Unauthenticated(String::new()), StatusCode::UNAUTHORIZED),
            (Error::PermissionDenied(String::new()), StatusCode::FORBIDDEN),
            (Error::NotFound(String::new()), StatusCode::NOT_FOUND),
            (Error::AlreadyExists(String::new()), StatusCode::CONFLICT),
            (Error::Internal(String::new()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn storage_conflicts_become_already_exists() {
        let err: Error = database::Error::Conflict(String::from("duplicate key")).into();
        assert!(matches!(err, Error::AlreadyExists(_)));

        let err: Error = database::Error::UnexpectedError(String::from("boom")).into();
        assert!(matches!(err, Error::Internal(_)));
    }
}
