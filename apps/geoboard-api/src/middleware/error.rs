//! Error handling - RFC 7807 responses with a machine-readable `error` code.

use std::fmt;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use geoboard_core::DomainError;
use geoboard_core::lifecycle::RestoreRejection;
use geoboard_shared::ErrorResponse;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    Domain(DomainError),
    /// Caller is not allowed to trigger this operation.
    Unauthorized(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Domain(err) => write!(f, "{err}"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
        }
    }
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::Domain(err) => err.code(),
            AppError::Unauthorized(_) => "unauthorized",
        }
    }

    fn title(&self) -> &'static str {
        match self.status_code() {
            StatusCode::BAD_REQUEST => "Bad Request",
            StatusCode::UNAUTHORIZED => "Unauthorized",
            StatusCode::FORBIDDEN => "Forbidden",
            StatusCode::NOT_FOUND => "Not Found",
            StatusCode::CONFLICT => "Conflict",
            _ => "Internal Server Error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        let err = match self {
            AppError::Domain(err) => err,
            AppError::Unauthorized(_) => return StatusCode::UNAUTHORIZED,
        };

        match err {
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::OutsideViewRadius { .. } | DomainError::OutsideAccessRadius { .. } => {
                StatusCode::FORBIDDEN
            }
            DomainError::ThreadClosed { .. } => StatusCode::CONFLICT,
            DomainError::RestoreRejected(RestoreRejection::NotFoundOrForbidden) => {
                StatusCode::NOT_FOUND
            }
            DomainError::RestoreRejected(_) => StatusCode::CONFLICT,
            DomainError::Unauthorized => StatusCode::UNAUTHORIZED,
            DomainError::Repo(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let error = ErrorResponse::new(status.as_u16(), self.title(), self.code())
            .with_detail(self.to_string());

        HttpResponse::build(status).json(error)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::Domain(err)
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use geoboard_core::error::RepoError;
    use uuid::Uuid;

    fn status(err: DomainError) -> StatusCode {
        AppError::from(err).status_code()
    }

    #[test]
    fn test_status_mapping() {
        let id = Uuid::new_v4();
        assert_eq!(status(DomainError::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(DomainError::OutsideAccessRadius { board_id: id }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status(DomainError::RestoreRejected(RestoreRejection::NotFoundOrForbidden)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(DomainError::RestoreRejected(RestoreRejection::AlreadyRestored)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(DomainError::Repo(RepoError::Query("boom".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_code_follows_rejection_reason() {
        let err = AppError::from(DomainError::RestoreRejected(
            RestoreRejection::AnonymousNotRestorable,
        ));
        assert_eq!(err.code(), "anonymous-not-restorable");
        assert_eq!(err.title(), "Conflict");
    }
}
