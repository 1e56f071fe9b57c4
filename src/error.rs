use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

/// Error surface of the HTTP layer. Database errors collapse into
/// `Internal`; everything else carries enough context to render a stable
/// machine-readable error body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("employee not found")]
    EmployeeNotFound,

    #[error("month must be between 1 and 12")]
    InvalidMonth,

    #[error("year out of supported range")]
    InvalidYear,

    #[error("internal error")]
    Internal(#[from] sqlx::Error),
}

impl ApiError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ApiError::Validation {
            field,
            message: message.into(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::EmployeeNotFound => "EMPLOYEE_NOT_FOUND",
            ApiError::InvalidMonth => "INVALID_MONTH",
            ApiError::InvalidYear => "INVALID_YEAR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::InvalidMonth | ApiError::InvalidYear => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) | ApiError::EmployeeNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Internal(e) = self {
            tracing::error!(error = %e, "Internal error");
        }

        let mut body = json!({
            "error": {
                "kind": self.kind(),
                "message": self.to_string(),
            }
        });
        if let ApiError::Validation { field, .. } = self {
            body["error"]["field"] = json!(field);
        }

        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = ApiError::validation("days_worked", "days worked cannot be negative");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), "VALIDATION_ERROR");
    }

    #[test]
    fn forbidden_maps_to_403() {
        let err = ApiError::Forbidden("clerk or admin role required");
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.kind(), "FORBIDDEN");
    }

    #[test]
    fn not_found_variants_map_to_404() {
        assert_eq!(
            ApiError::NotFound("payroll entry").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::EmployeeNotFound.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn period_errors_map_to_bad_request() {
        assert_eq!(ApiError::InvalidMonth.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidYear.status_code(), StatusCode::BAD_REQUEST);
    }
}
