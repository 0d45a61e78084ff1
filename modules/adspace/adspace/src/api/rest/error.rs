use axum::http::StatusCode;

use super::problem::{Problem, ValidationViolation, error_type};
use crate::domain::error::DomainError;

impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        let trace_id = tracing::Span::current()
            .id()
            .map(|id| id.into_u64().to_string());

        let (status, code, title, detail) = match &e {
            DomainError::Validation { field, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "ADSPACE_VALIDATION",
                "Validation Failed",
                format!("Validation error on '{field}': {message}"),
            ),
            DomainError::InvalidStatus { value } => (
                StatusCode::BAD_REQUEST,
                "ADSPACE_INVALID_STATUS",
                "Bad Request",
                format!("'{value}' is not a booking status"),
            ),
            DomainError::Gated { .. } => (
                StatusCode::PAYMENT_REQUIRED,
                "ADSPACE_SUBSCRIPTION_EXPIRED",
                "Subscription expired",
                "An active subscription is required for this operation".to_owned(),
            ),
            // Ownership failures must be indistinguishable from absence.
            DomainError::NotFound { resource, id }
            | DomainError::NotFoundOrForbidden { resource, id }
            | DomainError::Forbidden { resource, id } => (
                StatusCode::NOT_FOUND,
                "ADSPACE_NOT_FOUND",
                "Not Found",
                format!("{resource} {id} not found"),
            ),
            DomainError::ListingUnavailable { listing_id } => (
                StatusCode::CONFLICT,
                "ADSPACE_LISTING_UNAVAILABLE",
                "Listing unavailable",
                format!("Listing {listing_id} is not available for booking"),
            ),
            DomainError::InvalidState { .. } => (
                StatusCode::CONFLICT,
                "ADSPACE_INVALID_STATE",
                "Invalid state",
                e.to_string(),
            ),
            DomainError::Conflict { message } => (
                StatusCode::CONFLICT,
                "ADSPACE_CONFLICT",
                "Conflict",
                message.clone(),
            ),
            DomainError::Storage { .. } => {
                tracing::error!(error = %e, "Object storage error occurred");
                (
                    StatusCode::BAD_GATEWAY,
                    "ADSPACE_STORAGE",
                    "Bad Gateway",
                    "The media storage service failed".to_owned(),
                )
            }
            DomainError::StorageInconsistency { .. } | DomainError::Database { .. } => {
                tracing::error!(error = %e, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ADSPACE_INTERNAL",
                    "Internal Server Error",
                    "An internal error occurred".to_owned(),
                )
            }
        };

        let mut problem = Problem::new(status, title, detail)
            .with_type(error_type(code))
            .with_code(code);

        match e {
            DomainError::Validation { field, message } => {
                problem = problem.with_errors(vec![ValidationViolation { field, message }]);
            }
            DomainError::Gated { snapshot, .. } => {
                problem = problem.with_subscription(snapshot.into());
            }
            _ => {}
        }

        if let Some(id) = trace_id {
            problem = problem.with_trace_id(id);
        }

        problem
    }
}
