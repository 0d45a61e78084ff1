use adspace_sdk::{AdspaceError, BookingStatus, StatusSnapshot, UnknownBookingStatus};
use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Subscription expired for agency {agency_id}")]
    Gated {
        agency_id: Uuid,
        snapshot: StatusSnapshot,
    },

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: Uuid },

    /// Collapses "absent" and "owned by someone else" into one answer.
    #[error("{resource} not found or not accessible: {id}")]
    NotFoundOrForbidden { resource: &'static str, id: Uuid },

    #[error("Requester does not own {resource} {id}")]
    Forbidden { resource: &'static str, id: Uuid },

    #[error("Listing {listing_id} is not available for booking")]
    ListingUnavailable { listing_id: Uuid },

    #[error("Invalid booking status: '{value}'")]
    InvalidStatus { value: String },

    #[error("Booking {booking_id} is {status}; {action} is not permitted")]
    InvalidState {
        booking_id: Uuid,
        status: BookingStatus,
        action: &'static str,
    },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// The object store rejected an operation before any record was touched.
    #[error("Object storage error: {message}")]
    Storage { message: String },

    /// Object store and database disagree (or nearly did); always logged.
    #[error("Storage inconsistency: {message}")]
    StorageInconsistency { message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn gated(agency_id: Uuid, snapshot: StatusSnapshot) -> Self {
        Self::Gated {
            agency_id,
            snapshot,
        }
    }

    #[must_use]
    pub fn not_found(resource: &'static str, id: Uuid) -> Self {
        Self::NotFound { resource, id }
    }

    #[must_use]
    pub fn not_found_or_forbidden(resource: &'static str, id: Uuid) -> Self {
        Self::NotFoundOrForbidden { resource, id }
    }

    #[must_use]
    pub fn forbidden(resource: &'static str, id: Uuid) -> Self {
        Self::Forbidden { resource, id }
    }

    #[must_use]
    pub fn listing_unavailable(listing_id: Uuid) -> Self {
        Self::ListingUnavailable { listing_id }
    }

    pub fn invalid_status(value: impl Into<String>) -> Self {
        Self::InvalidStatus {
            value: value.into(),
        }
    }

    #[must_use]
    pub fn invalid_state(booking_id: Uuid, status: BookingStatus, action: &'static str) -> Self {
        Self::InvalidState {
            booking_id,
            status,
            action,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn storage_inconsistency(message: impl Into<String>) -> Self {
        Self::StorageInconsistency {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        Self::database(e.to_string())
    }
}

impl From<UnknownBookingStatus> for DomainError {
    fn from(e: UnknownBookingStatus) -> Self {
        Self::invalid_status(e.0)
    }
}

/// Convert domain errors to SDK errors for public API consumption.
impl From<DomainError> for AdspaceError {
    fn from(domain_error: DomainError) -> Self {
        match domain_error {
            DomainError::Validation { field, message } => {
                AdspaceError::validation(format!("{field}: {message}"))
            }
            DomainError::Gated { snapshot, .. } => AdspaceError::SubscriptionExpired { snapshot },
            DomainError::NotFound { resource, id }
            | DomainError::NotFoundOrForbidden { resource, id } => {
                AdspaceError::not_found(resource, id)
            }
            DomainError::Forbidden { .. } => AdspaceError::Forbidden,
            DomainError::ListingUnavailable { listing_id } => {
                AdspaceError::ListingUnavailable { listing_id }
            }
            DomainError::InvalidStatus { value } => AdspaceError::InvalidStatus { value },
            e @ DomainError::InvalidState { .. } => AdspaceError::invalid_state(e.to_string()),
            DomainError::Conflict { message } => AdspaceError::conflict(message),
            DomainError::Storage { .. }
            | DomainError::StorageInconsistency { .. }
            | DomainError::Database { .. } => AdspaceError::internal(),
        }
    }
}
