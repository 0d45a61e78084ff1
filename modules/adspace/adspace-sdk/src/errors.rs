//! Public error types for the `adspace` module.
//!
//! These errors are safe to expose to other modules and consumers.

use thiserror::Error;
use uuid::Uuid;

use crate::models::StatusSnapshot;

/// Errors that can be returned by the `AdspaceClientV1`.
#[derive(Error, Debug, Clone)]
pub enum AdspaceError {
    /// Input was malformed or incomplete.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The agency's subscription has expired; the snapshot describes the renewal path.
    #[error("Subscription expired")]
    SubscriptionExpired { snapshot: StatusSnapshot },

    /// Resource does not exist or is not owned by the requester.
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: Uuid },

    /// The requester may not act on this resource.
    #[error("Forbidden")]
    Forbidden,

    /// The listing cannot be booked right now.
    #[error("Listing unavailable: {listing_id}")]
    ListingUnavailable { listing_id: Uuid },

    /// The requested status is not a known booking status.
    #[error("Invalid status: '{value}'")]
    InvalidStatus { value: String },

    /// The resource is not in a state that permits the operation.
    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    /// The operation conflicts with the current state of the resource.
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// An internal error occurred.
    #[error("Internal error")]
    Internal,
}

impl AdspaceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(resource: &'static str, id: Uuid) -> Self {
        Self::NotFound { resource, id }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal() -> Self {
        Self::Internal
    }
}
