//! Persistence ports used by the domain service.
//!
//! Every update is a field-level patch: implementations write only the
//! columns named by the method so that concurrent patches of unrelated
//! fields never clobber each other. Media references are only ever swapped
//! with a [`MediaSwap`], which is conditional on the reference that was read.

use adspace_sdk::{
    Agency, AgencyProfilePatch, Booking, BookingStatus, Company, Listing, MediaRef, RankedAgency,
};
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::subscription::{Renewal, TrialWindow};

/// Conditional replacement of a media reference column.
///
/// The write only applies while the stored remote id still equals
/// `previous` (`None` meaning the column is empty). A lost race is reported
/// as `Conflict`, which makes the caller compensate its upload.
#[derive(Debug, Clone, Copy)]
pub struct MediaSwap<'a> {
    pub previous: Option<&'a str>,
    pub next: &'a MediaRef,
}

impl<'a> MediaSwap<'a> {
    #[must_use]
    pub fn new(previous: Option<&'a MediaRef>, next: &'a MediaRef) -> Self {
        Self {
            previous: previous.map(|m| m.remote_id.as_str()),
            next,
        }
    }
}

#[async_trait]
pub trait AgenciesRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Agency>, DomainError>;

    async fn insert(&self, agency: &Agency) -> Result<(), DomainError>;

    /// Idempotent: writers racing on the same agency converge on identical values.
    async fn set_trial_window(&self, id: Uuid, window: TrialWindow) -> Result<(), DomainError>;

    async fn set_subscription(
        &self,
        id: Uuid,
        renewal: &Renewal,
        now: OffsetDateTime,
    ) -> Result<(), DomainError>;

    /// Writes the `Some` fields of `patch` and, when given, swaps the logo in one update.
    async fn update_profile(
        &self,
        id: Uuid,
        patch: &AgencyProfilePatch,
        logo: Option<MediaSwap<'_>>,
        now: OffsetDateTime,
    ) -> Result<(), DomainError>;

    async fn set_verification_document(
        &self,
        id: Uuid,
        document: MediaSwap<'_>,
        now: OffsetDateTime,
    ) -> Result<(), DomainError>;
}

#[async_trait]
pub trait CompaniesRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Company>, DomainError>;

    async fn insert(&self, company: &Company) -> Result<(), DomainError>;
}

#[async_trait]
pub trait ListingsRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Listing>, DomainError>;

    async fn category_exists(&self, id: Uuid) -> Result<bool, DomainError>;

    async fn insert(&self, listing: &Listing) -> Result<(), DomainError>;

    /// Writes the descriptive columns of `listing`; the image reference is left alone.
    async fn update_fields(&self, listing: &Listing) -> Result<(), DomainError>;

    /// Writes the descriptive columns and swaps the image to `listing.image`,
    /// provided the stored image is still `previous_remote_id`.
    async fn update_with_image(
        &self,
        listing: &Listing,
        previous_remote_id: &str,
    ) -> Result<(), DomainError>;

    async fn set_active(
        &self,
        id: Uuid,
        is_active: bool,
        now: OffsetDateTime,
    ) -> Result<(), DomainError>;

    /// Returns `false` when no row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

#[async_trait]
pub trait BookingsRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Booking>, DomainError>;

    async fn insert(&self, booking: &Booking) -> Result<(), DomainError>;

    /// Sets the status. With `expected` the write only happens if the stored
    /// status still matches; returns whether a row was changed.
    async fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        expected: Option<BookingStatus>,
        now: OffsetDateTime,
    ) -> Result<bool, DomainError>;

    /// Deletes the booking only while it is still `Pending`.
    async fn delete_pending(&self, id: Uuid) -> Result<bool, DomainError>;

    async fn count_for_listing(&self, listing_id: Uuid) -> Result<u64, DomainError>;

    /// Agencies by number of bookings, descending; ties by agency id ascending.
    async fn top_agencies(&self, limit: u64) -> Result<Vec<RankedAgency>, DomainError>;
}
