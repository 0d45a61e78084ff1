//! `AdspaceClientV1` trait definition.
//!
//! Identities are passed explicitly: the caller is responsible for having
//! authenticated the agency or company it acts for.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AdspaceError;
use crate::models::{
    Agency, AgencyProfilePatch, Booking, BookingStatusChange, Company, Listing, ListingPatch,
    MediaUpload, NewAgency, NewBooking, NewCompany, NewListing, RankedAgency, StatusSnapshot,
};

/// Public API trait for the `adspace` module.
#[async_trait]
pub trait AdspaceClientV1: Send + Sync {
    /// Register an agency and open its trial window.
    async fn register_agency(&self, agency: NewAgency) -> Result<Agency, AdspaceError>;

    /// Register a company.
    async fn register_company(&self, company: NewCompany) -> Result<Company, AdspaceError>;

    /// Current entitlement of an agency.
    async fn get_subscription_status(&self, agency_id: Uuid)
    -> Result<StatusSnapshot, AdspaceError>;

    /// Extend the agency's paid window by one period, stacking on unused time.
    async fn activate_subscription(
        &self,
        agency_id: Uuid,
        plan_name: &str,
    ) -> Result<StatusSnapshot, AdspaceError>;

    /// Update profile text fields and optionally replace the logo.
    async fn update_agency_profile(
        &self,
        agency_id: Uuid,
        patch: AgencyProfilePatch,
        logo: Option<MediaUpload>,
    ) -> Result<Agency, AdspaceError>;

    /// Replace the agency's verification document.
    async fn upload_verification_document(
        &self,
        agency_id: Uuid,
        document: MediaUpload,
    ) -> Result<Agency, AdspaceError>;

    /// Create a listing. Requires a non-expired subscription.
    async fn create_listing(
        &self,
        agency_id: Uuid,
        listing: NewListing,
        image: MediaUpload,
    ) -> Result<Listing, AdspaceError>;

    /// Update a listing, optionally replacing its image. Requires a non-expired subscription.
    async fn update_listing(
        &self,
        listing_id: Uuid,
        agency_id: Uuid,
        patch: ListingPatch,
        image: Option<MediaUpload>,
    ) -> Result<Listing, AdspaceError>;

    /// Toggle listing visibility. Requires a non-expired subscription.
    async fn set_listing_active(
        &self,
        listing_id: Uuid,
        agency_id: Uuid,
        is_active: bool,
    ) -> Result<Listing, AdspaceError>;

    /// Delete a listing that has never been booked.
    async fn delete_listing(&self, listing_id: Uuid, agency_id: Uuid) -> Result<(), AdspaceError>;

    /// Submit a booking request against an active listing.
    async fn create_booking(
        &self,
        company_id: Uuid,
        booking: NewBooking,
    ) -> Result<Booking, AdspaceError>;

    /// Agency-side status change.
    async fn set_booking_status(
        &self,
        booking_id: Uuid,
        agency_id: Uuid,
        change: BookingStatusChange,
    ) -> Result<Booking, AdspaceError>;

    /// Company-side cancellation; only pending bookings can be cancelled.
    async fn cancel_booking(&self, booking_id: Uuid, company_id: Uuid) -> Result<(), AdspaceError>;

    /// Agencies ranked by number of bookings received.
    async fn top_agencies_by_bookings(&self, limit: u32)
    -> Result<Vec<RankedAgency>, AdspaceError>;
}
