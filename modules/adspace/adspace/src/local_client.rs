use std::sync::Arc;

use adspace_sdk::{
    AdspaceClientV1, AdspaceError, Agency, AgencyProfilePatch, Booking, BookingStatusChange,
    Company, Listing, ListingPatch, MediaUpload, NewAgency, NewBooking, NewCompany, NewListing,
    RankedAgency, StatusSnapshot,
};
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::service::Service;

/// In-process implementation of [`AdspaceClientV1`] backed by the domain service.
pub struct LocalClient {
    service: Arc<Service>,
}

impl LocalClient {
    #[must_use]
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

/// Internal failures collapse to `AdspaceError::Internal`; keep their cause in the log.
fn into_sdk(e: DomainError) -> AdspaceError {
    if matches!(e, DomainError::Database { .. } | DomainError::Storage { .. }) {
        tracing::error!(error = %e, "adspace operation failed");
    }
    e.into()
}

#[async_trait]
impl AdspaceClientV1 for LocalClient {
    async fn register_agency(&self, agency: NewAgency) -> Result<Agency, AdspaceError> {
        self.service.register_agency(agency).await.map_err(into_sdk)
    }

    async fn register_company(&self, company: NewCompany) -> Result<Company, AdspaceError> {
        self.service.register_company(company).await.map_err(into_sdk)
    }

    async fn get_subscription_status(
        &self,
        agency_id: Uuid,
    ) -> Result<StatusSnapshot, AdspaceError> {
        self.service
            .get_subscription_status(agency_id)
            .await
            .map_err(into_sdk)
    }

    async fn activate_subscription(
        &self,
        agency_id: Uuid,
        plan_name: &str,
    ) -> Result<StatusSnapshot, AdspaceError> {
        self.service
            .activate_subscription(agency_id, plan_name)
            .await
            .map_err(into_sdk)
    }

    async fn update_agency_profile(
        &self,
        agency_id: Uuid,
        patch: AgencyProfilePatch,
        logo: Option<MediaUpload>,
    ) -> Result<Agency, AdspaceError> {
        self.service
            .update_agency_profile(agency_id, patch, logo)
            .await
            .map_err(into_sdk)
    }

    async fn upload_verification_document(
        &self,
        agency_id: Uuid,
        document: MediaUpload,
    ) -> Result<Agency, AdspaceError> {
        self.service
            .upload_verification_document(agency_id, document)
            .await
            .map_err(into_sdk)
    }

    async fn create_listing(
        &self,
        agency_id: Uuid,
        listing: NewListing,
        image: MediaUpload,
    ) -> Result<Listing, AdspaceError> {
        self.service
            .create_listing(agency_id, listing, image)
            .await
            .map_err(into_sdk)
    }

    async fn update_listing(
        &self,
        listing_id: Uuid,
        agency_id: Uuid,
        patch: ListingPatch,
        image: Option<MediaUpload>,
    ) -> Result<Listing, AdspaceError> {
        self.service
            .update_listing(listing_id, agency_id, patch, image)
            .await
            .map_err(into_sdk)
    }

    async fn set_listing_active(
        &self,
        listing_id: Uuid,
        agency_id: Uuid,
        is_active: bool,
    ) -> Result<Listing, AdspaceError> {
        self.service
            .set_listing_active(listing_id, agency_id, is_active)
            .await
            .map_err(into_sdk)
    }

    async fn delete_listing(&self, listing_id: Uuid, agency_id: Uuid) -> Result<(), AdspaceError> {
        self.service
            .delete_listing(listing_id, agency_id)
            .await
            .map_err(into_sdk)
    }

    async fn create_booking(
        &self,
        company_id: Uuid,
        booking: NewBooking,
    ) -> Result<Booking, AdspaceError> {
        self.service
            .create_booking(company_id, booking)
            .await
            .map_err(into_sdk)
    }

    async fn set_booking_status(
        &self,
        booking_id: Uuid,
        agency_id: Uuid,
        change: BookingStatusChange,
    ) -> Result<Booking, AdspaceError> {
        self.service
            .set_booking_status(booking_id, agency_id, change)
            .await
            .map_err(into_sdk)
    }

    async fn cancel_booking(&self, booking_id: Uuid, company_id: Uuid) -> Result<(), AdspaceError> {
        self.service
            .cancel_booking(booking_id, company_id)
            .await
            .map_err(into_sdk)
    }

    async fn top_agencies_by_bookings(
        &self,
        limit: u32,
    ) -> Result<Vec<RankedAgency>, AdspaceError> {
        self.service
            .top_agencies_by_bookings(limit)
            .await
            .map_err(into_sdk)
    }
}
