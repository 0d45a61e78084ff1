use adspace_sdk::{Booking, BookingStatusChange, NewBooking, RankedAgency};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{MAX_TOP_AGENCIES, Service};
use crate::domain::booking::TransitionPolicy;
use crate::domain::error::DomainError;

impl Service {
    /// The listing is resolved and checked before the requester, so an unknown
    /// or inactive listing yields the same error for every caller.
    #[instrument(
        skip(self, new_booking),
        fields(company_id = %company_id, listing_id = %new_booking.listing_id)
    )]
    pub async fn create_booking(
        &self,
        company_id: Uuid,
        new_booking: NewBooking,
    ) -> Result<Booking, DomainError> {
        info!("Creating booking");

        let now = self.clock.now();
        let listing = self
            .listings
            .get(new_booking.listing_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Listing", new_booking.listing_id))?;
        if !listing.is_active {
            return Err(DomainError::listing_unavailable(listing.id));
        }
        if self.companies.get(company_id).await?.is_none() {
            return Err(DomainError::not_found("Company", company_id));
        }

        let booking =
            self.workflow
                .open(company_id, &listing, &new_booking.request_description, now)?;
        self.bookings.insert(&booking).await?;

        info!(
            booking_id = %booking.id,
            agency_id = %booking.agency_id,
            "Successfully created booking"
        );
        Ok(booking)
    }

    /// Agency-side status change. Not subscription-gated.
    ///
    /// Under the directed policy the write is always guarded by the status
    /// that was validated, so racing changes cannot skip a step of the graph.
    #[instrument(skip(self), fields(booking_id = %booking_id, agency_id = %agency_id))]
    pub async fn set_booking_status(
        &self,
        booking_id: Uuid,
        agency_id: Uuid,
        change: BookingStatusChange,
    ) -> Result<Booking, DomainError> {
        info!(to = %change.status, "Changing booking status");

        let now = self.clock.now();
        let booking = self
            .bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", booking_id))?;

        self.workflow
            .check_status_change(&booking, agency_id, change.status)?;

        if let Some(expected) = change.expected_status
            && expected != booking.status
        {
            return Err(DomainError::conflict(format!(
                "booking {booking_id} is {}, expected {expected}",
                booking.status
            )));
        }

        let guard = match (change.expected_status, self.workflow.policy()) {
            (Some(expected), _) => Some(expected),
            (None, TransitionPolicy::Directed) => Some(booking.status),
            (None, TransitionPolicy::Unrestricted) => None,
        };

        let written = self
            .bookings
            .update_status(booking_id, change.status, guard, now)
            .await?;
        if !written {
            warn!("Booking changed concurrently; status not written");
            return Err(match guard {
                Some(_) => DomainError::conflict(format!(
                    "booking {booking_id} was modified concurrently"
                )),
                None => DomainError::not_found("Booking", booking_id),
            });
        }

        info!(
            from = %booking.status,
            to = %change.status,
            "Successfully changed booking status"
        );
        Ok(Booking {
            status: change.status,
            updated_at: now,
            ..booking
        })
    }

    /// Company-side withdrawal: deletes the booking while it is still pending.
    #[instrument(skip(self), fields(booking_id = %booking_id, company_id = %company_id))]
    pub async fn cancel_booking(
        &self,
        booking_id: Uuid,
        company_id: Uuid,
    ) -> Result<(), DomainError> {
        info!("Cancelling booking");

        let booking = self
            .bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", booking_id))?;
        self.workflow.check_cancel(&booking, company_id)?;

        if !self.bookings.delete_pending(booking_id).await? {
            // Moved out of Pending (or vanished) after the check above.
            return Err(match self.bookings.get(booking_id).await? {
                Some(current) => {
                    DomainError::invalid_state(booking_id, current.status, "cancellation")
                }
                None => DomainError::not_found("Booking", booking_id),
            });
        }

        info!("Successfully cancelled booking");
        Ok(())
    }

    /// Agencies ranked by bookings received; `limit` is clamped to `1..=50`.
    #[instrument(skip(self))]
    pub async fn top_agencies_by_bookings(
        &self,
        limit: u32,
    ) -> Result<Vec<RankedAgency>, DomainError> {
        let limit = limit.clamp(1, MAX_TOP_AGENCIES);
        debug!(limit, "Ranking agencies by bookings");
        self.bookings.top_agencies(u64::from(limit)).await
    }
}
