//! Booking workflow between a company (requester) and an agency (owner).
//!
//! `Pending` is the only initial state. Agencies move bookings forward;
//! companies can only withdraw a booking, which deletes it, and only while
//! it is still `Pending`.

use adspace_sdk::{Booking, BookingStatus, Listing};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Agency-side transition rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// `Pending -> {Accepted, Rejected}` and `Accepted -> Completed`.
    #[default]
    Directed,
    /// Any status to any status, as older deployments allowed.
    Unrestricted,
}

impl TransitionPolicy {
    #[must_use]
    pub fn permits(self, from: BookingStatus, to: BookingStatus) -> bool {
        use BookingStatus::{Accepted, Completed, Pending, Rejected};

        match self {
            Self::Unrestricted => true,
            Self::Directed => matches!(
                (from, to),
                (Pending, Accepted | Rejected) | (Accepted, Completed)
            ),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BookingWorkflow {
    policy: TransitionPolicy,
    max_description_length: usize,
}

impl BookingWorkflow {
    #[must_use]
    pub fn new(policy: TransitionPolicy, max_description_length: usize) -> Self {
        Self {
            policy,
            max_description_length,
        }
    }

    #[must_use]
    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Builds a new `Pending` booking against `listing`, capturing its current owner.
    ///
    /// # Errors
    /// `ListingUnavailable` if the listing is inactive, `Validation` for a bad description.
    pub fn open(
        &self,
        company_id: Uuid,
        listing: &Listing,
        request_description: &str,
        now: OffsetDateTime,
    ) -> Result<Booking, DomainError> {
        if !listing.is_active {
            return Err(DomainError::listing_unavailable(listing.id));
        }

        let request_description = request_description.trim();
        if request_description.is_empty() {
            return Err(DomainError::validation(
                "request_description",
                "must not be empty",
            ));
        }
        let len = request_description.chars().count();
        if len > self.max_description_length {
            return Err(DomainError::validation(
                "request_description",
                format!(
                    "too long: {len} characters (max: {})",
                    self.max_description_length
                ),
            ));
        }

        Ok(Booking {
            id: Uuid::now_v7(),
            company_id,
            listing_id: listing.id,
            agency_id: listing.agency_id,
            status: BookingStatus::Pending,
            request_description: request_description.to_owned(),
            created_at: now,
            updated_at: now,
        })
    }

    /// # Errors
    /// `Forbidden` unless `agency_id` owns the booking, `InvalidState` if the
    /// policy does not allow moving to `to`.
    pub fn check_status_change(
        &self,
        booking: &Booking,
        agency_id: Uuid,
        to: BookingStatus,
    ) -> Result<(), DomainError> {
        if booking.agency_id != agency_id {
            return Err(DomainError::forbidden("Booking", booking.id));
        }
        if !self.policy.permits(booking.status, to) {
            return Err(DomainError::invalid_state(
                booking.id,
                booking.status,
                "this status change",
            ));
        }
        Ok(())
    }

    /// # Errors
    /// `Forbidden` unless `company_id` issued the booking, `InvalidState` once
    /// it has left `Pending`.
    pub fn check_cancel(&self, booking: &Booking, company_id: Uuid) -> Result<(), DomainError> {
        if booking.company_id != company_id {
            return Err(DomainError::forbidden("Booking", booking.id));
        }
        if booking.status != BookingStatus::Pending {
            return Err(DomainError::invalid_state(
                booking.id,
                booking.status,
                "cancellation",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adspace_sdk::{MediaRef, ResourceType};
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-05-10 12:00 UTC);

    fn listing(is_active: bool) -> Listing {
        Listing {
            id: Uuid::new_v4(),
            agency_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            title: "Highway billboard".to_owned(),
            description: "48 sheet, lit".to_owned(),
            location: "A1 northbound".to_owned(),
            price_min: 100_000,
            price_max: 250_000,
            is_active,
            image: MediaRef {
                url: "https://cdn.example/x.jpg".to_owned(),
                remote_id: "adspace/listings/x".to_owned(),
                resource_type: ResourceType::Image,
            },
            created_at: NOW,
            updated_at: NOW,
        }
    }

    fn workflow(policy: TransitionPolicy) -> BookingWorkflow {
        BookingWorkflow::new(policy, 50)
    }

    #[test]
    fn open_captures_listing_owner() {
        let l = listing(true);
        let company = Uuid::new_v4();
        let b = workflow(TransitionPolicy::Directed)
            .open(company, &l, "  two weeks in June ", NOW)
            .unwrap();
        assert_eq!(b.status, BookingStatus::Pending);
        assert_eq!(b.agency_id, l.agency_id);
        assert_eq!(b.company_id, company);
        assert_eq!(b.request_description, "two weeks in June");
    }

    #[test]
    fn inactive_listing_is_unavailable_even_with_bad_input() {
        let l = listing(false);
        let err = workflow(TransitionPolicy::Directed)
            .open(Uuid::new_v4(), &l, "", NOW)
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::ListingUnavailable { listing_id } if listing_id == l.id
        ));
    }

    #[test]
    fn description_is_validated() {
        let wf = workflow(TransitionPolicy::Directed);
        let l = listing(true);
        assert!(matches!(
            wf.open(Uuid::new_v4(), &l, "   ", NOW),
            Err(DomainError::Validation { .. })
        ));
        assert!(matches!(
            wf.open(Uuid::new_v4(), &l, &"x".repeat(51), NOW),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn directed_graph() {
        use BookingStatus::{Accepted, Completed, Pending, Rejected};
        let p = TransitionPolicy::Directed;
        assert!(p.permits(Pending, Accepted));
        assert!(p.permits(Pending, Rejected));
        assert!(p.permits(Accepted, Completed));
        assert!(!p.permits(Pending, Completed));
        assert!(!p.permits(Pending, Pending));
        assert!(!p.permits(Rejected, Accepted));
        assert!(!p.permits(Completed, Pending));
        assert!(!p.permits(Accepted, Rejected));
    }

    #[test]
    fn unrestricted_allows_everything() {
        let p = TransitionPolicy::Unrestricted;
        for from in BookingStatus::ALL {
            for to in BookingStatus::ALL {
                assert!(p.permits(from, to));
            }
        }
    }

    #[test]
    fn status_change_requires_owning_agency() {
        let wf = workflow(TransitionPolicy::Unrestricted);
        let b = wf.open(Uuid::new_v4(), &listing(true), "x", NOW).unwrap();
        let err = wf
            .check_status_change(&b, Uuid::new_v4(), BookingStatus::Accepted)
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden { .. }));
        wf.check_status_change(&b, b.agency_id, BookingStatus::Accepted)
            .unwrap();
    }

    #[test]
    fn cancel_only_from_pending_by_issuer() {
        let wf = workflow(TransitionPolicy::Directed);
        let mut b = wf.open(Uuid::new_v4(), &listing(true), "x", NOW).unwrap();

        assert!(matches!(
            wf.check_cancel(&b, Uuid::new_v4()),
            Err(DomainError::Forbidden { .. })
        ));
        wf.check_cancel(&b, b.company_id).unwrap();

        for status in [
            BookingStatus::Accepted,
            BookingStatus::Rejected,
            BookingStatus::Completed,
        ] {
            b.status = status;
            assert!(matches!(
                wf.check_cancel(&b, b.company_id),
                Err(DomainError::InvalidState { .. })
            ));
        }
    }
}
