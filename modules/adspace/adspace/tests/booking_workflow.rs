#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Booking workflow and the top-agencies read model over SQLite.

mod common;

use adspace::config::AdspaceConfig;
use adspace::domain::booking::TransitionPolicy;
use adspace::domain::error::DomainError;
use adspace::infra::storage::entity::booking;
use adspace_sdk::{Booking, BookingStatus, BookingStatusChange, NewBooking};
use common::{TestEnv, env, env_with};
use sea_orm::EntityTrait;
use time::Duration;
use uuid::Uuid;

async fn book(env: &TestEnv, company_id: Uuid, listing_id: Uuid) -> Booking {
    env.service
        .create_booking(
            company_id,
            NewBooking {
                listing_id,
                request_description: "Two weeks in May".to_owned(),
            },
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn accepted_booking_can_no_longer_be_cancelled() {
    let env = env().await;
    let agency = env.agency("Northwind").await;
    let company = env.company("Acme").await;
    let listing = env.listing(agency.id, "Ring road panel").await;

    let booking = book(&env, company.id, listing.id).await;
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.agency_id, agency.id);

    let accepted = env
        .service
        .set_booking_status(
            booking.id,
            agency.id,
            BookingStatusChange::to(BookingStatus::Accepted),
        )
        .await
        .unwrap();
    assert_eq!(accepted.status, BookingStatus::Accepted);

    let err = env
        .service
        .cancel_booking(booking.id, company.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::InvalidState {
            status: BookingStatus::Accepted,
            ..
        }
    ));

    let row = booking::Entity::find_by_id(booking.id)
        .one(&env.conn)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, booking::Status::Accepted);
}

#[tokio::test]
async fn pending_booking_is_withdrawn_by_its_company_only() {
    let env = env().await;
    let agency = env.agency("Northwind").await;
    let company = env.company("Acme").await;
    let rival = env.company("Globex").await;
    let listing = env.listing(agency.id, "Ring road panel").await;
    let booking = book(&env, company.id, listing.id).await;

    let err = env
        .service
        .cancel_booking(booking.id, rival.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));

    env.service.cancel_booking(booking.id, company.id).await.unwrap();
    let gone = booking::Entity::find_by_id(booking.id)
        .one(&env.conn)
        .await
        .unwrap();
    assert!(gone.is_none());
}

#[tokio::test]
async fn inactive_listing_cannot_be_booked() {
    let env = env().await;
    let agency = env.agency("Northwind").await;
    let company = env.company("Acme").await;
    let listing = env.listing(agency.id, "Ring road panel").await;
    env.service
        .set_listing_active(listing.id, agency.id, false)
        .await
        .unwrap();

    let err = env
        .service
        .create_booking(
            company.id,
            NewBooking {
                listing_id: listing.id,
                request_description: "Any week".to_owned(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::ListingUnavailable { listing_id } if listing_id == listing.id
    ));
}

#[tokio::test]
async fn status_changes_are_not_subscription_gated() {
    let env = env().await;
    let agency = env.agency("Northwind").await;
    let company = env.company("Acme").await;
    let listing = env.listing(agency.id, "Ring road panel").await;
    let booking = book(&env, company.id, listing.id).await;

    env.clock.advance(Duration::days(90));
    let rejected = env
        .service
        .set_booking_status(
            booking.id,
            agency.id,
            BookingStatusChange::to(BookingStatus::Rejected),
        )
        .await
        .unwrap();
    assert_eq!(rejected.status, BookingStatus::Rejected);
}

#[tokio::test]
async fn directed_graph_and_expected_status_guard() {
    let env = env().await;
    let agency = env.agency("Northwind").await;
    let other = env.agency("Southwind").await;
    let company = env.company("Acme").await;
    let listing = env.listing(agency.id, "Ring road panel").await;
    let booking = book(&env, company.id, listing.id).await;

    let err = env
        .service
        .set_booking_status(
            booking.id,
            other.id,
            BookingStatusChange::to(BookingStatus::Accepted),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));

    let err = env
        .service
        .set_booking_status(
            booking.id,
            agency.id,
            BookingStatusChange::to(BookingStatus::Completed),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidState { .. }));

    let err = env
        .service
        .set_booking_status(
            booking.id,
            agency.id,
            BookingStatusChange::to(BookingStatus::Accepted).expecting(BookingStatus::Accepted),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict { .. }));

    env.service
        .set_booking_status(
            booking.id,
            agency.id,
            BookingStatusChange::to(BookingStatus::Accepted).expecting(BookingStatus::Pending),
        )
        .await
        .unwrap();
    let completed = env
        .service
        .set_booking_status(
            booking.id,
            agency.id,
            BookingStatusChange::to(BookingStatus::Completed),
        )
        .await
        .unwrap();
    assert_eq!(completed.status, BookingStatus::Completed);
}

#[tokio::test]
async fn unrestricted_policy_allows_any_transition() {
    let config = AdspaceConfig {
        booking_transitions: TransitionPolicy::Unrestricted,
        ..AdspaceConfig::default()
    };
    let env = env_with(config, |repos| repos).await;
    let agency = env.agency("Northwind").await;
    let company = env.company("Acme").await;
    let listing = env.listing(agency.id, "Ring road panel").await;
    let booking = book(&env, company.id, listing.id).await;

    for status in [
        BookingStatus::Completed,
        BookingStatus::Pending,
        BookingStatus::Rejected,
        BookingStatus::Accepted,
    ] {
        let changed = env
            .service
            .set_booking_status(booking.id, agency.id, BookingStatusChange::to(status))
            .await
            .unwrap();
        assert_eq!(changed.status, status);
    }
}

#[tokio::test]
async fn top_agencies_ranks_by_bookings_with_id_tiebreak() {
    let env = env().await;
    let company = env.company("Acme").await;

    let busy = env.agency("Busy Outdoor").await;
    let tied_a = env.agency("Tied A").await;
    let tied_b = env.agency("Tied B").await;
    let idle = env.agency("Idle").await;

    let busy_listing = env.listing(busy.id, "Busy panel").await;
    let a_listing = env.listing(tied_a.id, "A panel").await;
    let b_listing = env.listing(tied_b.id, "B panel").await;
    env.listing(idle.id, "Idle panel").await;

    for _ in 0..3 {
        book(&env, company.id, busy_listing.id).await;
    }
    book(&env, company.id, a_listing.id).await;
    book(&env, company.id, b_listing.id).await;

    let ranked = env.service.top_agencies_by_bookings(10).await.unwrap();
    assert_eq!(ranked.len(), 3, "agencies without bookings are not ranked");
    assert_eq!(ranked[0].agency_id, busy.id);
    assert_eq!(ranked[0].agency_name, "Busy Outdoor");
    assert_eq!(ranked[0].booking_count, 3);

    let mut tied = vec![tied_a.id, tied_b.id];
    tied.sort();
    assert_eq!(vec![ranked[1].agency_id, ranked[2].agency_id], tied);
    assert!(ranked[1..].iter().all(|r| r.booking_count == 1));

    let top_one = env.service.top_agencies_by_bookings(1).await.unwrap();
    assert_eq!(top_one.len(), 1);

    // Zero is clamped up to one entry.
    let clamped = env.service.top_agencies_by_bookings(0).await.unwrap();
    assert_eq!(clamped.len(), 1);
}
