#![allow(clippy::unwrap_used, clippy::expect_used)]

//! The SDK trait as seen by other modules: only `AdspaceError` crosses the boundary.

mod common;

use std::sync::Arc;

use adspace::LocalClient;
use adspace_sdk::{
    AdspaceClientV1, AdspaceError, BookingStatus, BookingStatusChange, MediaUpload, NewAgency,
    NewBooking, NewCompany, SubscriptionStatus,
};
use common::{PNG, env};
use time::Duration;

#[tokio::test]
async fn client_drives_the_full_marketplace_flow() {
    let env = env().await;
    let client: Arc<dyn AdspaceClientV1> = Arc::new(LocalClient::new(env.service.clone()));

    let agency = client
        .register_agency(NewAgency {
            id: None,
            name: "Northwind".to_owned(),
            email: "ops@northwind.example".to_owned(),
        })
        .await
        .unwrap();
    let company = client
        .register_company(NewCompany {
            id: None,
            name: "Acme".to_owned(),
            email: "media@acme.example".to_owned(),
        })
        .await
        .unwrap();

    let listing = client
        .create_listing(
            agency.id,
            env.new_listing("Ring road panel"),
            MediaUpload::new(PNG.to_vec()),
        )
        .await
        .unwrap();
    let booking = client
        .create_booking(
            company.id,
            NewBooking {
                listing_id: listing.id,
                request_description: "Two weeks in May".to_owned(),
            },
        )
        .await
        .unwrap();
    let accepted = client
        .set_booking_status(
            booking.id,
            agency.id,
            BookingStatusChange::to(BookingStatus::Accepted),
        )
        .await
        .unwrap();
    assert_eq!(accepted.status, BookingStatus::Accepted);

    let err = client
        .cancel_booking(booking.id, company.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AdspaceError::InvalidState { .. }));

    let ranked = client.top_agencies_by_bookings(5).await.unwrap();
    assert_eq!(ranked[0].agency_id, agency.id);
}

#[tokio::test]
async fn gated_and_hidden_errors_map_to_sdk_variants() {
    let env = env().await;
    let client = LocalClient::new(env.service.clone());
    let owner = env.agency("Northwind").await;
    let other = env.agency("Southwind").await;
    let listing = env.listing(owner.id, "Ring road panel").await;

    let err = client
        .set_listing_active(listing.id, other.id, false)
        .await
        .unwrap_err();
    assert!(matches!(err, AdspaceError::NotFound { resource: "Listing", id } if id == listing.id));

    env.clock.advance(Duration::days(31));
    let err = client
        .set_listing_active(listing.id, owner.id, false)
        .await
        .unwrap_err();
    match err {
        AdspaceError::SubscriptionExpired { snapshot } => {
            assert_eq!(snapshot.status, SubscriptionStatus::Expired);
        }
        other => panic!("expected SubscriptionExpired, got {other:?}"),
    }

    let snapshot = client.activate_subscription(owner.id, "pro").await.unwrap();
    assert_eq!(snapshot.status, SubscriptionStatus::Active);
    assert_eq!(
        client
            .get_subscription_status(owner.id)
            .await
            .unwrap()
            .ends_at,
        snapshot.ends_at
    );
}

#[tokio::test]
async fn failed_upload_surfaces_as_internal() {
    let env = env().await;
    let client = LocalClient::new(env.service.clone());
    let agency = env.agency("Northwind").await;
    env.store.fail_uploads(true);

    let err = client
        .create_listing(
            agency.id,
            env.new_listing("Ring road panel"),
            MediaUpload::new(PNG.to_vec()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AdspaceError::Internal));
}
