//! Adspace SDK
//!
//! This crate provides the public API for the `adspace` module:
//! - `AdspaceClientV1` trait
//! - Model types for agencies, companies, listings, bookings and media references
//! - Error type (`AdspaceError`)
//!
//! ## Usage
//!
//! ```ignore
//! use adspace_sdk::AdspaceClientV1;
//!
//! let snapshot = client.get_subscription_status(agency_id).await?;
//! let booking = client.create_booking(company_id, new_booking).await?;
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod client;
pub mod errors;
pub mod models;

pub use client::AdspaceClientV1;
pub use errors::AdspaceError;
pub use models::{
    Agency, AgencyProfilePatch, Booking, BookingStatus, BookingStatusChange, Company, Listing,
    ListingPatch, MediaRef, MediaUpload, NewAgency, NewBooking, NewCompany, NewListing,
    RankedAgency, ResourceType, StatusSnapshot, SubscriptionStatus, UnknownBookingStatus,
};
