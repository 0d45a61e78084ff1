//! Public models for the `adspace` module.
//!
//! These are transport-agnostic data structures that define the contract
//! between the `adspace` module and its consumers.

use std::fmt;
use std::str::FromStr;

use time::OffsetDateTime;
use uuid::Uuid;

/// Entitlement state derived from an agency's time anchors. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionStatus {
    Trial,
    Active,
    Expired,
}

impl SubscriptionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Active => "active",
            Self::Expired => "expired",
        }
    }

    /// Whether inventory-mutating operations are allowed in this state.
    #[must_use]
    pub fn is_entitled(self) -> bool {
        !matches!(self, Self::Expired)
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of an agency's entitlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub status: SubscriptionStatus,
    pub plan_name: Option<String>,
    pub ends_at: Option<OffsetDateTime>,
    pub days_remaining: u32,
}

/// Storage class of a remote object; must be reused when the object is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Image,
    Raw,
}

impl ResourceType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Raw => "raw",
        }
    }

    /// Parses the resource type reported by the object store.
    #[must_use]
    pub fn from_store(value: &str) -> Option<Self> {
        match value {
            "image" => Some(Self::Image),
            "raw" => Some(Self::Raw),
            _ => None,
        }
    }
}

/// Reference to a binary asset held in the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    pub url: String,
    pub remote_id: String,
    pub resource_type: ResourceType,
}

/// Raw bytes supplied by a caller for a media-bearing field.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct MediaUpload {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
}

impl MediaUpload {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: None,
        }
    }
}

impl fmt::Debug for MediaUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaUpload")
            .field("bytes", &self.bytes.len())
            .field("file_name", &self.file_name)
            .finish()
    }
}

/// A seller account offering ad placements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agency {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub is_verified: bool,
    pub logo: Option<MediaRef>,
    pub verification_document: Option<MediaRef>,
    pub trial_started_at: Option<OffsetDateTime>,
    pub trial_ends_at: Option<OffsetDateTime>,
    pub subscription_ends_at: Option<OffsetDateTime>,
    pub subscription_plan: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Data for registering a new agency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAgency {
    pub id: Option<Uuid>,
    pub name: String,
    pub email: String,
}

/// Partial update of an agency's public profile.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AgencyProfilePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
}

/// A buyer account that submits bookings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Data for registering a new company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompany {
    pub id: Option<Uuid>,
    pub name: String,
    pub email: String,
}

/// A sellable ad-placement offer owned by exactly one agency.
///
/// Prices are expressed in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub id: Uuid,
    pub agency_id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub price_min: i64,
    pub price_max: i64,
    pub is_active: bool,
    pub image: MediaRef,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Data for creating a new listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListing {
    pub category_id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub price_min: i64,
    pub price_max: i64,
}

/// Partial update data for a listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingPatch {
    pub category_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
}

impl ListingPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.price_min.is_none()
            && self.price_max.is_none()
    }
}

/// Lifecycle state of a booking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
}

impl BookingStatus {
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Accepted,
        Self::Rejected,
        Self::Completed,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the four booking states.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown booking status: '{0}'")]
pub struct UnknownBookingStatus(pub String);

impl FromStr for BookingStatus {
    type Err = UnknownBookingStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownBookingStatus(s.to_owned()))
    }
}

/// A company's request to reserve a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: Uuid,
    pub company_id: Uuid,
    pub listing_id: Uuid,
    /// Owning agency captured at creation time.
    pub agency_id: Uuid,
    pub status: BookingStatus,
    pub request_description: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Data for creating a new booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub listing_id: Uuid,
    pub request_description: String,
}

/// Agency-initiated status change.
///
/// When `expected_status` is set the change only applies if the booking is still
/// in that state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingStatusChange {
    pub status: BookingStatus,
    pub expected_status: Option<BookingStatus>,
}

impl BookingStatusChange {
    #[must_use]
    pub fn to(status: BookingStatus) -> Self {
        Self {
            status,
            expected_status: None,
        }
    }

    #[must_use]
    pub fn expecting(mut self, expected: BookingStatus) -> Self {
        self.expected_status = Some(expected);
        self
    }
}

/// Entry of the "top agencies by bookings" read model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedAgency {
    pub agency_id: Uuid,
    pub agency_name: String,
    pub logo_url: Option<String>,
    pub booking_count: u64,
}
