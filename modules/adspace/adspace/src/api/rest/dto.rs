use std::collections::HashMap;
use std::str::FromStr;

use adspace_sdk::{
    Agency, AgencyProfilePatch, Booking, BookingStatus, BookingStatusChange, Listing, ListingPatch,
    MediaRef, NewBooking, NewListing, RankedAgency, StatusSnapshot,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Applied when `GET /agencies/top` is called without `limit`.
pub const DEFAULT_TOP_LIMIT: u32 = 10;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshotDto {
    /// One of `trial`, `active`, `expired`.
    pub status: String,
    pub plan_name: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub ends_at: Option<OffsetDateTime>,
    pub days_remaining: u32,
}

impl From<StatusSnapshot> for StatusSnapshotDto {
    fn from(s: StatusSnapshot) -> Self {
        Self {
            status: s.status.as_str().to_owned(),
            plan_name: s.plan_name,
            ends_at: s.ends_at,
            days_remaining: s.days_remaining,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivateSubscriptionReq {
    pub plan_name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaDto {
    pub url: String,
    /// `image` or `raw`.
    pub resource_type: String,
}

impl From<MediaRef> for MediaDto {
    fn from(m: MediaRef) -> Self {
        Self {
            url: m.url,
            resource_type: m.resource_type.as_str().to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgencyDto {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub is_verified: bool,
    pub logo: Option<MediaDto>,
    pub verification_document: Option<MediaDto>,
    pub subscription_plan: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub trial_ends_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub subscription_ends_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: OffsetDateTime,
}

impl From<Agency> for AgencyDto {
    fn from(a: Agency) -> Self {
        Self {
            id: a.id,
            name: a.name,
            email: a.email,
            description: a.description,
            website: a.website,
            is_verified: a.is_verified,
            logo: a.logo.map(Into::into),
            verification_document: a.verification_document.map(Into::into),
            subscription_plan: a.subscription_plan,
            trial_ends_at: a.trial_ends_at,
            subscription_ends_at: a.subscription_ends_at,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingDto {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub agency_id: Uuid,
    #[schema(value_type = String)]
    pub category_id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    /// Minor currency units.
    pub price_min: i64,
    pub price_max: i64,
    pub is_active: bool,
    pub image: MediaDto,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: OffsetDateTime,
}

impl From<Listing> for ListingDto {
    fn from(l: Listing) -> Self {
        Self {
            id: l.id,
            agency_id: l.agency_id,
            category_id: l.category_id,
            title: l.title,
            description: l.description,
            location: l.location,
            price_min: l.price_min,
            price_max: l.price_max,
            is_active: l.is_active,
            image: l.image.into(),
            created_at: l.created_at,
            updated_at: l.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetListingActiveReq {
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDto {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub company_id: Uuid,
    #[schema(value_type = String)]
    pub listing_id: Uuid,
    #[schema(value_type = String)]
    pub agency_id: Uuid,
    pub status: String,
    pub request_description: String,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: OffsetDateTime,
}

impl From<Booking> for BookingDto {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            company_id: b.company_id,
            listing_id: b.listing_id,
            agency_id: b.agency_id,
            status: b.status.as_str().to_owned(),
            request_description: b.request_description,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingReq {
    #[schema(value_type = String)]
    pub listing_id: Uuid,
    pub request_description: String,
}

impl From<CreateBookingReq> for NewBooking {
    fn from(req: CreateBookingReq) -> Self {
        Self {
            listing_id: req.listing_id,
            request_description: req.request_description,
        }
    }
}

/// Status names are matched exactly (`Pending`, `Accepted`, `Rejected`, `Completed`).
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetBookingStatusReq {
    pub status: String,
    #[serde(default)]
    pub expected_status: Option<String>,
}

impl TryFrom<SetBookingStatusReq> for BookingStatusChange {
    type Error = DomainError;

    fn try_from(req: SetBookingStatusReq) -> Result<Self, Self::Error> {
        let change = Self::to(BookingStatus::from_str(&req.status)?);
        Ok(match req.expected_status {
            Some(expected) => change.expecting(BookingStatus::from_str(&expected)?),
            None => change,
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankedAgencyDto {
    #[schema(value_type = String)]
    pub agency_id: Uuid,
    pub agency_name: String,
    pub logo_url: Option<String>,
    pub booking_count: u64,
}

impl From<RankedAgency> for RankedAgencyDto {
    fn from(r: RankedAgency) -> Self {
        Self {
            agency_id: r.agency_id,
            agency_name: r.agency_name,
            logo_url: r.logo_url,
            booking_count: r.booking_count,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TopAgenciesQuery {
    pub limit: Option<u32>,
}

/// Text parts of a multipart form, keyed by part name.
#[derive(Debug, Default)]
pub struct FormFields(pub HashMap<String, String>);

impl FormFields {
    fn text(&self, field: &str) -> Option<String> {
        self.0.get(field).cloned()
    }

    fn required(&self, field: &str) -> Result<String, DomainError> {
        self.text(field)
            .ok_or_else(|| DomainError::validation(field, "is required"))
    }

    fn parsed<T: FromStr>(&self, field: &str) -> Result<Option<T>, DomainError> {
        self.0
            .get(field)
            .map(|raw| {
                raw.trim()
                    .parse::<T>()
                    .map_err(|_| DomainError::validation(field, "has an invalid format"))
            })
            .transpose()
    }

    fn required_parsed<T: FromStr>(&self, field: &str) -> Result<T, DomainError> {
        self.parsed(field)?
            .ok_or_else(|| DomainError::validation(field, "is required"))
    }

    /// Fields of `POST /listings`.
    pub fn new_listing(&self) -> Result<NewListing, DomainError> {
        Ok(NewListing {
            category_id: self.required_parsed("categoryId")?,
            title: self.required("title")?,
            description: self.required("description")?,
            location: self.required("location")?,
            price_min: self.required_parsed("priceMin")?,
            price_max: self.required_parsed("priceMax")?,
        })
    }

    /// Fields of `PATCH /listings/{id}`; absent parts are left unchanged.
    pub fn listing_patch(&self) -> Result<ListingPatch, DomainError> {
        Ok(ListingPatch {
            category_id: self.parsed("categoryId")?,
            title: self.text("title"),
            description: self.text("description"),
            location: self.text("location"),
            price_min: self.parsed("priceMin")?,
            price_max: self.parsed("priceMax")?,
        })
    }

    /// Fields of `PATCH /agencies/me/profile`.
    #[must_use]
    pub fn profile_patch(&self) -> AgencyProfilePatch {
        AgencyProfilePatch {
            name: self.text("name"),
            description: self.text("description"),
            website: self.text("website"),
        }
    }
}
