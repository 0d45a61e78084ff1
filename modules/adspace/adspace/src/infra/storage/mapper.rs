//! Conversions between SeaORM models and SDK contract types.

use adspace_sdk::{Agency, Booking, BookingStatus, Company, Listing, MediaRef, ResourceType};
use sea_orm::ActiveValue::Set;

use crate::infra::storage::entity::{agency, booking, company, listing};

/// Rows written before the resource type was tracked hold images.
fn resource_type(stored: &str) -> ResourceType {
    ResourceType::from_store(stored).unwrap_or(ResourceType::Image)
}

fn media(
    url: Option<String>,
    remote_id: Option<String>,
    stored_type: Option<String>,
) -> Option<MediaRef> {
    match (url, remote_id) {
        (Some(url), Some(remote_id)) => Some(MediaRef {
            url,
            remote_id,
            resource_type: stored_type
                .as_deref()
                .map_or(ResourceType::Image, resource_type),
        }),
        _ => None,
    }
}

impl From<booking::Status> for BookingStatus {
    fn from(s: booking::Status) -> Self {
        match s {
            booking::Status::Pending => Self::Pending,
            booking::Status::Accepted => Self::Accepted,
            booking::Status::Rejected => Self::Rejected,
            booking::Status::Completed => Self::Completed,
        }
    }
}

impl From<BookingStatus> for booking::Status {
    fn from(s: BookingStatus) -> Self {
        match s {
            BookingStatus::Pending => Self::Pending,
            BookingStatus::Accepted => Self::Accepted,
            BookingStatus::Rejected => Self::Rejected,
            BookingStatus::Completed => Self::Completed,
        }
    }
}

impl From<agency::Model> for Agency {
    fn from(m: agency::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            description: m.description,
            website: m.website,
            is_verified: m.is_verified,
            logo: media(m.logo_url, m.logo_remote_id, m.logo_resource_type),
            verification_document: media(
                m.verification_document_url,
                m.verification_document_remote_id,
                m.verification_document_resource_type,
            ),
            trial_started_at: m.trial_started_at,
            trial_ends_at: m.trial_ends_at,
            subscription_ends_at: m.subscription_ends_at,
            subscription_plan: m.subscription_plan,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

pub fn agency_to_active_model(a: &Agency) -> agency::ActiveModel {
    agency::ActiveModel {
        id: Set(a.id),
        name: Set(a.name.clone()),
        email: Set(a.email.clone()),
        description: Set(a.description.clone()),
        website: Set(a.website.clone()),
        is_verified: Set(a.is_verified),
        logo_url: Set(a.logo.as_ref().map(|m| m.url.clone())),
        logo_remote_id: Set(a.logo.as_ref().map(|m| m.remote_id.clone())),
        logo_resource_type: Set(a.logo.as_ref().map(|m| m.resource_type.as_str().to_owned())),
        verification_document_url: Set(a.verification_document.as_ref().map(|m| m.url.clone())),
        verification_document_remote_id: Set(a
            .verification_document
            .as_ref()
            .map(|m| m.remote_id.clone())),
        verification_document_resource_type: Set(a
            .verification_document
            .as_ref()
            .map(|m| m.resource_type.as_str().to_owned())),
        trial_started_at: Set(a.trial_started_at),
        trial_ends_at: Set(a.trial_ends_at),
        subscription_ends_at: Set(a.subscription_ends_at),
        subscription_plan: Set(a.subscription_plan.clone()),
        created_at: Set(a.created_at),
        updated_at: Set(a.updated_at),
    }
}

impl From<company::Model> for Company {
    fn from(m: company::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

pub fn company_to_active_model(c: &Company) -> company::ActiveModel {
    company::ActiveModel {
        id: Set(c.id),
        name: Set(c.name.clone()),
        email: Set(c.email.clone()),
        created_at: Set(c.created_at),
        updated_at: Set(c.updated_at),
    }
}

impl From<listing::Model> for Listing {
    fn from(m: listing::Model) -> Self {
        Self {
            id: m.id,
            agency_id: m.agency_id,
            category_id: m.category_id,
            title: m.title,
            description: m.description,
            location: m.location,
            price_min: m.price_min,
            price_max: m.price_max,
            is_active: m.is_active,
            image: MediaRef {
                url: m.image_url,
                remote_id: m.image_remote_id,
                resource_type: resource_type(&m.image_resource_type),
            },
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

pub fn listing_to_active_model(l: &Listing) -> listing::ActiveModel {
    listing::ActiveModel {
        id: Set(l.id),
        agency_id: Set(l.agency_id),
        category_id: Set(l.category_id),
        title: Set(l.title.clone()),
        description: Set(l.description.clone()),
        location: Set(l.location.clone()),
        price_min: Set(l.price_min),
        price_max: Set(l.price_max),
        is_active: Set(l.is_active),
        image_url: Set(l.image.url.clone()),
        image_remote_id: Set(l.image.remote_id.clone()),
        image_resource_type: Set(l.image.resource_type.as_str().to_owned()),
        created_at: Set(l.created_at),
        updated_at: Set(l.updated_at),
    }
}

impl From<booking::Model> for Booking {
    fn from(m: booking::Model) -> Self {
        Self {
            id: m.id,
            company_id: m.company_id,
            listing_id: m.listing_id,
            agency_id: m.agency_id,
            status: m.status.into(),
            request_description: m.request_description,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

pub fn booking_to_active_model(b: &Booking) -> booking::ActiveModel {
    booking::ActiveModel {
        id: Set(b.id),
        company_id: Set(b.company_id),
        listing_id: Set(b.listing_id),
        agency_id: Set(b.agency_id),
        status: Set(b.status.into()),
        request_description: Set(b.request_description.clone()),
        created_at: Set(b.created_at),
        updated_at: Set(b.updated_at),
    }
}
