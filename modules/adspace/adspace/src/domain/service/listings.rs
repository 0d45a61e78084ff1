use adspace_sdk::{Listing, ListingPatch, MediaRef, MediaUpload, NewListing};
use time::OffsetDateTime;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::{Service, required_text};
use crate::domain::error::DomainError;
use crate::domain::media::MediaField;

/// Listing fields after trimming and validation.
struct ListingDraft {
    category_id: Uuid,
    title: String,
    description: String,
    location: String,
    price_min: i64,
    price_max: i64,
}

impl ListingDraft {
    fn from_listing(listing: &Listing) -> Self {
        Self {
            category_id: listing.category_id,
            title: listing.title.clone(),
            description: listing.description.clone(),
            location: listing.location.clone(),
            price_min: listing.price_min,
            price_max: listing.price_max,
        }
    }

    fn apply(mut self, patch: ListingPatch) -> Self {
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(price_min) = patch.price_min {
            self.price_min = price_min;
        }
        if let Some(price_max) = patch.price_max {
            self.price_max = price_max;
        }
        self
    }

    fn into_listing(
        self,
        id: Uuid,
        agency_id: Uuid,
        is_active: bool,
        image: MediaRef,
        created_at: OffsetDateTime,
        updated_at: OffsetDateTime,
    ) -> Listing {
        Listing {
            id,
            agency_id,
            category_id: self.category_id,
            title: self.title,
            description: self.description,
            location: self.location,
            price_min: self.price_min,
            price_max: self.price_max,
            is_active,
            image,
            created_at,
            updated_at,
        }
    }
}

impl From<NewListing> for ListingDraft {
    fn from(new: NewListing) -> Self {
        Self {
            category_id: new.category_id,
            title: new.title,
            description: new.description,
            location: new.location,
            price_min: new.price_min,
            price_max: new.price_max,
        }
    }
}

impl Service {
    async fn validate_draft(&self, draft: ListingDraft) -> Result<ListingDraft, DomainError> {
        let title = required_text("title", &draft.title, self.config.max_title_length)?;
        let description = required_text(
            "description",
            &draft.description,
            self.config.max_description_length,
        )?;
        let location = required_text("location", &draft.location, self.config.max_title_length)?;

        if draft.price_min < 0 {
            return Err(DomainError::validation("price_min", "must not be negative"));
        }
        if draft.price_max < draft.price_min {
            return Err(DomainError::validation(
                "price_max",
                "must be greater than or equal to price_min",
            ));
        }
        if !self.listings.category_exists(draft.category_id).await? {
            return Err(DomainError::validation(
                "category_id",
                format!("unknown category {}", draft.category_id),
            ));
        }

        Ok(ListingDraft {
            title,
            description,
            location,
            ..draft
        })
    }

    /// Loads a listing the agency owns. Absent and foreign listings look the same.
    async fn owned_listing(
        &self,
        listing_id: Uuid,
        agency_id: Uuid,
    ) -> Result<Listing, DomainError> {
        match self.listings.get(listing_id).await? {
            Some(listing) if listing.agency_id == agency_id => Ok(listing),
            Some(_) => {
                debug!(%listing_id, %agency_id, "Listing owned by another agency");
                Err(DomainError::not_found_or_forbidden("Listing", listing_id))
            }
            None => Err(DomainError::not_found_or_forbidden("Listing", listing_id)),
        }
    }

    #[instrument(skip(self, new_listing, image), fields(agency_id = %agency_id))]
    pub async fn create_listing(
        &self,
        agency_id: Uuid,
        new_listing: NewListing,
        image: MediaUpload,
    ) -> Result<Listing, DomainError> {
        info!("Creating new listing");

        let now = self.clock.now();
        self.gate.admit(agency_id, now).await?;
        let draft = self.validate_draft(new_listing.into()).await?;
        self.media.check_upload(MediaField::ListingImage, &image)?;

        let id = Uuid::now_v7();
        let listings = &self.listings;
        let (listing, _) = self
            .media
            .create(MediaField::ListingImage, &image, |media| {
                let listing = draft.into_listing(id, agency_id, true, media, now, now);
                async move {
                    listings.insert(&listing).await?;
                    Ok::<_, DomainError>(listing)
                }
            })
            .await?;

        info!(listing_id = %listing.id, "Successfully created listing");
        Ok(listing)
    }

    #[instrument(
        skip(self, patch, image),
        fields(listing_id = %listing_id, agency_id = %agency_id)
    )]
    pub async fn update_listing(
        &self,
        listing_id: Uuid,
        agency_id: Uuid,
        patch: ListingPatch,
        image: Option<MediaUpload>,
    ) -> Result<Listing, DomainError> {
        info!("Updating listing");

        let now = self.clock.now();
        let current = self.owned_listing(listing_id, agency_id).await?;
        self.gate.admit(agency_id, now).await?;

        if patch.is_empty() && image.is_none() {
            return Err(DomainError::validation("body", "no changes supplied"));
        }
        let draft = self
            .validate_draft(ListingDraft::from_listing(&current).apply(patch))
            .await?;

        let Some(upload) = image else {
            let updated = draft.into_listing(
                current.id,
                current.agency_id,
                current.is_active,
                current.image,
                current.created_at,
                now,
            );
            self.listings.update_fields(&updated).await?;
            // The image may have been swapped since it was read.
            let stored = self
                .listings
                .get(listing_id)
                .await?
                .ok_or_else(|| DomainError::not_found_or_forbidden("Listing", listing_id))?;
            info!("Successfully updated listing");
            return Ok(stored);
        };

        let listings = &self.listings;
        let previous_remote_id = current.image.remote_id.as_str();
        let replaced = self
            .media
            .replace(
                MediaField::ListingImage,
                &upload,
                Some(&current.image),
                |media| {
                    let updated = draft.into_listing(
                        current.id,
                        current.agency_id,
                        current.is_active,
                        media,
                        current.created_at,
                        now,
                    );
                    async move {
                        listings
                            .update_with_image(&updated, previous_remote_id)
                            .await?;
                        Ok::<_, DomainError>(updated)
                    }
                },
            )
            .await?;

        if let Some(stale) = &replaced.stale {
            warn!(
                remote_id = %stale.media.remote_id,
                error = %stale.error,
                "Listing image replaced; previous object orphaned"
            );
        }
        info!(remote_id = %replaced.media.remote_id, "Successfully updated listing and image");
        Ok(replaced.value)
    }

    #[instrument(skip(self), fields(listing_id = %listing_id, agency_id = %agency_id))]
    pub async fn set_listing_active(
        &self,
        listing_id: Uuid,
        agency_id: Uuid,
        is_active: bool,
    ) -> Result<Listing, DomainError> {
        info!(is_active, "Setting listing visibility");

        let now = self.clock.now();
        let current = self.owned_listing(listing_id, agency_id).await?;
        self.gate.admit(agency_id, now).await?;

        self.listings.set_active(listing_id, is_active, now).await?;

        Ok(Listing {
            is_active,
            updated_at: now,
            ..current
        })
    }

    /// Removes a listing that no booking references, then its image.
    #[instrument(skip(self), fields(listing_id = %listing_id, agency_id = %agency_id))]
    pub async fn delete_listing(
        &self,
        listing_id: Uuid,
        agency_id: Uuid,
    ) -> Result<(), DomainError> {
        info!("Deleting listing");

        let listing = self.owned_listing(listing_id, agency_id).await?;

        let bookings = self.bookings.count_for_listing(listing_id).await?;
        if bookings > 0 {
            return Err(DomainError::conflict(format!(
                "listing {listing_id} is referenced by {bookings} booking(s)"
            )));
        }

        if !self.listings.delete(listing_id).await? {
            return Err(DomainError::not_found_or_forbidden("Listing", listing_id));
        }

        if let Err(e) = self.media.delete(&listing.image).await {
            error!(
                remote_id = %listing.image.remote_id,
                error = %e,
                "Listing deleted but its image could not be removed; object orphaned"
            );
        }

        info!("Successfully deleted listing");
        Ok(())
    }
}
