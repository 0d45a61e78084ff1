use adspace_sdk::{Agency, AgencyProfilePatch, Company, MediaUpload, NewAgency, NewCompany};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{Service, bounded, check_email, required_text};
use crate::domain::error::DomainError;
use crate::domain::media::MediaField;
use crate::domain::repo::MediaSwap;

const MAX_NAME_LENGTH: usize = 200;
const MAX_WEBSITE_LENGTH: usize = 2048;

impl Service {
    #[instrument(skip(self, new_agency), fields(email = %new_agency.email))]
    pub async fn register_agency(&self, new_agency: NewAgency) -> Result<Agency, DomainError> {
        info!("Registering agency");

        let name = required_text("name", &new_agency.name, MAX_NAME_LENGTH)?;
        let email = check_email(&new_agency.email)?;
        let now = self.clock.now();
        let window = self.gate.clock().open_trial(now);

        let agency = Agency {
            id: new_agency.id.unwrap_or_else(Uuid::now_v7),
            name,
            email,
            description: None,
            website: None,
            is_verified: false,
            logo: None,
            verification_document: None,
            trial_started_at: Some(window.trial_started_at),
            trial_ends_at: Some(window.trial_ends_at),
            subscription_ends_at: None,
            subscription_plan: None,
            created_at: now,
            updated_at: now,
        };
        self.agencies.insert(&agency).await?;

        info!(
            agency_id = %agency.id,
            trial_ends_at = %window.trial_ends_at,
            "Successfully registered agency"
        );
        Ok(agency)
    }

    #[instrument(skip(self, new_company), fields(email = %new_company.email))]
    pub async fn register_company(&self, new_company: NewCompany) -> Result<Company, DomainError> {
        info!("Registering company");

        let name = required_text("name", &new_company.name, MAX_NAME_LENGTH)?;
        let email = check_email(&new_company.email)?;
        let now = self.clock.now();

        let company = Company {
            id: new_company.id.unwrap_or_else(Uuid::now_v7),
            name,
            email,
            created_at: now,
            updated_at: now,
        };
        self.companies.insert(&company).await?;

        info!(company_id = %company.id, "Successfully registered company");
        Ok(company)
    }

    async fn existing_agency(&self, agency_id: Uuid) -> Result<Agency, DomainError> {
        self.agencies
            .get(agency_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Agency", agency_id))
    }

    fn check_profile_patch(
        &self,
        patch: AgencyProfilePatch,
    ) -> Result<AgencyProfilePatch, DomainError> {
        let name = patch
            .name
            .map(|name| required_text("name", &name, MAX_NAME_LENGTH))
            .transpose()?;

        let description = patch.description.map(|d| d.trim().to_owned());
        if let Some(description) = &description {
            bounded("description", description, self.config.max_description_length)?;
        }

        let website = patch.website.map(|w| w.trim().to_owned());
        if let Some(website) = website.as_deref().filter(|w| !w.is_empty()) {
            bounded("website", website, MAX_WEBSITE_LENGTH)?;
            if !(website.starts_with("https://") || website.starts_with("http://")) {
                return Err(DomainError::validation(
                    "website",
                    "must be an http(s) URL",
                ));
            }
        }

        Ok(AgencyProfilePatch {
            name,
            description,
            website,
        })
    }

    /// Profile text patch plus optional logo replacement. Not subscription-gated.
    #[instrument(
        skip(self, patch, logo),
        fields(agency_id = %agency_id, has_logo = logo.is_some())
    )]
    pub async fn update_agency_profile(
        &self,
        agency_id: Uuid,
        patch: AgencyProfilePatch,
        logo: Option<MediaUpload>,
    ) -> Result<Agency, DomainError> {
        info!("Updating agency profile");

        let patch = self.check_profile_patch(patch)?;
        if patch == AgencyProfilePatch::default() && logo.is_none() {
            return Err(DomainError::validation("body", "no changes supplied"));
        }

        let now = self.clock.now();
        let agency = self.existing_agency(agency_id).await?;
        let patched = Agency {
            name: patch.name.clone().unwrap_or_else(|| agency.name.clone()),
            description: patch
                .description
                .clone()
                .or_else(|| agency.description.clone()),
            website: patch.website.clone().or_else(|| agency.website.clone()),
            updated_at: now,
            ..agency.clone()
        };

        let Some(upload) = logo else {
            self.agencies
                .update_profile(agency_id, &patch, None, now)
                .await?;
            info!("Successfully updated agency profile");
            return self.existing_agency(agency_id).await;
        };

        let agencies = &self.agencies;
        let patch = &patch;
        let previous_logo = agency.logo.as_ref();
        let replaced = self
            .media
            .replace(
                MediaField::AgencyLogo,
                &upload,
                previous_logo,
                |media| async move {
                    let swap = MediaSwap::new(previous_logo, &media);
                    agencies
                        .update_profile(agency_id, patch, Some(swap), now)
                        .await?;
                    Ok::<_, DomainError>(media)
                },
            )
            .await?;

        if let Some(stale) = &replaced.stale {
            warn!(
                remote_id = %stale.media.remote_id,
                error = %stale.error,
                "Agency logo replaced; previous object orphaned"
            );
        }
        info!(
            remote_id = %replaced.media.remote_id,
            "Successfully updated agency profile and logo"
        );
        Ok(Agency {
            logo: Some(replaced.value),
            ..patched
        })
    }

    /// Replaces the verification document. Verification itself is decided elsewhere.
    #[instrument(skip(self, document), fields(agency_id = %agency_id))]
    pub async fn upload_verification_document(
        &self,
        agency_id: Uuid,
        document: MediaUpload,
    ) -> Result<Agency, DomainError> {
        info!("Uploading verification document");

        let now = self.clock.now();
        let agency = self.existing_agency(agency_id).await?;
        self.media
            .check_upload(MediaField::VerificationDocument, &document)?;

        let agencies = &self.agencies;
        let previous_document = agency.verification_document.as_ref();
        let replaced = self
            .media
            .replace(
                MediaField::VerificationDocument,
                &document,
                previous_document,
                |media| async move {
                    let swap = MediaSwap::new(previous_document, &media);
                    agencies
                        .set_verification_document(agency_id, swap, now)
                        .await?;
                    Ok::<_, DomainError>(media)
                },
            )
            .await?;

        if let Some(stale) = &replaced.stale {
            warn!(
                remote_id = %stale.media.remote_id,
                error = %stale.error,
                "Verification document replaced; previous object orphaned"
            );
        }
        info!(
            remote_id = %replaced.media.remote_id,
            resource_type = replaced.media.resource_type.as_str(),
            "Successfully stored verification document"
        );
        Ok(Agency {
            verification_document: Some(replaced.value),
            updated_at: now,
            ..agency
        })
    }
}
