//! Access gate for inventory-mutating operations.
//!
//! Listing create, update and visibility toggle pass through [`AccessGate::admit`].
//! Booking status changes and profile reads do not.

use std::sync::Arc;

use adspace_sdk::{Agency, StatusSnapshot};
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repo::AgenciesRepository;
use crate::domain::subscription::SubscriptionClock;

/// Proof that an agency was entitled at the captured `now`.
#[derive(Debug, Clone)]
pub struct GatePass {
    pub agency: Agency,
    pub snapshot: StatusSnapshot,
}

#[derive(Clone)]
pub struct AccessGate {
    agencies: Arc<dyn AgenciesRepository>,
    clock: SubscriptionClock,
}

impl AccessGate {
    #[must_use]
    pub fn new(agencies: Arc<dyn AgenciesRepository>, clock: SubscriptionClock) -> Self {
        Self { agencies, clock }
    }

    #[must_use]
    pub fn clock(&self) -> &SubscriptionClock {
        &self.clock
    }

    /// Self-heals agencies created before trial anchors existed.
    ///
    /// # Errors
    /// Returns `DomainError::Database` if the patch cannot be written.
    pub async fn ensure_fields(&self, agency: Agency) -> Result<Agency, DomainError> {
        let Some(window) = self.clock.backfill(&agency) else {
            return Ok(agency);
        };

        info!(agency_id = %agency.id, "Backfilling trial anchors");
        self.agencies.set_trial_window(agency.id, window).await?;

        Ok(Agency {
            trial_started_at: Some(window.trial_started_at),
            trial_ends_at: Some(window.trial_ends_at),
            ..agency
        })
    }

    /// Loads an agency with its trial anchors guaranteed present.
    ///
    /// # Errors
    /// `NotFound` for an unknown agency, `Database` on storage failure.
    pub async fn load(&self, agency_id: Uuid) -> Result<Agency, DomainError> {
        let agency = self
            .agencies
            .get(agency_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Agency", agency_id))?;
        self.ensure_fields(agency).await
    }

    /// # Errors
    /// Same as [`AccessGate::load`].
    pub async fn snapshot(
        &self,
        agency_id: Uuid,
        now: OffsetDateTime,
    ) -> Result<(Agency, StatusSnapshot), DomainError> {
        let agency = self.load(agency_id).await?;
        let snapshot = self.clock.status(&agency, now);
        Ok((agency, snapshot))
    }

    /// Admits the agency unless its derived status is `expired`.
    ///
    /// # Errors
    /// `Gated` with the computed snapshot when expired, plus the errors of
    /// [`AccessGate::load`].
    pub async fn admit(
        &self,
        agency_id: Uuid,
        now: OffsetDateTime,
    ) -> Result<GatePass, DomainError> {
        let (agency, snapshot) = self.snapshot(agency_id, now).await?;

        if !snapshot.status.is_entitled() {
            warn!(agency_id = %agency_id, "Rejected inventory mutation: subscription expired");
            return Err(DomainError::gated(agency_id, snapshot));
        }

        debug!(
            agency_id = %agency_id,
            status = %snapshot.status,
            days_remaining = snapshot.days_remaining,
            "Agency admitted"
        );
        Ok(GatePass { agency, snapshot })
    }
}
