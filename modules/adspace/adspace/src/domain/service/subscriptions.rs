use adspace_sdk::{Agency, StatusSnapshot};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{Service, required_text};
use crate::domain::error::DomainError;

impl Service {
    #[instrument(skip(self), fields(agency_id = %agency_id))]
    pub async fn get_subscription_status(
        &self,
        agency_id: Uuid,
    ) -> Result<StatusSnapshot, DomainError> {
        debug!("Getting subscription status");

        let now = self.clock.now();
        let (_, snapshot) = self.gate.snapshot(agency_id, now).await?;
        Ok(snapshot)
    }

    /// Activation is a stub for payment: it always succeeds for a known agency.
    #[instrument(skip(self), fields(agency_id = %agency_id))]
    pub async fn activate_subscription(
        &self,
        agency_id: Uuid,
        plan_name: &str,
    ) -> Result<StatusSnapshot, DomainError> {
        info!("Activating subscription");

        let plan_name = required_text("plan_name", plan_name, self.config.max_plan_name_length)?;
        let now = self.clock.now();
        let agency = self.gate.load(agency_id).await?;

        let renewal = self.gate.clock().renew(&agency, &plan_name, now);
        self.agencies
            .set_subscription(agency_id, &renewal, now)
            .await?;

        let agency = Agency {
            subscription_ends_at: Some(renewal.subscription_ends_at),
            subscription_plan: Some(renewal.plan_name),
            updated_at: now,
            ..agency
        };
        let snapshot = self.gate.clock().status(&agency, now);

        info!(
            plan = ?snapshot.plan_name,
            ends_at = ?snapshot.ends_at,
            "Successfully activated subscription"
        );
        Ok(snapshot)
    }
}
