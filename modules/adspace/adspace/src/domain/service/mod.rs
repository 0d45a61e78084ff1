//! Domain service layer - business logic and rules.
//!
//! ## Architecture
//!
//! One [`Service`] with per-resource submodules:
//! - `agencies` - registration, profile, logo and verification document
//! - `subscriptions` - entitlement snapshot and activation
//! - `listings` - gated inventory mutations with image lifecycle
//! - `bookings` - booking workflow and the top-agencies read model
//!
//! ## Layering Rules
//!
//! The domain layer:
//! - **MAY** import: `adspace_sdk` (contract types), domain ports
//! - **MUST NOT** import: `api::*` or `infra::*`
//!
//! Every operation reads the clock once and threads that `now` through all
//! of its decisions and writes.

use std::sync::Arc;

use crate::config::AdspaceConfig;
use crate::domain::booking::BookingWorkflow;
use crate::domain::clock::Clock;
use crate::domain::error::DomainError;
use crate::domain::gate::AccessGate;
use crate::domain::media::MediaLifecycleManager;
use crate::domain::ports::ObjectStore;
use crate::domain::repo::{
    AgenciesRepository, BookingsRepository, CompaniesRepository, ListingsRepository,
};
use crate::domain::subscription::SubscriptionClock;

mod agencies;
mod bookings;
mod listings;
mod subscriptions;

/// Upper bound for the top-agencies read model.
pub const MAX_TOP_AGENCIES: u32 = 50;

/// Repository set the service runs against.
#[derive(Clone)]
pub struct Repositories {
    pub agencies: Arc<dyn AgenciesRepository>,
    pub companies: Arc<dyn CompaniesRepository>,
    pub listings: Arc<dyn ListingsRepository>,
    pub bookings: Arc<dyn BookingsRepository>,
}

#[derive(Clone)]
pub struct Service {
    agencies: Arc<dyn AgenciesRepository>,
    companies: Arc<dyn CompaniesRepository>,
    listings: Arc<dyn ListingsRepository>,
    bookings: Arc<dyn BookingsRepository>,
    gate: AccessGate,
    workflow: BookingWorkflow,
    media: MediaLifecycleManager,
    clock: Arc<dyn Clock>,
    config: AdspaceConfig,
}

impl Service {
    #[must_use]
    pub fn new(
        repos: Repositories,
        store: Arc<dyn ObjectStore>,
        clock: Arc<dyn Clock>,
        config: AdspaceConfig,
    ) -> Self {
        let subscription_clock =
            SubscriptionClock::new(config.trial_days, config.subscription_days);
        let gate = AccessGate::new(repos.agencies.clone(), subscription_clock);
        let workflow =
            BookingWorkflow::new(config.booking_transitions, config.max_description_length);
        let media = MediaLifecycleManager::new(store, config.media.clone());

        Self {
            agencies: repos.agencies,
            companies: repos.companies,
            listings: repos.listings,
            bookings: repos.bookings,
            gate,
            workflow,
            media,
            clock,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdspaceConfig {
        &self.config
    }
}

/// Trims `value` and checks it is non-empty and at most `max` characters.
fn required_text(field: &str, value: &str, max: usize) -> Result<String, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    bounded(field, value, max)?;
    Ok(value.to_owned())
}

fn bounded(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    let len = value.chars().count();
    if len > max {
        return Err(DomainError::validation(
            field,
            format!("too long: {len} characters (max: {max})"),
        ));
    }
    Ok(())
}

fn check_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
            Ok(email.to_lowercase())
        }
        _ => Err(DomainError::validation("email", "not a valid email address")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims_and_bounds() {
        assert_eq!(required_text("title", "  Bus shelter ", 20).unwrap(), "Bus shelter");
        assert!(required_text("title", "   ", 20).is_err());
        assert!(required_text("title", "abcdef", 5).is_err());
    }

    #[test]
    fn email_shape() {
        assert_eq!(check_email(" Sales@Agency.example ").unwrap(), "sales@agency.example");
        assert!(check_email("nobody").is_err());
        assert!(check_email("@agency.example").is_err());
        assert!(check_email("x@localhost").is_err());
    }
}
