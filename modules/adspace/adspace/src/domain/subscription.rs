//! Subscription clock: derives an agency's entitlement from stored time anchors.
//!
//! Nothing here touches storage or reads the wall clock. Callers capture `now`
//! once per request and pass it to every decision so that successive branches
//! never disagree about the current time.

use adspace_sdk::{Agency, StatusSnapshot, SubscriptionStatus};
use time::{Duration, OffsetDateTime};

use crate::config::MAX_PERIOD_DAYS;

const MILLIS_PER_DAY: u128 = 86_400_000;

/// Trial anchors to persist for an agency that is missing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialWindow {
    pub trial_started_at: OffsetDateTime,
    pub trial_ends_at: OffsetDateTime,
}

/// New paid window produced by an activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renewal {
    pub subscription_ends_at: OffsetDateTime,
    pub plan_name: String,
}

#[derive(Debug, Clone, Copy)]
pub struct SubscriptionClock {
    trial: Duration,
    period: Duration,
}

impl SubscriptionClock {
    /// Both lengths are clamped to `0..=MAX_PERIOD_DAYS`.
    #[must_use]
    pub fn new(trial_days: i64, subscription_days: i64) -> Self {
        Self {
            trial: Duration::days(trial_days.clamp(0, MAX_PERIOD_DAYS)),
            period: Duration::days(subscription_days.clamp(0, MAX_PERIOD_DAYS)),
        }
    }

    /// Trial window opened at registration.
    #[must_use]
    pub fn open_trial(&self, now: OffsetDateTime) -> TrialWindow {
        TrialWindow {
            trial_started_at: now,
            trial_ends_at: now + self.trial,
        }
    }

    /// Anchors a legacy agency should have had, or `None` when nothing is missing.
    ///
    /// The trial start falls back to the agency's creation time, so repeated or
    /// concurrent calls always derive the same values.
    #[must_use]
    pub fn backfill(&self, agency: &Agency) -> Option<TrialWindow> {
        if agency.trial_started_at.is_some() && agency.trial_ends_at.is_some() {
            return None;
        }
        let trial_started_at = agency.trial_started_at.unwrap_or(agency.created_at);
        let trial_ends_at = agency
            .trial_ends_at
            .unwrap_or(trial_started_at + self.trial);
        Some(TrialWindow {
            trial_started_at,
            trial_ends_at,
        })
    }

    /// Entitlement snapshot at `now`. Pure: same anchors and `now` give the same answer.
    #[must_use]
    pub fn status(&self, agency: &Agency, now: OffsetDateTime) -> StatusSnapshot {
        if let Some(ends_at) = agency.subscription_ends_at.filter(|ends| *ends > now) {
            return StatusSnapshot {
                status: SubscriptionStatus::Active,
                plan_name: agency.subscription_plan.clone(),
                ends_at: Some(ends_at),
                days_remaining: days_remaining(ends_at, now),
            };
        }

        match agency.trial_ends_at {
            Some(ends_at) if ends_at > now => StatusSnapshot {
                status: SubscriptionStatus::Trial,
                plan_name: None,
                ends_at: Some(ends_at),
                days_remaining: days_remaining(ends_at, now),
            },
            // A missing trial anchor counts as expired.
            trial_ends_at => StatusSnapshot {
                status: SubscriptionStatus::Expired,
                plan_name: agency.subscription_plan.clone(),
                ends_at: trial_ends_at,
                days_remaining: 0,
            },
        }
    }

    /// Paid window after activating `plan_name` at `now`.
    ///
    /// Unused paid time is kept: the new period starts from the current
    /// `subscription_ends_at` when that is still in the future.
    #[must_use]
    pub fn renew(&self, agency: &Agency, plan_name: &str, now: OffsetDateTime) -> Renewal {
        let base = agency
            .subscription_ends_at
            .filter(|ends| *ends > now)
            .unwrap_or(now);
        Renewal {
            subscription_ends_at: base + self.period,
            plan_name: plan_name.to_owned(),
        }
    }
}

/// Whole days left until `ends_at`, rounded up, never negative.
#[must_use]
pub fn days_remaining(ends_at: OffsetDateTime, now: OffsetDateTime) -> u32 {
    let Ok(millis) = u128::try_from((ends_at - now).whole_milliseconds()) else {
        return 0;
    };
    u32::try_from(millis.div_ceil(MILLIS_PER_DAY)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use uuid::Uuid;

    const D0: OffsetDateTime = datetime!(2024-03-01 09:00 UTC);

    fn clock() -> SubscriptionClock {
        SubscriptionClock::new(30, 30)
    }

    fn agency(
        trial_started_at: Option<OffsetDateTime>,
        trial_ends_at: Option<OffsetDateTime>,
        subscription_ends_at: Option<OffsetDateTime>,
    ) -> Agency {
        Agency {
            id: Uuid::new_v4(),
            name: "Billboard Bros".to_owned(),
            email: "hello@billboard.example".to_owned(),
            description: None,
            website: None,
            is_verified: false,
            logo: None,
            verification_document: None,
            trial_started_at,
            trial_ends_at,
            subscription_ends_at,
            subscription_plan: subscription_ends_at.map(|_| "pro".to_owned()),
            created_at: D0 - Duration::days(100),
            updated_at: D0,
        }
    }

    fn on_trial() -> Agency {
        agency(Some(D0), Some(D0 + Duration::days(30)), None)
    }

    #[test]
    fn trial_with_one_day_left() {
        let snap = clock().status(&on_trial(), D0 + Duration::days(29));
        assert_eq!(snap.status, SubscriptionStatus::Trial);
        assert_eq!(snap.days_remaining, 1);
        assert_eq!(snap.ends_at, Some(D0 + Duration::days(30)));
        assert_eq!(snap.plan_name, None);
    }

    #[test]
    fn trial_expires_after_its_end() {
        let snap = clock().status(&on_trial(), D0 + Duration::days(31));
        assert_eq!(snap.status, SubscriptionStatus::Expired);
        assert_eq!(snap.days_remaining, 0);
        assert_eq!(snap.ends_at, Some(D0 + Duration::days(30)));
    }

    #[test]
    fn trial_end_instant_is_already_expired() {
        let snap = clock().status(&on_trial(), D0 + Duration::days(30));
        assert_eq!(snap.status, SubscriptionStatus::Expired);
    }

    #[test]
    fn status_is_pure() {
        let a = on_trial();
        let now = D0 + Duration::hours(5);
        assert_eq!(clock().status(&a, now), clock().status(&a, now));
    }

    #[test]
    fn partial_day_rounds_up() {
        let snap = clock().status(&on_trial(), D0 + Duration::days(29) + Duration::hours(23));
        assert_eq!(snap.days_remaining, 1);
        let snap = clock().status(&on_trial(), D0 + Duration::hours(1));
        assert_eq!(snap.days_remaining, 30);
    }

    #[test]
    fn paid_window_wins_over_trial() {
        let a = agency(
            Some(D0),
            Some(D0 + Duration::days(30)),
            Some(D0 + Duration::days(45)),
        );
        let snap = clock().status(&a, D0 + Duration::days(40));
        assert_eq!(snap.status, SubscriptionStatus::Active);
        assert_eq!(snap.plan_name.as_deref(), Some("pro"));
        assert_eq!(snap.days_remaining, 5);
    }

    #[test]
    fn lapsed_subscription_and_trial_is_expired_with_trial_end() {
        let a = agency(
            Some(D0),
            Some(D0 + Duration::days(30)),
            Some(D0 + Duration::days(60)),
        );
        let snap = clock().status(&a, D0 + Duration::days(61));
        assert_eq!(snap.status, SubscriptionStatus::Expired);
        assert_eq!(snap.ends_at, Some(D0 + Duration::days(30)));
        assert_eq!(snap.plan_name.as_deref(), Some("pro"));
    }

    #[test]
    fn missing_anchors_are_expired() {
        let snap = clock().status(&agency(None, None, None), D0);
        assert_eq!(snap.status, SubscriptionStatus::Expired);
        assert_eq!(snap.ends_at, None);
        assert_eq!(snap.days_remaining, 0);
    }

    #[test]
    fn backfill_derives_from_creation_time() {
        let a = agency(None, None, None);
        let window = clock().backfill(&a).unwrap();
        assert_eq!(window.trial_started_at, a.created_at);
        assert_eq!(window.trial_ends_at, a.created_at + Duration::days(30));
    }

    #[test]
    fn backfill_keeps_existing_start() {
        let a = agency(Some(D0), None, None);
        let window = clock().backfill(&a).unwrap();
        assert_eq!(window.trial_started_at, D0);
        assert_eq!(window.trial_ends_at, D0 + Duration::days(30));
    }

    #[test]
    fn backfill_is_noop_when_complete() {
        assert_eq!(clock().backfill(&on_trial()), None);
    }

    #[test]
    fn renewal_from_trial_starts_now() {
        let now = D0 + Duration::days(3);
        let renewal = clock().renew(&on_trial(), "basic", now);
        assert_eq!(renewal.subscription_ends_at, now + Duration::days(30));
        assert_eq!(renewal.plan_name, "basic");
    }

    #[test]
    fn renewal_stacks_on_unused_paid_time() {
        let a = agency(Some(D0), Some(D0), Some(D0 + Duration::days(20)));
        let renewal = clock().renew(&a, "pro", D0 + Duration::days(5));
        assert_eq!(renewal.subscription_ends_at, D0 + Duration::days(50));
    }

    #[test]
    fn renewal_after_lapse_restarts_from_now() {
        let a = agency(Some(D0), Some(D0), Some(D0 + Duration::days(20)));
        let now = D0 + Duration::days(25);
        let renewal = clock().renew(&a, "pro", now);
        assert_eq!(renewal.subscription_ends_at, now + Duration::days(30));
    }

    #[test]
    fn oversized_periods_are_clamped() {
        let clock = SubscriptionClock::new(i64::MAX, i64::MAX);
        let window = clock.open_trial(D0);
        assert_eq!(window.trial_ends_at, D0 + Duration::days(MAX_PERIOD_DAYS));

        let renewal = clock.renew(&on_trial(), "pro", D0);
        assert_eq!(renewal.subscription_ends_at, D0 + Duration::days(MAX_PERIOD_DAYS));
    }

    #[test]
    fn days_remaining_never_negative() {
        assert_eq!(days_remaining(D0, D0 + Duration::days(3)), 0);
        assert_eq!(days_remaining(D0, D0), 0);
    }
}
