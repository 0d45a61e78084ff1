//! Configuration for the adspace module.

use serde::{Deserialize, Serialize};

use crate::domain::booking::TransitionPolicy;

/// Upper bound for `trial_days` and `subscription_days`.
pub const MAX_PERIOD_DAYS: i64 = 3650;

/// Adspace module configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdspaceConfig {
    /// Length of the free trial opened at registration.
    pub trial_days: i64,
    /// Length of one paid subscription period.
    pub subscription_days: i64,
    pub max_plan_name_length: usize,
    pub max_title_length: usize,
    pub max_description_length: usize,
    /// Which agency-side booking transitions are permitted.
    pub booking_transitions: TransitionPolicy,
    pub media: MediaConfig,
}

impl Default for AdspaceConfig {
    fn default() -> Self {
        Self {
            trial_days: 30,
            subscription_days: 30,
            max_plan_name_length: 64,
            max_title_length: 200,
            max_description_length: 2000,
            booking_transitions: TransitionPolicy::default(),
            media: MediaConfig::default(),
        }
    }
}

/// Upload policy per media-bearing field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediaConfig {
    pub listing_image: ImageFieldConfig,
    pub agency_logo: ImageFieldConfig,
    pub verification_document: DocumentFieldConfig,
    /// Uploads larger than this are rejected before reaching the store.
    pub max_upload_bytes: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            listing_image: ImageFieldConfig {
                folder: "adspace/listings".to_owned(),
                width: 800,
                height: 600,
            },
            agency_logo: ImageFieldConfig {
                folder: "adspace/logos".to_owned(),
                width: 300,
                height: 300,
            },
            verification_document: DocumentFieldConfig {
                folder: "adspace/verification".to_owned(),
            },
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Image-only field: always resized to a fixed box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageFieldConfig {
    pub folder: String,
    pub width: u32,
    pub height: u32,
}

/// Document field: image or PDF, stored untransformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentFieldConfig {
    pub folder: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: AdspaceConfig =
            serde_json::from_value(serde_json::json!({ "trial_days": 14 })).unwrap();
        assert_eq!(cfg.trial_days, 14);
        assert_eq!(cfg.subscription_days, 30);
        assert_eq!(cfg.booking_transitions, TransitionPolicy::Directed);
        assert_eq!(cfg.media.listing_image.width, 800);
    }

    #[test]
    fn period_bound_is_ten_years() {
        assert_eq!(MAX_PERIOD_DAYS, 10 * 365);
        assert!(AdspaceConfig::default().subscription_days <= MAX_PERIOD_DAYS);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res: Result<AdspaceConfig, _> =
            serde_json::from_value(serde_json::json!({ "trial_dayz": 14 }));
        assert!(res.is_err());
    }

    #[test]
    fn transition_policy_is_snake_case() {
        let cfg: AdspaceConfig = serde_json::from_value(
            serde_json::json!({ "booking_transitions": "unrestricted" }),
        )
        .unwrap();
        assert_eq!(cfg.booking_transitions, TransitionPolicy::Unrestricted);
    }
}
