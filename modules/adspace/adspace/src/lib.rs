//! Adspace Module Implementation
//!
//! Ad-placement marketplace control plane: agency subscriptions, gated listing
//! inventory with image lifecycle, and the company/agency booking workflow.
//!
//! The public API is defined in `adspace-sdk` and re-exported here.

pub use adspace_sdk::{AdspaceClientV1, AdspaceError};

pub mod config;
pub mod local_client;

pub use config::AdspaceConfig;
pub use local_client::LocalClient;

#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
