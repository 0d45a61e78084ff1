//! Outbound ports implemented by the infrastructure layer.

use adspace_sdk::{MediaRef, ResourceType};
use async_trait::async_trait;
use thiserror::Error;

/// How the object store must treat an upload. Chosen per field, never by
/// looking at the bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentPolicy {
    /// Image only, resized to a fixed box.
    Image { width: u32, height: u32 },
    /// Image or PDF, stored as uploaded; the store reports the resource type.
    Document,
}

/// Outcome of a destroy call that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destroyed {
    Deleted,
    NotFound,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("object store request timed out")]
    Timeout,

    #[error("object store transport error: {0}")]
    Transport(String),

    #[error("unexpected object store response: {0}")]
    InvalidResponse(String),
}

/// Remote binary object storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(
        &self,
        bytes: &[u8],
        folder: &str,
        policy: ContentPolicy,
    ) -> Result<MediaRef, StoreError>;

    /// `resource_type` must be the one recorded at upload time.
    async fn destroy(
        &self,
        remote_id: &str,
        resource_type: ResourceType,
    ) -> Result<Destroyed, StoreError>;
}
