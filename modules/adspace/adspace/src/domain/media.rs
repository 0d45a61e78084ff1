//! Media lifecycle: keeps exactly one live remote object per media-bearing field.
//!
//! The database and the object store share no transaction, so every write is an
//! ordered sequence with compensation:
//!
//! 1. upload the new object,
//! 2. commit the new reference on the owning record,
//! 3. only then destroy the displaced object.
//!
//! A failed step 2 destroys the object from step 1 before the error is returned.
//! A failed step 3 leaves an orphan that is logged and reported to the caller.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use adspace_sdk::{MediaRef, MediaUpload};
use tracing::{debug, error, warn};

use crate::config::MediaConfig;
use crate::domain::error::DomainError;
use crate::domain::ports::{ContentPolicy, Destroyed, ObjectStore};

/// Entity fields that reference a remote object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaField {
    ListingImage,
    AgencyLogo,
    VerificationDocument,
}

impl fmt::Display for MediaField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ListingImage => "listing image",
            Self::AgencyLogo => "agency logo",
            Self::VerificationDocument => "verification document",
        })
    }
}

/// Result of a replace: the committed value plus any object that could not be removed.
#[derive(Debug)]
pub struct Replaced<T> {
    pub value: T,
    pub media: MediaRef,
    pub stale: Option<StaleObject>,
}

/// Displaced object that is still present in the store.
#[derive(Debug)]
pub struct StaleObject {
    pub media: MediaRef,
    pub error: DomainError,
}

#[derive(Clone)]
pub struct MediaLifecycleManager {
    store: Arc<dyn ObjectStore>,
    config: MediaConfig,
}

impl MediaLifecycleManager {
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>, config: MediaConfig) -> Self {
        Self { store, config }
    }

    fn target(&self, field: MediaField) -> (&str, ContentPolicy) {
        match field {
            MediaField::ListingImage => {
                let c = &self.config.listing_image;
                (
                    c.folder.as_str(),
                    ContentPolicy::Image {
                        width: c.width,
                        height: c.height,
                    },
                )
            }
            MediaField::AgencyLogo => {
                let c = &self.config.agency_logo;
                (
                    c.folder.as_str(),
                    ContentPolicy::Image {
                        width: c.width,
                        height: c.height,
                    },
                )
            }
            MediaField::VerificationDocument => (
                self.config.verification_document.folder.as_str(),
                ContentPolicy::Document,
            ),
        }
    }

    /// Rejects uploads that can never succeed, before any I/O happens.
    ///
    /// # Errors
    /// `Validation` for empty or oversized payloads.
    pub fn check_upload(&self, field: MediaField, upload: &MediaUpload) -> Result<(), DomainError> {
        if upload.bytes.is_empty() {
            return Err(DomainError::validation(field.to_string(), "file is empty"));
        }
        if upload.bytes.len() > self.config.max_upload_bytes {
            return Err(DomainError::validation(
                field.to_string(),
                format!(
                    "file too large: {} bytes (max: {})",
                    upload.bytes.len(),
                    self.config.max_upload_bytes
                ),
            ));
        }
        Ok(())
    }

    /// Uploads `upload` and hands the new reference to `commit`, which must
    /// durably store it on the owning record.
    ///
    /// # Errors
    /// `Validation` for an unusable payload, `Storage` if the upload fails.
    /// When `commit` fails the upload is destroyed first; a `Conflict` or
    /// not-found commit error is then returned as is, anything else (or a
    /// failed destroy) becomes `StorageInconsistency`.
    pub async fn create<T, F, Fut>(
        &self,
        field: MediaField,
        upload: &MediaUpload,
        commit: F,
    ) -> Result<(T, MediaRef), DomainError>
    where
        F: FnOnce(MediaRef) -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        self.check_upload(field, upload)?;
        let (folder, policy) = self.target(field);

        let media = self
            .store
            .upload(&upload.bytes, folder, policy)
            .await
            .map_err(|e| DomainError::storage(format!("{field} upload failed: {e}")))?;
        debug!(%field, remote_id = %media.remote_id, "Uploaded media object");

        match commit(media.clone()).await {
            Ok(value) => Ok((value, media)),
            Err(commit_err) => {
                error!(
                    %field,
                    remote_id = %media.remote_id,
                    error = %commit_err,
                    "Record commit failed after upload; removing uploaded object"
                );
                let outcome = match self.delete(&media).await {
                    Ok(()) if is_clean_rejection(&commit_err) => return Err(commit_err),
                    Ok(()) => "removed",
                    Err(e) => {
                        error!(
                            %field,
                            remote_id = %media.remote_id,
                            error = %e,
                            "Compensating delete failed; object is orphaned"
                        );
                        "orphaned"
                    }
                };
                Err(DomainError::storage_inconsistency(format!(
                    "{field} commit failed after upload ({commit_err}); \
                     uploaded object {} {outcome}",
                    media.remote_id
                )))
            }
        }
    }

    /// Uploads a new object, commits it, and only then destroys `previous`.
    ///
    /// A commit that lost a race with another writer must fail (see
    /// [`MediaSwap`](crate::domain::repo::MediaSwap)), so `previous` is only
    /// ever destroyed by the writer that displaced it.
    ///
    /// # Errors
    /// Same as [`MediaLifecycleManager::create`]; `previous` is untouched on error.
    /// Failing to destroy `previous` is not an error: it is returned in
    /// [`Replaced::stale`].
    pub async fn replace<T, F, Fut>(
        &self,
        field: MediaField,
        upload: &MediaUpload,
        previous: Option<&MediaRef>,
        commit: F,
    ) -> Result<Replaced<T>, DomainError>
    where
        F: FnOnce(MediaRef) -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        let (value, media) = self.create(field, upload, commit).await?;

        let stale = match previous {
            Some(old) if old.remote_id != media.remote_id => {
                self.delete(old).await.err().map(|error| {
                    warn!(
                        %field,
                        remote_id = %old.remote_id,
                        error = %error,
                        "Displaced object could not be deleted; leaving orphan"
                    );
                    StaleObject {
                        media: old.clone(),
                        error,
                    }
                })
            }
            _ => None,
        };

        Ok(Replaced {
            value,
            media,
            stale,
        })
    }

    /// Destroys a referenced object. An already-absent object counts as deleted.
    ///
    /// # Errors
    /// `StorageInconsistency` for any store failure other than "not found".
    pub async fn delete(&self, media: &MediaRef) -> Result<(), DomainError> {
        match self
            .store
            .destroy(&media.remote_id, media.resource_type)
            .await
        {
            Ok(Destroyed::Deleted) => {
                debug!(remote_id = %media.remote_id, "Deleted media object");
                Ok(())
            }
            Ok(Destroyed::NotFound) => {
                debug!(remote_id = %media.remote_id, "Media object already absent");
                Ok(())
            }
            Err(e) => Err(DomainError::storage_inconsistency(format!(
                "failed to delete {}: {e}",
                media.remote_id
            ))),
        }
    }
}

/// Commit errors that leave nothing behind once the upload is destroyed.
fn is_clean_rejection(err: &DomainError) -> bool {
    matches!(
        err,
        DomainError::Conflict { .. }
            | DomainError::NotFound { .. }
            | DomainError::NotFoundOrForbidden { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::media::InMemoryStore;
    use adspace_sdk::ResourceType;

    fn manager(store: &Arc<InMemoryStore>) -> MediaLifecycleManager {
        MediaLifecycleManager::new(store.clone(), MediaConfig::default())
    }

    fn png() -> MediaUpload {
        MediaUpload::new(vec![0x89, b'P', b'N', b'G', 1, 2, 3])
    }

    #[tokio::test]
    async fn create_commits_new_reference() {
        let store = Arc::new(InMemoryStore::new());
        let (committed, media) = manager(&store)
            .create(MediaField::ListingImage, &png(), |m| async move {
                Ok::<_, DomainError>(m.remote_id)
            })
            .await
            .unwrap();

        assert_eq!(committed, media.remote_id);
        assert!(store.contains(&media.remote_id));
        assert_eq!(
            store.policy_of(&media.remote_id),
            Some(ContentPolicy::Image {
                width: 800,
                height: 600
            })
        );
    }

    #[tokio::test]
    async fn failed_commit_removes_upload() {
        let store = Arc::new(InMemoryStore::new());
        let err = manager(&store)
            .create(MediaField::AgencyLogo, &png(), |_| async {
                Err::<(), _>(DomainError::database("connection reset"))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::StorageInconsistency { .. }));
        assert!(err.to_string().contains("removed"));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn lost_race_is_returned_after_cleanup() {
        let store = Arc::new(InMemoryStore::new());
        let previous = store
            .upload(b"old", "adspace/logos", ContentPolicy::Document)
            .await
            .unwrap();

        let err = manager(&store)
            .replace(MediaField::AgencyLogo, &png(), Some(&previous), |_| async {
                Err::<(), _>(DomainError::conflict("logo changed concurrently"))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Conflict { .. }));
        assert_eq!(store.remote_ids(), vec![previous.remote_id]);
    }

    #[tokio::test]
    async fn lost_race_with_undeletable_upload_is_inconsistent() {
        let store = Arc::new(InMemoryStore::new());
        store.fail_destroys(true);
        let err = manager(&store)
            .create(MediaField::ListingImage, &png(), |_| async {
                Err::<(), _>(DomainError::conflict("image changed concurrently"))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::StorageInconsistency { .. }));
        assert!(err.to_string().contains("orphaned"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn failed_upload_never_commits() {
        let store = Arc::new(InMemoryStore::new());
        store.fail_uploads(true);
        let mut committed = false;
        let err = manager(&store)
            .create(MediaField::ListingImage, &png(), |_| {
                committed = true;
                async { Ok::<_, DomainError>(()) }
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Storage { .. }));
        assert!(!committed);
    }

    #[tokio::test]
    async fn empty_upload_is_rejected_before_io() {
        let store = Arc::new(InMemoryStore::new());
        let err = manager(&store)
            .create(MediaField::ListingImage, &MediaUpload::default(), |_| async {
                Ok::<_, DomainError>(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
        assert_eq!(store.upload_count(), 0);
    }

    #[tokio::test]
    async fn replace_deletes_previous_after_commit() {
        let store = Arc::new(InMemoryStore::new());
        let mgr = manager(&store);
        let ((), old) = mgr
            .create(MediaField::ListingImage, &png(), |_| async { Ok(()) })
            .await
            .unwrap();

        let replaced = mgr
            .replace(MediaField::ListingImage, &png(), Some(&old), |_| async {
                Ok::<_, DomainError>(())
            })
            .await
            .unwrap();

        assert!(replaced.stale.is_none());
        assert!(store.contains(&replaced.media.remote_id));
        assert!(!store.contains(&old.remote_id));
    }

    #[tokio::test]
    async fn replace_with_failed_commit_keeps_previous() {
        let store = Arc::new(InMemoryStore::new());
        let mgr = manager(&store);
        let ((), old) = mgr
            .create(MediaField::ListingImage, &png(), |_| async { Ok(()) })
            .await
            .unwrap();

        let err = mgr
            .replace(MediaField::ListingImage, &png(), Some(&old), |_| async {
                Err::<(), _>(DomainError::database("disk full"))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::StorageInconsistency { .. }));
        assert!(store.contains(&old.remote_id));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn replace_reports_undeletable_previous() {
        let store = Arc::new(InMemoryStore::new());
        let mgr = manager(&store);
        let ((), old) = mgr
            .create(MediaField::AgencyLogo, &png(), |_| async { Ok(()) })
            .await
            .unwrap();

        store.fail_destroys(true);
        let replaced = mgr
            .replace(MediaField::AgencyLogo, &png(), Some(&old), |_| async {
                Ok::<_, DomainError>(())
            })
            .await
            .unwrap();

        let stale = replaced.stale.unwrap();
        assert_eq!(stale.media, old);
        assert!(store.contains(&old.remote_id));
        assert!(store.contains(&replaced.media.remote_id));
    }

    #[tokio::test]
    async fn delete_tolerates_absent_object() {
        let store = Arc::new(InMemoryStore::new());
        let ghost = MediaRef {
            url: "https://cdn.example/ghost.jpg".to_owned(),
            remote_id: "adspace/listings/ghost".to_owned(),
            resource_type: ResourceType::Image,
        };
        manager(&store).delete(&ghost).await.unwrap();
    }

    #[tokio::test]
    async fn delete_propagates_other_failures() {
        let store = Arc::new(InMemoryStore::new());
        let mgr = manager(&store);
        let ((), media) = mgr
            .create(MediaField::ListingImage, &png(), |_| async { Ok(()) })
            .await
            .unwrap();
        store.fail_destroys(true);

        let err = mgr.delete(&media).await.unwrap_err();
        assert!(matches!(err, DomainError::StorageInconsistency { .. }));
    }

    #[tokio::test]
    async fn documents_are_stored_untransformed() {
        let store = Arc::new(InMemoryStore::new());
        let pdf = MediaUpload::new(b"%PDF-1.7 body".to_vec());
        let ((), media) = manager(&store)
            .create(MediaField::VerificationDocument, &pdf, |_| async { Ok(()) })
            .await
            .unwrap();

        assert_eq!(store.policy_of(&media.remote_id), Some(ContentPolicy::Document));
        assert_eq!(media.resource_type, ResourceType::Raw);
    }
}
