use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use adspace_sdk::{MediaRef, ResourceType};
use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::domain::ports::{ContentPolicy, Destroyed, ObjectStore, StoreError};

const PDF_MAGIC: &[u8] = b"%PDF";

#[derive(Debug, Clone)]
struct StoredObject {
    resource_type: ResourceType,
    policy: ContentPolicy,
    size: usize,
}

/// Process-local object store used for tests and the `memory` backend.
///
/// Uploads and destroys can be made to fail on demand.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    uploads: AtomicUsize,
    fail_uploads: AtomicBool,
    fail_destroys: AtomicBool,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_destroys(&self, fail: bool) {
        self.fail_destroys.store(fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn contains(&self, remote_id: &str) -> bool {
        self.objects.lock().contains_key(remote_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.lock().is_empty()
    }

    /// Number of successful uploads since creation.
    #[must_use]
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn policy_of(&self, remote_id: &str) -> Option<ContentPolicy> {
        self.objects.lock().get(remote_id).map(|o| o.policy)
    }

    #[must_use]
    pub fn size_of(&self, remote_id: &str) -> Option<usize> {
        self.objects.lock().get(remote_id).map(|o| o.size)
    }

    #[must_use]
    pub fn remote_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.objects.lock().keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn upload(
        &self,
        bytes: &[u8],
        folder: &str,
        policy: ContentPolicy,
    ) -> Result<MediaRef, StoreError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("injected upload failure".to_owned()));
        }

        let is_pdf = bytes.starts_with(PDF_MAGIC);
        let resource_type = match policy {
            ContentPolicy::Image { .. } if is_pdf => {
                return Err(StoreError::Rejected {
                    status: 400,
                    message: "Invalid image file".to_owned(),
                });
            }
            ContentPolicy::Image { .. } => ResourceType::Image,
            ContentPolicy::Document if is_pdf => ResourceType::Raw,
            ContentPolicy::Document => ResourceType::Image,
        };

        let remote_id = format!("{folder}/{}", Uuid::new_v4().simple());
        self.objects.lock().insert(
            remote_id.clone(),
            StoredObject {
                resource_type,
                policy,
                size: bytes.len(),
            },
        );
        self.uploads.fetch_add(1, Ordering::SeqCst);

        Ok(MediaRef {
            url: format!("memory://{}/{remote_id}", resource_type.as_str()),
            remote_id,
            resource_type,
        })
    }

    async fn destroy(
        &self,
        remote_id: &str,
        resource_type: ResourceType,
    ) -> Result<Destroyed, StoreError> {
        if self.fail_destroys.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("injected destroy failure".to_owned()));
        }

        let mut objects = self.objects.lock();
        // Mirrors remote stores: the wrong resource type does not find the object.
        match objects.get(remote_id) {
            Some(obj) if obj.resource_type == resource_type => {
                objects.remove(remote_id);
                Ok(Destroyed::Deleted)
            }
            _ => Ok(Destroyed::NotFound),
        }
    }
}
