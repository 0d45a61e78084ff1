//! Cloudinary-compatible object store over the signed HTTP upload API.

use std::time::Duration;

use adspace_sdk::{MediaRef, ResourceType};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use tracing::{debug, instrument};

use crate::domain::ports::{ContentPolicy, Destroyed, ObjectStore, StoreError};

/// Connection settings for [`CloudinaryStore`].
#[derive(Debug, Clone)]
pub struct CloudinarySettings {
    pub base_url: String,
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: SecretString,
    pub timeout: Duration,
}

pub struct CloudinaryStore {
    client: reqwest::Client,
    settings: CloudinarySettings,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    resource_type: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryStore {
    /// # Errors
    /// `StoreError::Transport` if the HTTP client cannot be built.
    pub fn new(settings: CloudinarySettings) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self, resource_type: &str, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{resource_type}/{action}",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.cloud_name
        )
    }

    fn signature(&self, params: &[(&str, &str)]) -> String {
        sign(params, self.settings.api_secret.expose_secret())
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, StoreError> {
        let response = request.send().await.map_err(map_transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(StoreError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// Request signature: `k=v` pairs sorted by key, joined by `&`, secret appended, SHA-256 hex.
fn sign(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by_key(|(k, _)| *k);
    let payload = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn map_transport(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Timeout
    } else {
        StoreError::Transport(e.to_string())
    }
}

#[async_trait]
impl ObjectStore for CloudinaryStore {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(
        &self,
        bytes: &[u8],
        folder: &str,
        policy: ContentPolicy,
    ) -> Result<MediaRef, StoreError> {
        let timestamp = OffsetDateTime::now_utc().unix_timestamp().to_string();
        let (resource_type, transformation) = match policy {
            ContentPolicy::Image { width, height } => {
                ("image", format!("c_fill,w_{width},h_{height}"))
            }
            ContentPolicy::Document => ("auto", String::new()),
        };

        let signature = self.signature(&[
            ("folder", folder),
            ("timestamp", &timestamp),
            ("transformation", &transformation),
        ]);

        let mut form = reqwest::multipart::Form::new()
            .part("file", reqwest::multipart::Part::bytes(bytes.to_vec()).file_name("upload"))
            .text("api_key", self.settings.api_key.clone())
            .text("folder", folder.to_owned())
            .text("timestamp", timestamp)
            .text("signature_algorithm", "sha256")
            .text("signature", signature);
        if !transformation.is_empty() {
            form = form.text("transformation", transformation);
        }

        let response = self
            .send(
                self.client
                    .post(self.endpoint(resource_type, "upload"))
                    .multipart(form),
            )
            .await?;
        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

        let resource_type = ResourceType::from_store(&body.resource_type).ok_or_else(|| {
            StoreError::InvalidResponse(format!(
                "unsupported resource type '{}'",
                body.resource_type
            ))
        })?;
        debug!(
            public_id = %body.public_id,
            resource_type = resource_type.as_str(),
            "Uploaded object"
        );

        Ok(MediaRef {
            url: body.secure_url,
            remote_id: body.public_id,
            resource_type,
        })
    }

    #[instrument(skip(self))]
    async fn destroy(
        &self,
        remote_id: &str,
        resource_type: ResourceType,
    ) -> Result<Destroyed, StoreError> {
        let timestamp = OffsetDateTime::now_utc().unix_timestamp().to_string();
        let signature = self.signature(&[("public_id", remote_id), ("timestamp", &timestamp)]);

        let form = [
            ("public_id", remote_id),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.settings.api_key.as_str()),
            ("signature_algorithm", "sha256"),
            ("signature", signature.as_str()),
        ];
        let response = self
            .send(
                self.client
                    .post(self.endpoint(resource_type.as_str(), "destroy"))
                    .form(&form),
            )
            .await?;
        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

        match body.result.as_str() {
            "ok" => Ok(Destroyed::Deleted),
            "not found" => Ok(Destroyed::NotFound),
            other => Err(StoreError::InvalidResponse(format!(
                "unexpected destroy result '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn store(server: &MockServer) -> CloudinaryStore {
        CloudinaryStore::new(CloudinarySettings {
            base_url: server.base_url(),
            cloud_name: "demo".to_owned(),
            api_key: "key".to_owned(),
            api_secret: SecretString::from("secret"),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn signature_ignores_param_order_and_empty_values() {
        let a = sign(&[("timestamp", "1"), ("folder", "f")], "s");
        let b = sign(&[("folder", "f"), ("transformation", ""), ("timestamp", "1")], "s");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, sign(&[("folder", "f"), ("timestamp", "1")], "other"));
    }

    #[tokio::test]
    async fn image_upload_uses_image_endpoint() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/v1_1/demo/image/upload");
            then.status(200).json_body(json!({
                "secure_url": "https://res.example/demo/image/upload/adspace/listings/abc.jpg",
                "public_id": "adspace/listings/abc",
                "resource_type": "image"
            }));
        });

        let media = store(&server)
            .upload(
                b"\x89PNG",
                "adspace/listings",
                ContentPolicy::Image {
                    width: 800,
                    height: 600,
                },
            )
            .await
            .unwrap();

        mock.assert();
        assert_eq!(media.remote_id, "adspace/listings/abc");
        assert_eq!(media.resource_type, ResourceType::Image);
    }

    #[tokio::test]
    async fn document_upload_records_reported_resource_type() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/v1_1/demo/auto/upload");
            then.status(200).json_body(json!({
                "secure_url": "https://res.example/demo/raw/upload/doc.pdf",
                "public_id": "adspace/verification/doc.pdf",
                "resource_type": "raw"
            }));
        });

        let media = store(&server)
            .upload(b"%PDF-1.7", "adspace/verification", ContentPolicy::Document)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(media.resource_type, ResourceType::Raw);
    }

    #[tokio::test]
    async fn rejected_upload_surfaces_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1_1/demo/image/upload");
            then.status(401).body("Invalid Signature");
        });

        let err = store(&server)
            .upload(b"x", "f", ContentPolicy::Image { width: 1, height: 1 })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected { status: 401, .. }));
    }

    #[tokio::test]
    async fn destroy_maps_not_found() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/v1_1/demo/raw/destroy");
            then.status(200).json_body(json!({ "result": "not found" }));
        });

        let outcome = store(&server)
            .destroy("adspace/verification/doc.pdf", ResourceType::Raw)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(outcome, Destroyed::NotFound);
    }

    #[tokio::test]
    async fn destroy_ok() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1_1/demo/image/destroy");
            then.status(200).json_body(json!({ "result": "ok" }));
        });

        let outcome = store(&server)
            .destroy("adspace/listings/abc", ResourceType::Image)
            .await
            .unwrap();
        assert_eq!(outcome, Destroyed::Deleted);
    }

    #[tokio::test]
    async fn destroy_server_error_is_not_tolerated() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1_1/demo/image/destroy");
            then.status(500).body("boom");
        });

        let err = store(&server)
            .destroy("adspace/listings/abc", ResourceType::Image)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected { status: 500, .. }));
    }
}
