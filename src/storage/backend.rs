// Copyright 2025 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.
//
// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

//! The provider client seam.
//!
//! Storage services never talk to the network themselves; they hand parsed
//! container/key pairs to an [`ObjectBackend`]. Production services use
//! [`ObjectStoreBackend`](super::object_store::ObjectStoreBackend), tests plug
//! in fakes.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, error, warn};

use super::config::ProviderKind;
use super::error::{StorageError, StorageResult};
use super::provider::{AuthStatus, ObjectMetadata};

/// Minimal client capabilities a storage service needs from a provider.
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    /// List the containers reachable with the configured credentials.
    ///
    /// Used as the lightweight call behind authentication checks.
    async fn list_containers(&self) -> StorageResult<Vec<String>>;

    /// Fetch the full content of `key` in `container`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ObjectNotFound` if the key does not exist.
    async fn get_object(&self, container: &str, key: &str) -> StorageResult<Bytes>;

    /// List every object in `container` whose key starts with `prefix`.
    async fn list_objects(&self, container: &str, prefix: &str)
        -> StorageResult<Vec<ObjectMetadata>>;
}

pub(crate) async fn check_authentication(
    provider: ProviderKind,
    backend: &dyn ObjectBackend,
) -> AuthStatus {
    match backend.list_containers().await {
        Ok(containers) => {
            debug!(
                "{} authentication verified, container_count={}",
                provider,
                containers.len()
            );
            AuthStatus::verified()
        }
        Err(e) => {
            warn!("{} authentication check failed: {}", provider, e);
            AuthStatus::Failed {
                error: e.to_string(),
            }
        }
    }
}

pub(crate) async fn fetch_text(
    provider: ProviderKind,
    backend: &dyn ObjectBackend,
    file_path: &str,
) -> StorageResult<String> {
    read_text(provider, backend, file_path)
        .await
        .inspect_err(|e| error!("Error while getting {} object: {}", provider, e))
}

async fn read_text(
    provider: ProviderKind,
    backend: &dyn ObjectBackend,
    file_path: &str,
) -> StorageResult<String> {
    let parsed = provider.parse_path(file_path)?;
    if parsed.path.is_empty() {
        return Err(StorageError::InvalidPath(format!(
            "No object key in {} path: {}",
            provider, file_path
        )));
    }

    let bytes = backend
        .get_object(&parsed.container_name, &parsed.path)
        .await?;
    debug!("Read {} bytes from {}", bytes.len(), file_path);
    Ok(String::from_utf8(bytes.to_vec())?)
}

pub(crate) async fn list_prefix(
    provider: ProviderKind,
    backend: &dyn ObjectBackend,
    path: &str,
) -> StorageResult<Vec<ObjectMetadata>> {
    list_sorted(provider, backend, path)
        .await
        .inspect_err(|e| error!("Error while listing {} objects: {}", provider, e))
}

async fn list_sorted(
    provider: ProviderKind,
    backend: &dyn ObjectBackend,
    path: &str,
) -> StorageResult<Vec<ObjectMetadata>> {
    let parsed = provider.parse_path(path)?;
    let mut objects = backend
        .list_objects(&parsed.container_name, &parsed.path)
        .await?;
    objects.sort_by(|a, b| a.name.cmp(&b.name));
    debug!("Listed count={} objects at location={}", objects.len(), path);
    Ok(objects)
}


#[cfg(test)]
mod tests {
    use super::testing::FailingBackend;
    use super::*;
    use std::sync::atomic::Ordering;
    use std::sync::Mutex;

    /// Records the container/key pairs it is asked for.
    #[derive(Default)]
    struct RecordingBackend {
        requests: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ObjectBackend for RecordingBackend {
        async fn list_containers(&self) -> StorageResult<Vec<String>> {
            Ok(vec!["a".to_string(), "b".to_string()])
        }

        async fn get_object(&self, container: &str, key: &str) -> StorageResult<Bytes> {
            self.requests
                .lock()
                .unwrap()
                .push((container.to_string(), key.to_string()));
            if key == "binary.bin" {
                return Ok(Bytes::from_static(&[0xff, 0x00, 0xfe]));
            }
            Ok(Bytes::from(format!("{}:{}", container, key)))
        }

        async fn list_objects(
            &self,
            container: &str,
            prefix: &str,
        ) -> StorageResult<Vec<ObjectMetadata>> {
            self.requests
                .lock()
                .unwrap()
                .push((container.to_string(), prefix.to_string()));
            Ok(["z.txt", "a.txt", "m.txt"]
                .iter()
                .map(|name| ObjectMetadata {
                    name: format!("{}{}", prefix, name),
                    size: Some(1),
                    last_modified: None,
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn test_check_authentication_success() {
        let backend = RecordingBackend::default();
        let status = check_authentication(ProviderKind::Aws, &backend).await;
        assert_eq!(status, AuthStatus::verified());
    }

    #[tokio::test]
    async fn test_check_authentication_failure_is_a_value() {
        let backend = FailingBackend::new("InvalidAccessKeyId");
        let status = check_authentication(ProviderKind::Aws, &backend).await;

        match status {
            AuthStatus::Failed { error } => assert!(error.contains("InvalidAccessKeyId")),
            other => panic!("Expected failed status, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_text_routes_container_and_key() {
        let backend = RecordingBackend::default();
        let text = fetch_text(ProviderKind::Azure, &backend, "az://docs/a/b.txt")
            .await
            .unwrap();

        assert_eq!(text, "docs:a/b.txt");
        assert_eq!(
            backend.requests.lock().unwrap().as_slice(),
            &[("docs".to_string(), "a/b.txt".to_string())]
        );
    }

    #[tokio::test]
    async fn test_fetch_text_requires_key() {
        let backend = RecordingBackend::default();
        let err = fetch_text(ProviderKind::Aws, &backend, "s3://bucket/")
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::InvalidPath(_)));
        assert!(backend.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_text_rejects_invalid_utf8() {
        let backend = RecordingBackend::default();
        let err = fetch_text(ProviderKind::Gcp, &backend, "gs://b/binary.bin")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::DecodeError(_)));
    }

    #[tokio::test]
    async fn test_fetch_text_propagates_provider_error() {
        let backend = FailingBackend::new("503 Slow Down");
        let err = fetch_text(ProviderKind::Aws, &backend, "s3://b/k")
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::ProviderError(_)));
        assert!(err.to_string().contains("503 Slow Down"));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_list_prefix_sorts_by_name() {
        let backend = RecordingBackend::default();
        let objects = list_prefix(ProviderKind::Gcp, &backend, "gcp://bucket/logs/")
            .await
            .unwrap();

        let names: Vec<_> = objects.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["logs/a.txt", "logs/m.txt", "logs/z.txt"]);
    }

    #[tokio::test]
    async fn test_list_prefix_invalid_path() {
        let backend = RecordingBackend::default();
        let err = list_prefix(ProviderKind::Gcp, &backend, "gs://")
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::InvalidPath(_)));
        assert!(backend.requests.lock().unwrap().is_empty());
    }
}
