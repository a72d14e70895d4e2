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

use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::ObjectStore;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::info;

use super::backend::{check_authentication, fetch_text, list_prefix, ObjectBackend};
use super::config::{ProviderConfig, ProviderKind};
use super::error::{StorageError, StorageResult};
use super::object_store::{ObjectStoreBackend, CLIENT_OPTION_KEYS};
use super::path::ParsedPath;
use super::provider::{AuthStatus, ObjectMetadata, StorageService};

/// Storage service for AWS S3 and S3-compatible stores
pub struct AwsStorageService {
    config: ProviderConfig,
    backend: Arc<dyn ObjectBackend>,
}

impl AwsStorageService {
    /// Create an S3 service from configuration.
    ///
    /// Credentials and region not given in the config are taken from the
    /// standard `AWS_*` environment variables. Buckets are connected lazily, so
    /// construction does not touch the network.
    pub fn new(config: &ProviderConfig) -> StorageResult<Self> {
        let builder = Self::build_s3_builder(config);
        let backend = ObjectStoreBackend::new(
            ProviderKind::Aws,
            config.get_option("container").cloned(),
            move |bucket| {
                let store = builder
                    .clone()
                    .with_bucket_name(bucket)
                    .build()
                    .map_err(|e| {
                        StorageError::ConfigError(format!("Failed to create S3 store: {}", e))
                    })?;
                Ok(Arc::new(store) as Arc<dyn ObjectStore>)
            },
        );

        info!(
            "Created S3 storage service, region={:?}, instance={}",
            config.region,
            config.instance_key("s3")
        );
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    /// Create an S3 service on top of an existing backend.
    pub fn with_backend(config: &ProviderConfig, backend: Arc<dyn ObjectBackend>) -> Self {
        Self {
            config: config.clone(),
            backend,
        }
    }

    /// Split an `s3://bucket/key` URI.
    pub fn parse_path(uri: &str) -> StorageResult<ParsedPath> {
        ProviderKind::Aws.parse_path(uri)
    }

    fn build_s3_builder(config: &ProviderConfig) -> AmazonS3Builder {
        let mut builder = AmazonS3Builder::from_env()
            .with_client_options(ObjectStoreBackend::build_connection_options(config))
            .with_retry(ObjectStoreBackend::build_retry_options(config));

        let credentials = &config.credentials;
        if let Some(access_key) = &credentials.access_key {
            builder = builder.with_access_key_id(access_key);
        }
        if let Some(secret_key) = &credentials.secret_key {
            builder = builder.with_secret_access_key(secret_key);
        }
        if let Some(token) = &credentials.session_token {
            builder = builder.with_token(token);
        }
        if let Some(region) = &config.region {
            builder = builder.with_region(region);
        }

        for (key, value) in &config.options {
            match key.as_str() {
                "endpoint" => builder = builder.with_endpoint(value),
                "allow_http" => {
                    if value.eq_ignore_ascii_case("true") {
                        builder = builder.with_allow_http(true);
                    }
                }
                "container" => (),
                key if CLIENT_OPTION_KEYS.contains(&key) => (),
                _ => {
                    tracing::warn!("Unknown AWS S3 option: {}", key);
                }
            }
        }

        builder
    }
}

#[async_trait]
impl StorageService for AwsStorageService {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Aws
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn parse_path(&self, uri: &str) -> StorageResult<ParsedPath> {
        Self::parse_path(uri)
    }

    async fn validate_authentication(&self) -> AuthStatus {
        check_authentication(ProviderKind::Aws, self.backend.as_ref()).await
    }

    async fn get_object(&self, file_path: &str) -> StorageResult<String> {
        fetch_text(ProviderKind::Aws, self.backend.as_ref(), file_path).await
    }

    async fn list_objects(&self, path: &str) -> StorageResult<Vec<ObjectMetadata>> {
        list_prefix(ProviderKind::Aws, self.backend.as_ref(), path).await
    }
}

impl Debug for AwsStorageService {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AwsStorageService(region={:?}, credentials={:?})",
            self.config.region, self.config.credentials
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::backend::testing::FailingBackend;
    use crate::storage::config::Credentials;
    use object_store::memory::InMemory;
    use object_store::path::Path as ObjectPath;
    use object_store::{ObjectStoreExt, PutPayload};
    use std::collections::HashMap;

    async fn in_memory_service() -> AwsStorageService {
        let store = InMemory::new();
        for (key, body) in [
            ("reports/2024/q1.csv", "id,total\n1,10\n"),
            ("reports/2024/q2.csv", "id,total\n2,20\n"),
            ("reports/summary.txt", "two quarters"),
            ("reports/100%.txt", "complete"),
        ] {
            store
                .put(&ObjectPath::parse(key).unwrap(), PutPayload::from_static(body.as_bytes()))
                .await
                .unwrap();
        }

        let mut stores: HashMap<String, Arc<dyn ObjectStore>> = HashMap::new();
        stores.insert("my-bucket".to_string(), Arc::new(store));
        let backend = ObjectStoreBackend::from_stores(ProviderKind::Aws, stores);
        AwsStorageService::with_backend(&ProviderConfig::new(), Arc::new(backend))
    }

    #[test]
    fn test_parse_path() {
        let parsed = AwsStorageService::parse_path("s3://my-bucket/a/b/c.txt").unwrap();
        assert_eq!(parsed.container_name, "my-bucket");
        assert_eq!(parsed.path, "a/b/c.txt");
    }

    #[test]
    fn test_new_does_not_need_network() {
        let config = ProviderConfig::new()
            .with_credentials(Credentials::aws("AKIAEXAMPLE", "secret"))
            .with_region("us-east-1")
            .with_option("endpoint", "http://localhost:9000")
            .with_option("allow_http", "true")
            .with_option("unexpected", "value");

        let service = AwsStorageService::new(&config).unwrap();
        assert_eq!(service.provider(), ProviderKind::Aws);
        assert_eq!(service.config().region.as_deref(), Some("us-east-1"));
    }

    #[test]
    fn test_debug_hides_secret() {
        let config =
            ProviderConfig::new().with_credentials(Credentials::aws("AKIAEXAMPLE", "hunter2"));
        let service = AwsStorageService::new(&config).unwrap();
        let debug_str = format!("{:?}", service);

        assert!(debug_str.contains("AwsStorageService"));
        assert!(!debug_str.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_get_object() {
        let service = in_memory_service().await;
        let content = service
            .get_object("s3://my-bucket/reports/summary.txt")
            .await
            .unwrap();
        assert_eq!(content, "two quarters");
    }

    #[tokio::test]
    async fn test_get_object_missing() {
        let service = in_memory_service().await;
        let err = service
            .get_object("s3://my-bucket/reports/q3.csv")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::ObjectNotFound(_)));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_objects() {
        let service = in_memory_service().await;
        let objects = service
            .list_objects("s3://my-bucket/reports/2024/")
            .await
            .unwrap();

        let names: Vec<_> = objects.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["reports/2024/q1.csv", "reports/2024/q2.csv"]);
        assert_eq!(objects[0].size, Some(14));
    }

    #[tokio::test]
    async fn test_listed_key_with_percent_round_trips() {
        let service = in_memory_service().await;
        let objects = service.list_objects("s3://my-bucket/reports/1").await.unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].name, "reports/100%.txt");

        let content = service
            .get_object(&format!("s3://my-bucket/{}", objects[0].name))
            .await
            .unwrap();
        assert_eq!(content, "complete");
    }

    #[tokio::test]
    async fn test_validate_authentication_success() {
        let service = in_memory_service().await;
        assert_eq!(service.validate_authentication().await, AuthStatus::verified());
    }

    #[tokio::test]
    async fn test_validate_authentication_failure() {
        let service = AwsStorageService::with_backend(
            &ProviderConfig::new(),
            Arc::new(FailingBackend::new("The AWS Access Key Id you provided does not exist")),
        );

        let status = service.validate_authentication().await;
        assert_eq!(
            serde_json::to_value(&status).unwrap()["status"],
            serde_json::json!("failed")
        );
        match status {
            AuthStatus::Failed { error } => assert!(error.contains("Access Key Id")),
            other => panic!("Expected failed status, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_validate_authentication_without_container() {
        let service = AwsStorageService::new(&ProviderConfig::new()).unwrap();
        let status = service.validate_authentication().await;
        assert!(!status.is_success());
    }

    #[tokio::test]
    async fn test_list_objects_provider_error_propagates() {
        let service = AwsStorageService::with_backend(
            &ProviderConfig::new(),
            Arc::new(FailingBackend::new("AccessDenied")),
        );
        let err = service.list_objects("s3://b/prefix").await.unwrap_err();
        assert!(matches!(err, StorageError::ProviderError(_)));
    }
}
