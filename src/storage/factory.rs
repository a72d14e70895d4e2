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

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::{debug, error, info};

use super::aws::AwsStorageService;
use super::azure::AzureStorageService;
use super::config::{ProviderConfig, ProviderKind};
use super::error::{StorageError, StorageResult};
use super::gcp::GcpStorageService;
use super::path::get_provider_from_path;
use super::provider::StorageService;

/// Registry that creates storage services and hands out one shared instance
/// per `"{provider}-{instance}"` key.
///
/// The host application owns the registry and passes it to whoever needs
/// storage. Entries are never evicted; the number of distinct provider/account
/// configurations in a process is expected to be small.
#[derive(Default)]
pub struct StorageRegistry {
    instances: RwLock<HashMap<String, Arc<dyn StorageService>>>,
}

impl StorageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the service for a provider alias and configuration, creating it on
    /// first request.
    ///
    /// The alias is case-insensitive: `s3`/`aws`, `azure`/`azurite` and
    /// `gcp`/`gcs`/`google` are recognized. Services are keyed by the lowercased
    /// alias plus `config.instance_id`, `config.id` or `"default"`.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * The alias is unknown (`StorageError::UnsupportedProvider`)
    /// * The service cannot be constructed, e.g. missing Azure credentials
    ///
    /// # Examples
    ///
    /// ```
    /// use multicloud_storage::storage::{ProviderConfig, StorageRegistry};
    /// use std::sync::Arc;
    ///
    /// let registry = StorageRegistry::new();
    /// let config = ProviderConfig::new().with_region("us-east-1");
    ///
    /// let first = registry.create_storage_service("s3", &config).unwrap();
    /// let second = registry.create_storage_service("S3", &config).unwrap();
    /// assert!(Arc::ptr_eq(&first, &second));
    /// ```
    pub fn create_storage_service(
        &self,
        provider: &str,
        config: &ProviderConfig,
    ) -> StorageResult<Arc<dyn StorageService>> {
        let kind = ProviderKind::from_alias(provider)
            .inspect_err(|e| error!("Cannot create storage service: {}", e))?;
        let instance_key = config.instance_key(&provider.to_lowercase());

        if let Some(service) = self.instances.read().get(&instance_key) {
            debug!("Reusing storage service instance={}", instance_key);
            return Ok(Arc::clone(service));
        }

        let service = Self::build_service(kind, config)
            .inspect_err(|e| error!("Failed to create {} storage service: {}", kind, e))?;

        let mut instances = self.instances.write();
        let service = Arc::clone(instances.entry(instance_key.clone()).or_insert(service));
        info!(
            "Registered storage service instance={}, total={}",
            instance_key,
            instances.len()
        );
        Ok(service)
    }

    /// Get the service for the provider a URI points at.
    ///
    /// Unrecognized schemes are routed to S3, like [`get_provider_from_path`].
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidPath` for an empty URI, otherwise the same
    /// errors as [`StorageRegistry::create_storage_service`].
    pub fn create_for_path(
        &self,
        uri: &str,
        config: &ProviderConfig,
    ) -> StorageResult<Arc<dyn StorageService>> {
        let kind = get_provider_from_path(uri)
            .ok_or_else(|| StorageError::InvalidPath("empty storage path".to_string()))?;
        self.create_storage_service(kind.as_str(), config)
    }

    fn build_service(
        kind: ProviderKind,
        config: &ProviderConfig,
    ) -> StorageResult<Arc<dyn StorageService>> {
        Ok(match kind {
            ProviderKind::Aws => Arc::new(AwsStorageService::new(config)?),
            ProviderKind::Azure => Arc::new(AzureStorageService::new(config)?),
            ProviderKind::Gcp => Arc::new(GcpStorageService::new(config)?),
        })
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.instances.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.read().is_empty()
    }
}

impl Debug for StorageRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let instances = self.instances.read();
        let mut keys: Vec<&String> = instances.keys().collect();
        keys.sort();
        write!(f, "StorageRegistry(instances={:?})", keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::config::Credentials;

    fn azure_config() -> ProviderConfig {
        ProviderConfig::new().with_credentials(Credentials::azure_shared_key("acct", "a2V5"))
    }

    #[test]
    fn test_same_key_returns_same_instance() {
        let registry = StorageRegistry::new();
        let config = ProviderConfig::new().with_instance_id("tenant-a");

        let first = registry.create_storage_service("gcs", &config).unwrap();
        let second = registry.create_storage_service("gcs", &config).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_different_instance_id_returns_new_instance() {
        let registry = StorageRegistry::new();
        let a = registry
            .create_storage_service("azure", &azure_config().with_instance_id("a"))
            .unwrap();
        let b = registry
            .create_storage_service("azure", &azure_config().with_instance_id("b"))
            .unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_id_is_used_when_instance_id_missing() {
        let registry = StorageRegistry::new();
        let by_id = registry
            .create_storage_service("aws", &ProviderConfig::new().with_id("x"))
            .unwrap();
        let default = registry
            .create_storage_service("aws", &ProviderConfig::new())
            .unwrap();

        assert!(!Arc::ptr_eq(&by_id, &default));
        assert_eq!(
            format!("{:?}", registry),
            r#"StorageRegistry(instances=["aws-default", "aws-x"])"#
        );
    }

    #[test]
    fn test_aliases_resolve_to_provider() {
        let registry = StorageRegistry::new();
        let config = azure_config();

        for (alias, expected) in [
            ("s3", ProviderKind::Aws),
            ("AWS", ProviderKind::Aws),
            ("azure", ProviderKind::Azure),
            ("azurite", ProviderKind::Azure),
            ("gcp", ProviderKind::Gcp),
            ("gcs", ProviderKind::Gcp),
            ("Google", ProviderKind::Gcp),
        ] {
            let service = registry.create_storage_service(alias, &config).unwrap();
            assert_eq!(service.provider(), expected, "alias {}", alias);
        }
    }

    #[test]
    fn test_unsupported_provider() {
        let registry = StorageRegistry::new();
        let err = registry
            .create_storage_service("bogus", &ProviderConfig::new())
            .unwrap_err();

        assert!(matches!(err, StorageError::UnsupportedProvider(ref p) if p == "bogus"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_construction_error_is_not_cached() {
        let registry = StorageRegistry::new();
        let err = registry
            .create_storage_service("azure", &ProviderConfig::new())
            .unwrap_err();
        assert!(matches!(err, StorageError::MissingCredentials(_)));
        assert!(registry.is_empty());

        // A later call with usable credentials under the same key succeeds
        let service = registry.create_storage_service("azure", &azure_config());
        assert!(service.is_ok());
        assert_eq!(registry.len(), 1);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_construction_error_is_logged_once() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let err = StorageRegistry::new()
                .create_storage_service("azure", &ProviderConfig::new())
                .unwrap_err();
            assert!(matches!(err, StorageError::MissingCredentials(_)));
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.matches("ERROR").count(), 1, "{}", output);
        assert!(output.contains("Failed to create azure storage service"));
    }

    #[test]
    fn test_create_for_path() {
        let registry = StorageRegistry::new();
        let config = azure_config();

        let azure = registry.create_for_path("az://c/k", &config).unwrap();
        assert_eq!(azure.provider(), ProviderKind::Azure);

        let s3 = registry.create_for_path("bucket/key", &config).unwrap();
        assert_eq!(s3.provider(), ProviderKind::Aws);

        let err = registry.create_for_path("", &config).unwrap_err();
        assert!(matches!(err, StorageError::InvalidPath(_)));
    }
}
