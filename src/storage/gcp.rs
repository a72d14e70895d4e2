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
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::ObjectStore;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::{debug, info};

use super::backend::{check_authentication, fetch_text, list_prefix, ObjectBackend};
use super::config::{Credentials, ProviderConfig, ProviderKind};
use super::error::{StorageError, StorageResult};
use super::object_store::{ObjectStoreBackend, CLIENT_OPTION_KEYS};
use super::path::ParsedPath;
use super::provider::{AuthStatus, ObjectMetadata, StorageService};

/// Storage service for Google Cloud Storage
pub struct GcpStorageService {
    config: ProviderConfig,
    backend: Arc<dyn ObjectBackend>,
}

impl GcpStorageService {
    /// Create a GCS service from configuration.
    ///
    /// Credentials are picked in this order: `keyFilename`, then an inline
    /// `projectId`/`clientEmail`/`privateKey` service account, then whatever the
    /// environment provides (`GOOGLE_SERVICE_ACCOUNT`, application default
    /// credentials, metadata server).
    pub fn new(config: &ProviderConfig) -> StorageResult<Self> {
        let builder = Self::build_gcs_builder(config)?;
        let backend = ObjectStoreBackend::new(
            ProviderKind::Gcp,
            config.get_option("container").cloned(),
            move |bucket| {
                let store = builder
                    .clone()
                    .with_bucket_name(bucket)
                    .build()
                    .map_err(|e| {
                        StorageError::ConfigError(format!("Failed to create GCS store: {}", e))
                    })?;
                Ok(Arc::new(store) as Arc<dyn ObjectStore>)
            },
        );

        info!(
            "Created GCS storage service, project={:?}, instance={}",
            config.credentials.project_id,
            config.instance_key("gcp")
        );
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    /// Create a GCS service on top of an existing backend.
    pub fn with_backend(config: &ProviderConfig, backend: Arc<dyn ObjectBackend>) -> Self {
        Self {
            config: config.clone(),
            backend,
        }
    }

    /// Split a `gs://bucket/key` or `gcp://bucket/key` URI.
    pub fn parse_path(uri: &str) -> StorageResult<ParsedPath> {
        ProviderKind::Gcp.parse_path(uri)
    }

    /// Render credentials as a service account key document.
    ///
    /// Inline credentials need project id, client email and private key. A
    /// custom `endpoint` becomes the key's `gcs_base_url`; with no inline
    /// credentials it renders an anonymous key for an emulator such as
    /// fake-gcs-server. Returns `None` when there is nothing to render.
    pub(crate) fn service_account_key(
        credentials: &Credentials,
        endpoint: Option<&str>,
    ) -> StorageResult<Option<String>> {
        let mut key = match (
            &credentials.project_id,
            &credentials.client_email,
            &credentials.private_key,
        ) {
            (Some(project_id), Some(client_email), Some(private_key)) => serde_json::json!({
                "type": "service_account",
                "project_id": project_id,
                "private_key_id": credentials.private_key_id.clone().unwrap_or_default(),
                "private_key": private_key,
                "client_email": client_email,
            }),
            _ if endpoint.is_some() => serde_json::json!({
                "private_key_id": "",
                "private_key": "",
                "client_email": "",
                "disable_oauth": true,
            }),
            _ => return Ok(None),
        };
        if let Some(endpoint) = endpoint {
            key["gcs_base_url"] = serde_json::Value::from(endpoint.trim_end_matches('/'));
        }

        serde_json::to_string(&key).map(Some).map_err(|e| {
            StorageError::ConfigError(format!("Failed to encode GCP service account: {}", e))
        })
    }

    fn build_gcs_builder(config: &ProviderConfig) -> StorageResult<GoogleCloudStorageBuilder> {
        let mut builder = GoogleCloudStorageBuilder::from_env()
            .with_client_options(ObjectStoreBackend::build_connection_options(config))
            .with_retry(ObjectStoreBackend::build_retry_options(config));

        let credentials = &config.credentials;
        let endpoint = config.get_option("endpoint").map(String::as_str);
        if let Some(key_filename) = &credentials.key_filename {
            if endpoint.is_some() {
                tracing::warn!("GCS endpoint option is ignored when keyFilename is set");
            }
            builder = builder.with_service_account_path(key_filename);
        } else if let Some(key) = Self::service_account_key(credentials, endpoint)? {
            builder = builder.with_service_account_key(key);
        } else {
            debug!("No explicit GCP credentials, using ambient credentials");
        }

        for key in config.options.keys() {
            match key.as_str() {
                "container" | "allow_http" | "endpoint" => (),
                key if CLIENT_OPTION_KEYS.contains(&key) => (),
                _ => {
                    tracing::warn!("Unknown GCS option: {}", key);
                }
            }
        }

        Ok(builder)
    }
}

#[async_trait]
impl StorageService for GcpStorageService {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Gcp
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn parse_path(&self, uri: &str) -> StorageResult<ParsedPath> {
        Self::parse_path(uri)
    }

    async fn validate_authentication(&self) -> AuthStatus {
        check_authentication(ProviderKind::Gcp, self.backend.as_ref()).await
    }

    async fn get_object(&self, file_path: &str) -> StorageResult<String> {
        fetch_text(ProviderKind::Gcp, self.backend.as_ref(), file_path).await
    }

    async fn list_objects(&self, path: &str) -> StorageResult<Vec<ObjectMetadata>> {
        list_prefix(ProviderKind::Gcp, self.backend.as_ref(), path).await
    }
}

impl Debug for GcpStorageService {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GcpStorageService(credentials={:?})",
            self.config.credentials
        )
    }
}
