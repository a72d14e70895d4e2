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
use object_store::azure::MicrosoftAzureBuilder;
use object_store::ObjectStore;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::info;
use url::Url;

use super::backend::{check_authentication, fetch_text, list_prefix, ObjectBackend};
use super::config::{ProviderConfig, ProviderKind};
use super::error::{StorageError, StorageResult};
use super::object_store::{ObjectStoreBackend, CLIENT_OPTION_KEYS};
use super::path::ParsedPath;
use super::provider::{AuthStatus, ObjectMetadata, StorageService};

/// The parts of an Azure storage connection string this crate understands.
///
/// `AccountName=...;AccountKey=...;BlobEndpoint=...;SharedAccessSignature=...`
/// or `UseDevelopmentStorage=true` for the Azurite emulator. Keys are matched
/// case-insensitively and unknown keys (EndpointSuffix, DefaultEndpointsProtocol,
/// ...) are skipped.
#[derive(Default, PartialEq, Eq)]
pub(crate) struct ConnectionString {
    pub account_name: Option<String>,
    pub account_key: Option<String>,
    pub blob_endpoint: Option<Url>,
    pub sas_pairs: Option<Vec<(String, String)>>,
    pub use_emulator: bool,
}

impl ConnectionString {
    pub(crate) fn parse(connection_string: &str) -> StorageResult<Self> {
        let mut parsed = ConnectionString::default();

        for segment in connection_string
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let (key, value) = segment.split_once('=').ok_or_else(|| {
                StorageError::ConfigError(
                    "Malformed Azure connection string: segment without '='".to_string(),
                )
            })?;

            match key.to_ascii_lowercase().as_str() {
                "accountname" => parsed.account_name = Some(value.to_string()),
                "accountkey" => parsed.account_key = Some(value.to_string()),
                "blobendpoint" => parsed.blob_endpoint = Some(Url::parse(value)?),
                "sharedaccesssignature" => parsed.sas_pairs = Some(parse_sas_token(value)),
                "usedevelopmentstorage" => {
                    parsed.use_emulator = value.eq_ignore_ascii_case("true")
                }
                _ => tracing::debug!("Skipping Azure connection string key: {}", key),
            }
        }

        if !parsed.use_emulator && parsed.account_name.is_none() {
            return Err(StorageError::MissingCredentials(
                "Azure connection string has no AccountName".to_string(),
            ));
        }

        Ok(parsed)
    }

    fn apply(&self, mut builder: MicrosoftAzureBuilder) -> MicrosoftAzureBuilder {
        if self.use_emulator {
            builder = builder.with_use_emulator(true);
        }
        if let Some(account_name) = &self.account_name {
            builder = builder.with_account(account_name);
        }
        if let Some(account_key) = &self.account_key {
            builder = builder.with_access_key(account_key);
        }
        if let Some(pairs) = &self.sas_pairs {
            builder = builder.with_sas_authorization(pairs.clone());
        }
        if let Some(endpoint) = &self.blob_endpoint {
            if endpoint.scheme() == "http" {
                builder = builder.with_allow_http(true);
            }
            builder = builder.with_endpoint(endpoint.as_str().trim_end_matches('/').to_string());
        }
        builder
    }
}

// Key values are secrets.
impl Debug for ConnectionString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionString")
            .field("account_name", &self.account_name)
            .field("blob_endpoint", &self.blob_endpoint.as_ref().map(Url::as_str))
            .field("has_account_key", &self.account_key.is_some())
            .field("has_sas", &self.sas_pairs.is_some())
            .field("use_emulator", &self.use_emulator)
            .finish()
    }
}

/// Split a SAS token (`?sv=...&sig=...`) into query pairs.
fn parse_sas_token(token: &str) -> Vec<(String, String)> {
    token
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(k), Some(v)) => Some((k.to_string(), v.to_string())),
                _ => None,
            }
        })
        .collect()
}

/// Storage service for Azure Blob Storage (and Azurite)
pub struct AzureStorageService {
    config: ProviderConfig,
    backend: Arc<dyn ObjectBackend>,
}

impl AzureStorageService {
    /// Create an Azure service from configuration.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::MissingCredentials` unless the credentials hold
    /// either a connection string or an account name together with an account
    /// key. A malformed connection string is a `ConfigError`.
    pub fn new(config: &ProviderConfig) -> StorageResult<Self> {
        let builder = Self::build_azure_builder(config)?;
        let backend = ObjectStoreBackend::new(
            ProviderKind::Azure,
            config.get_option("container").cloned(),
            move |container| {
                let store = builder
                    .clone()
                    .with_container_name(container)
                    .build()
                    .map_err(|e| {
                        StorageError::ConfigError(format!("Failed to create Azure store: {}", e))
                    })?;
                Ok(Arc::new(store) as Arc<dyn ObjectStore>)
            },
        );

        info!(
            "Created Azure storage service, instance={}",
            config.instance_key("azure")
        );
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    /// Create an Azure service on top of an existing backend.
    pub fn with_backend(config: &ProviderConfig, backend: Arc<dyn ObjectBackend>) -> Self {
        Self {
            config: config.clone(),
            backend,
        }
    }

    /// Split an `azure://container/key` or `az://container/key` URI.
    pub fn parse_path(uri: &str) -> StorageResult<ParsedPath> {
        ProviderKind::Azure.parse_path(uri)
    }

    fn build_azure_builder(config: &ProviderConfig) -> StorageResult<MicrosoftAzureBuilder> {
        let mut builder = MicrosoftAzureBuilder::new()
            .with_client_options(ObjectStoreBackend::build_connection_options(config))
            .with_retry(ObjectStoreBackend::build_retry_options(config));

        let credentials = &config.credentials;
        if let Some(connection_string) = &credentials.connection_string {
            let parsed = ConnectionString::parse(connection_string)?;
            tracing::debug!("Using Azure connection string: {:?}", parsed);
            builder = parsed.apply(builder);
        } else if let (Some(account_name), Some(account_key)) =
            (&credentials.account_name, &credentials.account_key)
        {
            builder = builder
                .with_account(account_name)
                .with_access_key(account_key);
        } else {
            return Err(StorageError::MissingCredentials(
                "Azure credentials must include either connectionString or (accountName and accountKey)"
                    .to_string(),
            ));
        }

        for (key, value) in &config.options {
            match key.as_str() {
                "endpoint" => builder = builder.with_endpoint(value.clone()),
                "allow_http" => {
                    if value.eq_ignore_ascii_case("true") {
                        builder = builder.with_allow_http(true);
                    }
                }
                "container" => (),
                key if CLIENT_OPTION_KEYS.contains(&key) => (),
                _ => {
                    tracing::warn!("Unknown Azure option: {}", key);
                }
            }
        }

        Ok(builder)
    }
}

#[async_trait]
impl StorageService for AzureStorageService {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Azure
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn parse_path(&self, uri: &str) -> StorageResult<ParsedPath> {
        Self::parse_path(uri)
    }

    async fn validate_authentication(&self) -> AuthStatus {
        check_authentication(ProviderKind::Azure, self.backend.as_ref()).await
    }

    async fn get_object(&self, file_path: &str) -> StorageResult<String> {
        fetch_text(ProviderKind::Azure, self.backend.as_ref(), file_path).await
    }

    async fn list_objects(&self, path: &str) -> StorageResult<Vec<ObjectMetadata>> {
        list_prefix(ProviderKind::Azure, self.backend.as_ref(), path).await
    }
}

impl Debug for AzureStorageService {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AzureStorageService(credentials={:?})",
            self.config.credentials
        )
    }
}
