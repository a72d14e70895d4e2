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

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use super::error::{StorageError, StorageResult};

/// Storage provider kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// AWS S3 or any S3-compatible store
    #[serde(rename = "s3")]
    Aws,
    /// Azure Blob Storage
    Azure,
    /// Google Cloud Storage
    Gcp,
}

impl ProviderKind {
    /// Resolve a provider alias, case-insensitively.
    ///
    /// `s3`/`aws` map to AWS, `azure`/`azurite` to Azure and
    /// `gcp`/`gcs`/`google` to GCP.
    pub fn from_alias(alias: &str) -> StorageResult<Self> {
        match alias.to_lowercase().as_str() {
            "s3" | "aws" => Ok(ProviderKind::Aws),
            "azure" | "azurite" => Ok(ProviderKind::Azure),
            "gcp" | "gcs" | "google" => Ok(ProviderKind::Gcp),
            _ => Err(StorageError::UnsupportedProvider(alias.to_string())),
        }
    }

    /// URI schemes this provider accepts, in matching order.
    pub fn schemes(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::Aws => &["s3://"],
            ProviderKind::Azure => &["azure://", "az://"],
            ProviderKind::Gcp => &["gs://", "gcp://"],
        }
    }

    /// Canonical provider name ("s3", "azure" or "gcp").
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Aws => "s3",
            ProviderKind::Azure => "azure",
            ProviderKind::Gcp => "gcp",
        }
    }
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Provider credentials.
///
/// Only the fields relevant to the chosen provider are read:
///
/// - AWS: `accessKey`, `secretKey`, optional `sessionToken`
/// - Azure: `connectionString`, or `accountName` + `accountKey`
/// - GCP: `keyFilename`, or `projectId` + `clientEmail` + `privateKey`
///   (optionally `privateKeyId`); nothing at all selects ambient credentials
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_id: Option<String>,
}

impl Credentials {
    /// AWS access key pair.
    pub fn aws(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: Some(access_key.into()),
            secret_key: Some(secret_key.into()),
            ..Default::default()
        }
    }

    /// Azure connection string.
    pub fn azure_connection_string(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: Some(connection_string.into()),
            ..Default::default()
        }
    }

    /// Azure shared key.
    pub fn azure_shared_key(account_name: impl Into<String>, account_key: impl Into<String>) -> Self {
        Self {
            account_name: Some(account_name.into()),
            account_key: Some(account_key.into()),
            ..Default::default()
        }
    }

    /// GCP service account key file.
    pub fn gcp_key_file(key_filename: impl Into<String>) -> Self {
        Self {
            key_filename: Some(key_filename.into()),
            ..Default::default()
        }
    }

    /// GCP service account given inline.
    pub fn gcp_service_account(
        project_id: impl Into<String>,
        client_email: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            project_id: Some(project_id.into()),
            client_email: Some(client_email.into()),
            private_key: Some(private_key.into()),
            ..Default::default()
        }
    }
}

// Secrets must never end up in logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        fn redact(value: &Option<String>) -> Option<&'static str> {
            value.as_ref().map(|_| "***")
        }

        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &redact(&self.secret_key))
            .field("session_token", &redact(&self.session_token))
            .field("connection_string", &redact(&self.connection_string))
            .field("account_name", &self.account_name)
            .field("account_key", &redact(&self.account_key))
            .field("key_filename", &self.key_filename)
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &redact(&self.private_key))
            .field("private_key_id", &self.private_key_id)
            .finish()
    }
}

/// Configuration handed to a storage service constructor.
///
/// Credentials vary per provider; `region` only matters for S3. The
/// `instance_id` (or, failing that, `id`) tells apart several services of
/// the same provider living in one [`StorageRegistry`](super::StorageRegistry).
///
/// Client tuning lives in `options`, which starts out with
/// [`ProviderConfig::default_options`]. Recognized keys:
///
/// - timeout, connect_timeout, pool_idle_timeout: seconds ("0"/"disabled" turns
///   the first two off)
/// - pool_max_idle_per_host
/// - max_retries, retry_timeout: retry policy of the underlying client
/// - endpoint: custom endpoint (S3-compatible stores, Azurite, fake GCS)
/// - allow_http: "true" to permit plain HTTP
/// - container: bucket/container listed by the authentication check
///
/// # Examples
///
/// ```
/// use multicloud_storage::storage::{Credentials, ProviderConfig};
///
/// let config = ProviderConfig::new()
///     .with_credentials(Credentials::aws("ACCESS_KEY", "SECRET_KEY"))
///     .with_region("us-east-1")
///     .with_instance_id("analytics")
///     .with_option("container", "my-bucket");
///
/// assert_eq!(config.instance_key("s3"), "s3-analytics");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    #[serde(default)]
    pub credentials: Credentials,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default = "ProviderConfig::default_options")]
    pub options: HashMap<String, String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderConfig {
    /// Create an empty configuration with default client options.
    pub fn new() -> Self {
        Self {
            credentials: Credentials::default(),
            region: None,
            instance_id: None,
            id: None,
            options: Self::default_options(),
        }
    }

    /// Parse a configuration from its JSON form.
    ///
    /// ```
    /// use multicloud_storage::storage::ProviderConfig;
    ///
    /// let config = ProviderConfig::from_json(
    ///     r#"{"credentials":{"accountName":"acct","accountKey":"a2V5"},"instanceId":"tenant-a"}"#,
    /// )
    /// .unwrap();
    /// assert_eq!(config.credentials.account_name.as_deref(), Some("acct"));
    /// ```
    pub fn from_json(json: &str) -> StorageResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| StorageError::ConfigError(format!("Invalid provider config: {}", e)))
    }

    /// Default client options shared by all providers.
    pub fn default_options() -> HashMap<String, String> {
        [
            ("timeout", "120"),
            ("connect_timeout", "30"),
            ("max_retries", "10"),
            ("retry_timeout", "180"),
            ("pool_idle_timeout", "15"),
            ("pool_max_idle_per_host", "5"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_instance_id(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_id = Some(instance_id.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a client option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn get_option(&self, key: &str) -> Option<&String> {
        self.options.get(key)
    }

    /// Registry key for this configuration under the given provider alias.
    ///
    /// Empty ids count as absent.
    pub fn instance_key(&self, provider: &str) -> String {
        let instance = [self.instance_id.as_deref(), self.id.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or("default");
        format!("{}-{}", provider, instance)
    }
}
