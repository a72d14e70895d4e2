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
use bytes::Bytes;
use futures::stream::StreamExt;
use object_store::path::Path as ObjectPath;
use object_store::{ClientOptions, ObjectStore, ObjectStoreExt, RetryConfig};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::backend::ObjectBackend;
use super::config::{ProviderConfig, ProviderKind};
use super::error::{StorageError, StorageResult};
use super::provider::ObjectMetadata;

/// Options consumed by `build_connection_options` and `build_retry_options`.
pub(crate) const CLIENT_OPTION_KEYS: [&str; 6] = [
    "timeout",
    "connect_timeout",
    "max_retries",
    "retry_timeout",
    "pool_idle_timeout",
    "pool_max_idle_per_host",
];

type StoreConnector = dyn Fn(&str) -> StorageResult<Arc<dyn ObjectStore>> + Send + Sync;

/// [`ObjectBackend`] on top of the `object_store` crate.
///
/// `object_store` clients are bound to a single bucket, so the backend keeps a
/// connector that builds a store for a container on first use and caches it.
/// Bucket enumeration is not available, so authentication checks list the root
/// of the container configured under the `container` option, or of the first
/// container already accessed when none is configured.
pub struct ObjectStoreBackend {
    provider: ProviderKind,
    auth_container: Option<String>,
    connector: Box<StoreConnector>,
    stores: RwLock<HashMap<String, Arc<dyn ObjectStore>>>,
}

impl ObjectStoreBackend {
    /// Create a backend that builds stores on demand with `connector`.
    pub fn new<F>(provider: ProviderKind, auth_container: Option<String>, connector: F) -> Self
    where
        F: Fn(&str) -> StorageResult<Arc<dyn ObjectStore>> + Send + Sync + 'static,
    {
        Self {
            provider,
            auth_container,
            connector: Box::new(connector),
            stores: RwLock::new(HashMap::new()),
        }
    }

    /// Create a backend over a fixed set of pre-built stores, keyed by container.
    ///
    /// Containers outside the map are rejected. The authentication check lists
    /// the first cached container in name order.
    ///
    /// ```
    /// use multicloud_storage::storage::{ObjectStoreBackend, ProviderKind};
    /// use object_store::{memory::InMemory, ObjectStore};
    /// use std::collections::HashMap;
    /// use std::sync::Arc;
    ///
    /// let mut stores: HashMap<String, Arc<dyn ObjectStore>> = HashMap::new();
    /// stores.insert("reports".to_string(), Arc::new(InMemory::new()));
    /// let backend = ObjectStoreBackend::from_stores(ProviderKind::Gcp, stores);
    /// ```
    pub fn from_stores(
        provider: ProviderKind,
        stores: HashMap<String, Arc<dyn ObjectStore>>,
    ) -> Self {
        let known: Vec<String> = stores.keys().cloned().collect();
        let backend = Self::new(provider, None, move |container| {
            Err(StorageError::ConfigError(format!(
                "No store registered for container '{}' (known: {:?})",
                container, known
            )))
        });
        *backend.stores.write() = stores;
        backend
    }

    /// Get the store for a container, building it on first use.
    fn store(&self, container: &str) -> StorageResult<Arc<dyn ObjectStore>> {
        if let Some(store) = self.stores.read().get(container) {
            return Ok(Arc::clone(store));
        }

        let store = (self.connector)(container)?;
        info!("Created {} store for container={}", self.provider, container);

        let mut stores = self.stores.write();
        Ok(Arc::clone(
            stores.entry(container.to_string()).or_insert(store),
        ))
    }

    /// Build connection options from configuration.
    ///
    /// Unparseable values are ignored and leave the client default in place.
    pub(crate) fn build_connection_options(config: &ProviderConfig) -> ClientOptions {
        let mut client_options = ClientOptions::default();
        if let Some(timeout_str) = config.options.get("timeout") {
            if timeout_str == "0" || timeout_str == "disabled" {
                client_options = client_options.with_timeout_disabled();
            } else if let Ok(sec) = timeout_str.parse::<u64>() {
                client_options = client_options.with_timeout(Duration::from_secs(sec))
            }
        };
        if let Some(connect_timeout_str) = config.options.get("connect_timeout") {
            if connect_timeout_str == "0" || connect_timeout_str == "disabled" {
                client_options = client_options.with_connect_timeout_disabled();
            } else if let Ok(sec) = connect_timeout_str.parse::<u64>() {
                client_options = client_options.with_connect_timeout(Duration::from_secs(sec))
            }
        }
        if let Some(pool_idle_timeout_str) = config.options.get("pool_idle_timeout") {
            if let Ok(sec) = pool_idle_timeout_str.parse::<u64>() {
                client_options = client_options.with_pool_idle_timeout(Duration::from_secs(sec))
            }
        }
        if let Some(pool_max_idle_per_host_str) = config.options.get("pool_max_idle_per_host") {
            if let Ok(max_idle) = pool_max_idle_per_host_str.parse::<usize>() {
                client_options = client_options.with_pool_max_idle_per_host(max_idle)
            }
        }
        if let Some(allow_http) = config.options.get("allow_http") {
            client_options = client_options.with_allow_http(allow_http.eq_ignore_ascii_case("true"));
        }
        client_options
    }

    /// Build the underlying client's retry policy from configuration.
    pub(crate) fn build_retry_options(config: &ProviderConfig) -> RetryConfig {
        let default_retry_config = RetryConfig::default();
        let max_retries = config
            .options
            .get("max_retries")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(default_retry_config.max_retries);
        let retry_timeout = config
            .options
            .get("retry_timeout")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(default_retry_config.retry_timeout);
        RetryConfig {
            backoff: Default::default(),
            max_retries,
            retry_timeout,
        }
    }
}

/// Object location for a provider key, taken verbatim.
///
/// `Path::from` would percent-encode characters such as `%` or `#` that are
/// legal in bucket keys, so keys are parsed as already-encoded paths instead.
fn object_path(key: &str) -> StorageResult<ObjectPath> {
    ObjectPath::parse(key)
        .map_err(|e| StorageError::InvalidPath(format!("Invalid object key '{}': {}", key, e)))
}

/// Directory to list for a raw key prefix.
///
/// `object_store` lists by path segments, while provider prefixes are plain
/// string prefixes, so listing starts at the parent of the last `/`.
fn listing_root(prefix: &str) -> StorageResult<Option<ObjectPath>> {
    match prefix.rsplit_once('/') {
        Some((dir, _)) if !dir.is_empty() => object_path(dir).map(Some),
        _ => Ok(None),
    }
}

#[async_trait]
impl ObjectBackend for ObjectStoreBackend {
    async fn list_containers(&self) -> StorageResult<Vec<String>> {
        // Without a configured container, fall back to one already in use
        let container = match &self.auth_container {
            Some(container) => container.clone(),
            None => self.stores.read().keys().min().cloned().ok_or_else(|| {
                StorageError::ConfigError(format!(
                    "{} authentication check needs the 'container' option or a prior data access",
                    self.provider
                ))
            })?,
        };

        self.store(&container)?.list_with_delimiter(None).await?;
        Ok(vec![container])
    }

    async fn get_object(&self, container: &str, key: &str) -> StorageResult<Bytes> {
        let location = object_path(key)?;
        let store = self.store(container)?;

        match store.get(&location).await {
            Ok(result) => Ok(result.bytes().await?),
            Err(object_store::Error::NotFound { .. }) => Err(StorageError::ObjectNotFound(
                format!("{}{}/{}", self.provider.schemes()[0], container, key),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_objects(
        &self,
        container: &str,
        prefix: &str,
    ) -> StorageResult<Vec<ObjectMetadata>> {
        let root = listing_root(prefix)?;
        let store = self.store(container)?;
        debug!(
            "Listing {} container={} prefix={} root={:?}",
            self.provider, container, prefix, root
        );

        let mut objects = Vec::new();
        let mut stream = store.list(root.as_ref());
        while let Some(meta) = stream.next().await {
            let meta = meta?;
            let name = meta.location.to_string();
            if name.starts_with(prefix) {
                objects.push(ObjectMetadata {
                    name,
                    size: Some(meta.size),
                    last_modified: Some(meta.last_modified),
                });
            }
        }

        Ok(objects)
    }
}

impl Debug for ObjectStoreBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ObjectStoreBackend(provider={}, auth_container={:?}, cached_stores={})",
            self.provider,
            self.auth_container,
            self.stores.read().len()
        )
    }
}
