// Copyright 2022 Adobe. All rights reserved.
// This file is licensed to you under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License. You may obtain a copy
// of the License at http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under
// the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR REPRESENTATIONS
// OF ANY KIND, either express or implied. See the License for the specific language
// governing permissions and limitations under the License.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};

use super::config::{ProviderConfig, ProviderKind};
use super::error::StorageResult;
use super::path::ParsedPath;

/// Metadata about an object returned by a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// Object key relative to its container
    pub name: String,

    /// Object size in bytes (if reported)
    pub size: Option<u64>,

    /// Last modified timestamp (if reported)
    #[serde(rename = "updated")]
    pub last_modified: Option<DateTime<Utc>>,
}

/// Outcome of an authentication check.
///
/// A failed check is an expected result, not an error, so it is returned as a
/// value carrying the provider's message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AuthStatus {
    Success { message: String },
    Failed { error: String },
}

impl AuthStatus {
    pub(crate) fn verified() -> Self {
        AuthStatus::Success {
            message: "Authentication verified".to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AuthStatus::Success { .. })
    }
}

/// Common interface implemented by every cloud storage service.
///
/// Paths are full provider URIs such as `s3://bucket/key`,
/// `azure://container/key` or `gs://bucket/key`.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// The provider this service talks to.
    fn provider(&self) -> ProviderKind;

    /// The configuration the service was built from.
    fn config(&self) -> &ProviderConfig;

    /// Split a provider URI into container and key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidPath` if the URI has no container segment.
    fn parse_path(&self, uri: &str) -> StorageResult<ParsedPath>;

    /// Check that the configured credentials are accepted by the provider.
    ///
    /// This never fails: problems are reported as [`AuthStatus::Failed`].
    async fn validate_authentication(&self) -> AuthStatus;

    /// Read an object and decode it as UTF-8 text.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * The path cannot be parsed
    /// * The object does not exist (`StorageError::ObjectNotFound`)
    /// * The provider call fails (`StorageError::ProviderError`)
    /// * The content is not valid UTF-8
    async fn get_object(&self, file_path: &str) -> StorageResult<String>;

    /// List every object under a prefix, ordered by name.
    ///
    /// All result pages are drained before returning.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * The path cannot be parsed
    /// * The provider call fails (`StorageError::ProviderError`)
    async fn list_objects(&self, path: &str) -> StorageResult<Vec<ObjectMetadata>>;
}

impl Debug for dyn StorageService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "StorageService(provider={})", self.provider())
    }
}
