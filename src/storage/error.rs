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

use std::string::FromUtf8Error;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Unsupported storage provider: {0}")]
    UnsupportedProvider(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Provider error: {0}")]
    ProviderError(#[from] object_store::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Object content is not valid UTF-8: {0}")]
    DecodeError(#[from] FromUtf8Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),
}

impl StorageError {
    /// Whether the error means the requested object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::ObjectNotFound(_))
            || matches!(
                self,
                StorageError::ProviderError(object_store::Error::NotFound { .. })
            )
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
