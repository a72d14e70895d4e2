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

//! # Multicloud Storage
//!
//! One interface for reading and listing objects in AWS S3 (and S3-compatible
//! stores), Azure Blob Storage and Google Cloud Storage.
//!
//! Every provider is exposed as a [`StorageService`] with the same four
//! operations:
//!
//! - `parse_path` splits a provider URI (`s3://`, `azure://`/`az://`,
//!   `gs://`/`gcp://`) into container and key
//! - `validate_authentication` checks credentials and reports the outcome as a value
//! - `get_object` reads an object as UTF-8 text
//! - `list_objects` lists every object under a prefix
//!
//! Network access, signing, retries and pagination are handled by the
//! [`object_store`](https://docs.rs/object_store) crate.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use multicloud_storage::{
//!     get_provider_from_path, Credentials, ProviderConfig, StorageRegistry, StorageService,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let registry = StorageRegistry::new();
//!
//! let config = ProviderConfig::new()
//!     .with_credentials(Credentials::aws("ACCESS_KEY", "SECRET_KEY"))
//!     .with_region("us-east-1")
//!     .with_option("container", "my-bucket");
//!
//! let uri = "s3://my-bucket/reports/2024/summary.json";
//! let provider = get_provider_from_path(uri).expect("non-empty path");
//! let service = registry.create_storage_service(provider.as_str(), &config)?;
//!
//! println!("{:?}", service.validate_authentication().await);
//! let summary = service.get_object(uri).await?;
//! for object in service.list_objects("s3://my-bucket/reports/2024/").await? {
//!     println!("{} {:?}", object.name, object.size);
//! }
//! # let _ = summary;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`storage`] - Provider services, configuration, path parsing and the registry

pub mod storage;

// Re-export commonly used types
pub use storage::{
    get_provider_from_path, AuthStatus, Credentials, ObjectMetadata, ParsedPath, ProviderConfig,
    ProviderKind, StorageError, StorageRegistry, StorageResult, StorageService,
};
