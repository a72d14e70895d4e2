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

//! Cloud storage abstraction layer
//!
//! This module provides a unified interface for reading and listing objects in
//! different cloud storage providers (AWS S3, Azure Blob Storage, GCS).
//!
//! Each provider has a service type implementing [`StorageService`]. The
//! services parse provider URIs themselves and delegate network access to an
//! [`ObjectBackend`], which in production is backed by the `object_store` crate.
//! [`StorageRegistry`] builds services from a [`ProviderConfig`] and shares one
//! instance per provider/instance pair.

pub mod aws;
pub mod azure;
pub mod backend;
pub mod config;
pub mod error;
pub mod factory;
pub mod gcp;
pub mod object_store;
pub mod path;
pub mod provider;

// Public exports
pub use self::aws::AwsStorageService;
pub use self::azure::AzureStorageService;
pub use self::backend::ObjectBackend;
pub use self::config::{Credentials, ProviderConfig, ProviderKind};
pub use self::error::{StorageError, StorageResult};
pub use self::factory::StorageRegistry;
pub use self::gcp::GcpStorageService;
pub use self::object_store::ObjectStoreBackend;
pub use self::path::{get_provider_from_path, ParsedPath};
pub use self::provider::{AuthStatus, ObjectMetadata, StorageService};
