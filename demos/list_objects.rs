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

//! List objects under a URI, or print one object when `--get` is passed.
//!
//! ```text
//! STORAGE_CONFIG='{"credentials":{"keyFilename":"/path/key.json"}}' \
//!     cargo run --example list_objects -- gs://my-bucket/exports/
//! ```

use multicloud_storage::{ProviderConfig, StorageRegistry, StorageService};
use std::error::Error;
use tracing::info;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut get = false;
    let mut uri = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--get" => get = true,
            _ => uri = Some(arg),
        }
    }
    let uri = uri.ok_or("usage: list_objects [--get] <uri>")?;

    let config = match std::env::var("STORAGE_CONFIG") {
        Ok(json) => ProviderConfig::from_json(&json)?,
        Err(_) => ProviderConfig::new(),
    };

    let registry = StorageRegistry::new();
    let service = registry.create_for_path(&uri, &config)?;

    if get {
        print!("{}", service.get_object(&uri).await?);
        return Ok(());
    }

    let objects = service.list_objects(&uri).await?;
    info!("Found {} objects under {}", objects.len(), uri);
    println!("{}", serde_json::to_string_pretty(&objects)?);
    Ok(())
}
