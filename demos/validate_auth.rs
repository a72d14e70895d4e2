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

//! Check credentials for one provider.
//!
//! ```text
//! STORAGE_CONFIG='{"credentials":{"accessKey":"..","secretKey":".."},"region":"us-east-1","options":{"container":"my-bucket"}}' \
//!     cargo run --example validate_auth -- s3
//! ```

use multicloud_storage::{AuthStatus, ProviderConfig, StorageRegistry, StorageService};
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

    let provider = std::env::args().nth(1).unwrap_or_else(|| "s3".to_string());
    let config = match std::env::var("STORAGE_CONFIG") {
        Ok(json) => ProviderConfig::from_json(&json)?,
        Err(_) => ProviderConfig::new(),
    };

    let registry = StorageRegistry::new();
    let service = registry.create_storage_service(&provider, &config)?;
    info!("Validating {} credentials", service.provider());

    let status = service.validate_authentication().await;
    println!("{}", serde_json::to_string_pretty(&status)?);

    if let AuthStatus::Failed { .. } = status {
        std::process::exit(1);
    }
    Ok(())
}
