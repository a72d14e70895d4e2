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

//! Provider URI parsing.
//!
//! A storage URI is `<scheme>://<container>/<key or prefix>`. Parsing strips one
//! recognized scheme, takes the first `/`-separated segment as the bucket or
//! container and re-joins the rest as the key. Nothing is decoded or validated
//! beyond that; the provider decides what a legal bucket name is.

use serde::Serialize;

use super::config::ProviderKind;
use super::error::{StorageError, StorageResult};

/// A storage URI split into container and key/prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedPath {
    /// Bucket (S3, GCS) or container (Azure) name
    pub container_name: String,

    /// Object key or listing prefix, empty when the URI names only a container
    pub path: String,
}

impl ParsedPath {
    /// Alias of `container_name` for bucket-based providers.
    pub fn bucket_name(&self) -> &str {
        &self.container_name
    }
}

impl ProviderKind {
    /// Split `uri` into container and key according to this provider's schemes.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidPath` when no container segment remains
    /// (empty input, a bare scheme, or `scheme:///key`).
    pub fn parse_path(&self, uri: &str) -> StorageResult<ParsedPath> {
        let without_scheme = self
            .schemes()
            .iter()
            .find_map(|scheme| uri.strip_prefix(scheme))
            .unwrap_or(uri);

        let (container_name, path) = match without_scheme.split_once('/') {
            Some((container, rest)) => (container, rest),
            None => (without_scheme, ""),
        };

        if container_name.is_empty() {
            tracing::error!(
                "Error while parsing {} path: no container segment in '{}'",
                self,
                uri
            );
            return Err(StorageError::InvalidPath(format!(
                "Invalid {} folder path format: {}",
                self, uri
            )));
        }

        Ok(ParsedPath {
            container_name: container_name.to_string(),
            path: path.to_string(),
        })
    }
}

/// Infer the provider from a URI scheme.
///
/// Returns `None` for an empty string. Anything without a recognized scheme
/// is routed to S3.
pub fn get_provider_from_path(uri: &str) -> Option<ProviderKind> {
    if uri.is_empty() {
        return None;
    }

    [ProviderKind::Aws, ProviderKind::Azure, ProviderKind::Gcp]
        .into_iter()
        .find(|kind| kind.schemes().iter().any(|scheme| uri.starts_with(scheme)))
        .or(Some(ProviderKind::Aws))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_s3_path() {
        let parsed = ProviderKind::Aws.parse_path("s3://my-bucket/a/b/c.txt").unwrap();
        assert_eq!(parsed.container_name, "my-bucket");
        assert_eq!(parsed.bucket_name(), "my-bucket");
        assert_eq!(parsed.path, "a/b/c.txt");
    }

    #[test]
    fn test_parse_azure_schemes_agree() {
        let long = ProviderKind::Azure
            .parse_path("azure://mycontainer/folder/file")
            .unwrap();
        let short = ProviderKind::Azure
            .parse_path("az://mycontainer/folder/file")
            .unwrap();

        assert_eq!(long, short);
        assert_eq!(long.container_name, "mycontainer");
        assert_eq!(long.path, "folder/file");
    }

    #[test]
    fn test_parse_gcp_schemes_agree() {
        let gs = ProviderKind::Gcp.parse_path("gs://bucket/x").unwrap();
        let gcp = ProviderKind::Gcp.parse_path("gcp://bucket/x").unwrap();

        assert_eq!(gs, gcp);
        assert_eq!(gs.container_name, "bucket");
        assert_eq!(gs.path, "x");
    }

    #[test]
    fn test_parse_container_only() {
        let parsed = ProviderKind::Aws.parse_path("s3://bucket").unwrap();
        assert_eq!(parsed.container_name, "bucket");
        assert_eq!(parsed.path, "");

        let parsed = ProviderKind::Aws.parse_path("s3://bucket/").unwrap();
        assert_eq!(parsed.path, "");
    }

    #[test]
    fn test_parse_keeps_trailing_slash_and_encoding() {
        let parsed = ProviderKind::Gcp
            .parse_path("gs://bucket/dir%20name/sub/")
            .unwrap();
        assert_eq!(parsed.path, "dir%20name/sub/");
    }

    #[test]
    fn test_parse_without_scheme() {
        let parsed = ProviderKind::Aws.parse_path("bucket/key.json").unwrap();
        assert_eq!(parsed.container_name, "bucket");
        assert_eq!(parsed.path, "key.json");
    }

    #[test]
    fn test_parse_foreign_scheme_is_not_stripped() {
        // Only the provider's own schemes are removed
        let parsed = ProviderKind::Aws.parse_path("gs://bucket/key").unwrap();
        assert_eq!(parsed.container_name, "gs:");
        assert_eq!(parsed.path, "/bucket/key");
    }

    #[test]
    fn test_parse_strips_one_scheme_only() {
        let parsed = ProviderKind::Azure.parse_path("azure://az://c/k").unwrap();
        assert_eq!(parsed.container_name, "az:");
        assert_eq!(parsed.path, "/c/k");
    }

    #[test]
    fn test_parse_empty_container_is_invalid() {
        for uri in ["", "s3://", "s3:///key", "/key"] {
            let err = ProviderKind::Aws.parse_path(uri).unwrap_err();
            assert!(
                matches!(err, StorageError::InvalidPath(_)),
                "expected InvalidPath for {:?}",
                uri
            );
        }
        assert!(ProviderKind::Azure.parse_path("az://").is_err());
        assert!(ProviderKind::Gcp.parse_path("gcp:///x").is_err());
    }

    #[test]
    fn test_get_provider_from_path() {
        assert_eq!(get_provider_from_path("s3://bucket/key"), Some(ProviderKind::Aws));
        assert_eq!(get_provider_from_path("azure://c/k"), Some(ProviderKind::Azure));
        assert_eq!(get_provider_from_path("az://c/k"), Some(ProviderKind::Azure));
        assert_eq!(get_provider_from_path("gs://b/k"), Some(ProviderKind::Gcp));
        assert_eq!(get_provider_from_path("gcp://b/k"), Some(ProviderKind::Gcp));
    }

    #[test]
    fn test_get_provider_from_path_defaults_to_s3() {
        assert_eq!(get_provider_from_path("nonsense"), Some(ProviderKind::Aws));
        assert_eq!(get_provider_from_path("bucket/key"), Some(ProviderKind::Aws));
        assert_eq!(get_provider_from_path("file:///tmp/x"), Some(ProviderKind::Aws));
        assert_eq!(get_provider_from_path("nonsense").unwrap().as_str(), "s3");
    }

    #[test]
    fn test_get_provider_from_empty_path() {
        assert_eq!(get_provider_from_path(""), None);
    }

    #[test]
    fn test_parsed_path_serialization() {
        let parsed = ProviderKind::Aws.parse_path("s3://b/k").unwrap();
        let json = serde_json::to_string(&parsed).unwrap();
        assert_eq!(json, r#"{"containerName":"b","path":"k"}"#);
    }
}
