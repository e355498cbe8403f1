//! Remote manifest of previously deployed files.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use ovhdeploy_common::{Error, Result};
use ovhdeploy_storage::{ObjectStore, StorageEndpoint};

use crate::request::UploadTarget;

/// Relative paths already present at the destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestEntries(HashSet<String>);

impl ManifestEntries {
    /// Create an empty set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Split a manifest body on `\n`.
    ///
    /// A trailing newline yields an empty entry, which never matches a file.
    pub fn parse(body: &str) -> Self {
        Self(body.split('\n').map(String::from).collect())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ManifestEntries {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Downloads the manifest of a previous deploy.
pub struct ManifestResolver {
    store: Arc<dyn ObjectStore>,
}

impl ManifestResolver {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Fetch the manifest entries, or an empty set if there are none.
    ///
    /// Never fails: a missing manifest, a non-200 answer or a transport
    /// error all disable differential deploy for this run.
    pub async fn resolve(
        &self,
        endpoint: &StorageEndpoint,
        target: &UploadTarget,
        manifest_path: Option<&str>,
    ) -> ManifestEntries {
        let Some(manifest_path) = manifest_path.filter(|p| !p.is_empty()) else {
            return ManifestEntries::empty();
        };

        match self.fetch(endpoint, target, manifest_path).await {
            Ok(entries) => {
                debug!("Manifest found. Differential deploy will be applied.");
                entries
            }
            Err(err) => {
                warn!("Manifest not found. Disabling differential deploy.");
                debug!("{}", err);
                ManifestEntries::empty()
            }
        }
    }

    async fn fetch(
        &self,
        endpoint: &StorageEndpoint,
        target: &UploadTarget,
        manifest_path: &str,
    ) -> Result<ManifestEntries> {
        let url = target.object_url(&endpoint.base_url, manifest_path);
        debug!(
            "Downloading manifest for differential deploy from `{}`...",
            url
        );

        let response = self
            .store
            .get_object(&url, &endpoint.access_token)
            .await?;

        if response.status != 200 {
            return Err(Error::Network(format!(
                "Unable to load manifest file contents, status code {}",
                response.status
            )));
        }

        Ok(ManifestEntries::parse(&response.text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ovhdeploy_storage::MemoryStore;
    use std::path::PathBuf;

    const BASE: &str = "https://storage.gra1/v1/AUTH_p";

    fn endpoint() -> StorageEndpoint {
        StorageEndpoint {
            base_url: BASE.to_string(),
            access_token: "tok".to_string(),
        }
    }

    fn target() -> UploadTarget {
        UploadTarget {
            container: "c".to_string(),
            prefix: "v1".to_string(),
            local_root: PathBuf::from("dist"),
        }
    }

    #[test]
    fn test_parse_keeps_trailing_empty_entry() {
        let entries = ManifestEntries::parse("app.css\napp.js\n");
        assert_eq!(entries.len(), 3);
        assert!(entries.contains("app.css"));
        assert!(entries.contains(""));
    }

    #[tokio::test]
    async fn test_resolve_without_manifest_path_makes_no_request() {
        let store = Arc::new(MemoryStore::new());
        let resolver = ManifestResolver::new(store.clone());

        let entries = resolver.resolve(&endpoint(), &target(), None).await;
        assert!(entries.is_empty());

        let entries = resolver.resolve(&endpoint(), &target(), Some("")).await;
        assert!(entries.is_empty());

        assert!(store.requests().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_reads_manifest() {
        let store = Arc::new(MemoryStore::with_token("tok"));
        store.insert_object(format!("{}/c/v1/manifest.txt", BASE), "app.css\n");
        let resolver = ManifestResolver::new(store.clone());

        let entries = resolver
            .resolve(&endpoint(), &target(), Some("manifest.txt"))
            .await;

        assert!(entries.contains("app.css"));
        assert!(!entries.contains("app.js"));
    }

    #[tokio::test]
    async fn test_resolve_non_200_is_empty() {
        for status in [204, 301, 403, 404, 500] {
            let store = Arc::new(MemoryStore::new());
            let url = format!("{}/c/v1/manifest.txt", BASE);
            store.insert_object(url.clone(), "app.css\n");
            store.respond_with(url, status);
            let resolver = ManifestResolver::new(store);

            let entries = resolver
                .resolve(&endpoint(), &target(), Some("manifest.txt"))
                .await;
            assert!(entries.is_empty(), "status {} should disable the manifest", status);
        }
    }

    #[tokio::test]
    async fn test_resolve_transport_error_is_empty() {
        let store = Arc::new(MemoryStore::new());
        store.fail_transport(format!("{}/c/v1/manifest.txt", BASE));
        let resolver = ManifestResolver::new(store);

        let entries = resolver
            .resolve(&endpoint(), &target(), Some("manifest.txt"))
            .await;
        assert!(entries.is_empty());
    }
}
