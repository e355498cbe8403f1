//! Inputs and plans of an upload operation.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

use ovhdeploy_common::ObjectPath;

/// Ordered relative paths eligible for upload.
///
/// Deserializes from either a single string or a list of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CandidateFiles(Vec<String>);

impl CandidateFiles {
    pub fn new(files: Vec<String>) -> Self {
        Self(files)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for CandidateFiles {
    fn from(file: &str) -> Self {
        Self(vec![file.to_string()])
    }
}

impl From<String> for CandidateFiles {
    fn from(file: String) -> Self {
        Self(vec![file])
    }
}

impl From<Vec<String>> for CandidateFiles {
    fn from(files: Vec<String>) -> Self {
        Self(files)
    }
}

impl From<Vec<&str>> for CandidateFiles {
    fn from(files: Vec<&str>) -> Self {
        Self(files.into_iter().map(String::from).collect())
    }
}

impl FromIterator<String> for CandidateFiles {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for CandidateFiles {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(String),
            Many(Vec<String>),
        }

        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(file) => Self(vec![file]),
            OneOrMany::Many(files) => Self(files),
        })
    }
}

/// Where objects go and where their local bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub container: String,
    pub prefix: String,
    pub local_root: PathBuf,
}

impl UploadTarget {
    /// Object path `container/prefix/relative`, normalized.
    pub fn object_path(&self, relative: &str) -> ObjectPath {
        ObjectPath::from_parts([self.container.as_str(), self.prefix.as_str(), relative])
    }

    /// Absolute object URL under a storage base URL.
    pub fn object_url(&self, base_url: &str, relative: &str) -> String {
        self.object_path(relative).to_url(base_url)
    }

    /// Local file backing a relative path.
    pub fn local_path(&self, relative: &str) -> PathBuf {
        self.local_root.join(relative.trim_start_matches('/'))
    }
}

/// Everything one upload operation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub candidate_files: CandidateFiles,
    pub local_root: PathBuf,
    pub remote_prefix: String,
    pub container_name: String,
    pub region: String,
    pub service_id: String,
    pub manifest_path: Option<String>,
}

impl UploadRequest {
    /// Create a request with an empty prefix and no manifest.
    pub fn new(
        service_id: impl Into<String>,
        region: impl Into<String>,
        container_name: impl Into<String>,
        local_root: impl AsRef<Path>,
        candidate_files: impl Into<CandidateFiles>,
    ) -> Self {
        Self {
            candidate_files: candidate_files.into(),
            local_root: local_root.as_ref().to_path_buf(),
            remote_prefix: String::new(),
            container_name: container_name.into(),
            region: region.into(),
            service_id: service_id.into(),
            manifest_path: None,
        }
    }

    /// Set the remote prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.remote_prefix = prefix.into();
        self
    }

    /// Set the manifest path.
    pub fn with_manifest(mut self, manifest_path: impl Into<String>) -> Self {
        self.manifest_path = Some(manifest_path.into());
        self
    }

    /// Configured manifest path, if any. An empty path counts as unset.
    pub fn manifest(&self) -> Option<&str> {
        self.manifest_path.as_deref().filter(|p| !p.is_empty())
    }

    /// Upload destination derived from this request.
    pub fn target(&self) -> UploadTarget {
        UploadTarget {
            container: self.container_name.clone(),
            prefix: self.remote_prefix.clone(),
            local_root: self.local_root.clone(),
        }
    }
}

/// Ordered relative paths that will actually be transferred.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UploadPlan(Vec<String>);

impl UploadPlan {
    pub fn new(files: Vec<String>) -> Self {
        Self(files)
    }

    pub fn files(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}
