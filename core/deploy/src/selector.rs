//! Differential selection of the files to upload.

use crate::manifest::ManifestEntries;
use crate::request::{CandidateFiles, UploadPlan};

/// Compute the upload plan.
///
/// Keeps the candidates not listed in the manifest, in their original order,
/// then appends the manifest path itself when one is configured so the
/// manifest is always refreshed.
pub fn select(
    candidates: &CandidateFiles,
    manifest: &ManifestEntries,
    manifest_path: Option<&str>,
) -> UploadPlan {
    let mut files: Vec<String> = candidates
        .iter()
        .filter(|file| !manifest.contains(file))
        .cloned()
        .collect();

    if let Some(path) = manifest_path.filter(|p| !p.is_empty()) {
        files.push(path.to_string());
    }

    UploadPlan::new(files)
}
