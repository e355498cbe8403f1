//! Discovery and filtering of candidate files.

use globset::{GlobBuilder, GlobMatcher};
use std::path::Path;
use walkdir::WalkDir;

use ovhdeploy_common::{Error, Result};

use crate::request::CandidateFiles;

/// Glob filter over relative paths.
///
/// `*` does not cross `/`. A pattern without any `/` is matched against the
/// file name only, so `*.js` selects `assets/app.js`.
///
/// Hidden files and anything under a hidden directory are skipped unless
/// the pattern itself has a segment starting with `.`.
#[derive(Debug, Clone)]
pub struct FilePattern {
    pattern: String,
    matcher: GlobMatcher,
    match_base: bool,
    match_dot: bool,
}

impl FilePattern {
    /// Compile a pattern.
    ///
    /// # Errors
    /// - `Error::InvalidInput` for malformed globs
    pub fn new(pattern: &str) -> Result<Self> {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| Error::InvalidInput(format!("Invalid file pattern `{}`: {}", pattern, e)))?;

        Ok(Self {
            pattern: pattern.to_string(),
            matcher: glob.compile_matcher(),
            match_base: !pattern.contains('/'),
            match_dot: pattern.split('/').any(is_hidden),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Check whether a relative path is selected.
    pub fn is_match(&self, relative: &str) -> bool {
        if self.match_base {
            let base = relative.rsplit('/').next().unwrap_or(relative);
            (self.match_dot || !is_hidden(base)) && self.matcher.is_match(base)
        } else {
            (self.match_dot || !relative.split('/').any(is_hidden))
                && self.matcher.is_match(relative)
        }
    }

    /// Keep the candidates this pattern selects, preserving order.
    pub fn filter(&self, files: &CandidateFiles) -> CandidateFiles {
        files.iter().filter(|f| self.is_match(f)).cloned().collect()
    }
}

fn is_hidden(segment: &str) -> bool {
    segment.starts_with('.')
}

/// List every regular file under `root` as a `/`-separated relative path.
///
/// Results are sorted so repeated runs plan identically.
///
/// # Errors
/// - `Error::Filesystem` if a directory cannot be read
pub fn discover_files(root: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(root).to_path_buf();
            let source = err
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
            Error::Filesystem { path, source }
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|_| Error::InvalidInput(format!("{} escapes the dist directory", entry.path().display())))?;

        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        files.push(parts.join("/"));
    }

    files.sort();
    Ok(files)
}
