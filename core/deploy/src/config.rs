//! Deploy configuration: loading, defaulting and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use ovhdeploy_common::{Error, Result, Secret};
use ovhdeploy_storage::Credentials;

use crate::request::CandidateFiles;

/// Default glob selecting the usual static web assets.
pub const DEFAULT_FILE_PATTERN: &str =
    "**/*.{js,css,png,gif,ico,jpg,map,xml,txt,svg,swf,eot,ttf,woff,woff2,otf}";

/// Default build output directory.
pub const DEFAULT_DIST_DIR: &str = "dist";

/// Configuration as written in the JSON config file.
///
/// Every key is optional here; `DeployConfig::resolve` applies defaults and
/// rejects missing required keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    pub endpoint: Option<String>,
    pub app_key: Option<String>,
    pub app_secret: Option<Secret>,
    pub consumer_key: Option<Secret>,
    pub service_name: Option<String>,
    pub container: Option<String>,
    pub region: Option<String>,
    pub prefix: Option<String>,
    pub file_pattern: Option<String>,
    pub gzipped: Option<bool>,
    pub dist_dir: Option<PathBuf>,
    pub dist_files: Option<CandidateFiles>,
    pub gzipped_files: Option<CandidateFiles>,
    pub manifest_path: Option<String>,
}

impl ConfigFile {
    /// Parse a config file body.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a config file.
    pub async fn load(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| Error::Filesystem {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&json)
    }
}

/// Validated deploy configuration.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub endpoint: String,
    pub app_key: String,
    pub app_secret: Secret,
    pub consumer_key: Secret,
    pub service_name: String,
    pub container: String,
    pub region: String,
    pub prefix: String,
    pub file_pattern: String,
    pub gzipped: bool,
    pub dist_dir: PathBuf,
    /// `None` means "discover by walking `dist_dir`".
    pub dist_files: Option<CandidateFiles>,
    pub gzipped_files: CandidateFiles,
    pub manifest_path: Option<String>,
}

fn required(value: Option<String>, missing: &mut Vec<&'static str>, name: &'static str) -> String {
    match value.filter(|v| !v.is_empty()) {
        Some(v) => v,
        None => {
            missing.push(name);
            String::new()
        }
    }
}

fn required_secret(value: Option<Secret>, missing: &mut Vec<&'static str>, name: &'static str) -> Secret {
    match value.filter(|v| !v.is_empty()) {
        Some(v) => v,
        None => {
            missing.push(name);
            Secret::default()
        }
    }
}

fn defaulted<T>(value: Option<T>, name: &str, default: T, shown: &str) -> T {
    value.unwrap_or_else(|| {
        debug!("Missing config: `{}`, using default: `{}`", name, shown);
        default
    })
}

impl DeployConfig {
    /// Apply defaults and validate required keys.
    ///
    /// # Errors
    /// - `Error::InvalidInput` listing every missing required key
    pub fn resolve(file: ConfigFile) -> Result<Self> {
        let mut missing = Vec::new();

        let endpoint = required(file.endpoint, &mut missing, "endpoint");
        let app_key = required(file.app_key, &mut missing, "appKey");
        let app_secret = required_secret(file.app_secret, &mut missing, "appSecret");
        let consumer_key = required_secret(file.consumer_key, &mut missing, "consumerKey");
        let service_name = required(file.service_name, &mut missing, "serviceName");
        let container = required(file.container, &mut missing, "container");
        let region = required(file.region, &mut missing, "region");

        if !missing.is_empty() {
            return Err(Error::InvalidInput(format!(
                "Missing required config: {}",
                missing.join(", ")
            )));
        }

        let file_pattern = defaulted(
            file.file_pattern,
            "filePattern",
            DEFAULT_FILE_PATTERN.to_string(),
            DEFAULT_FILE_PATTERN,
        );
        let prefix = defaulted(file.prefix, "prefix", String::new(), "");
        let gzipped = defaulted(file.gzipped, "gzipped", false, "false");
        let dist_dir = defaulted(
            file.dist_dir,
            "distDir",
            PathBuf::from(DEFAULT_DIST_DIR),
            DEFAULT_DIST_DIR,
        );
        if file.dist_files.is_none() {
            debug!(
                "Missing config: `distFiles`, using default: files under `{}`",
                dist_dir.display()
            );
        }
        let gzipped_files = defaulted(file.gzipped_files, "gzippedFiles", CandidateFiles::default(), "[]");
        if file.manifest_path.is_none() {
            debug!("Missing config: `manifestPath`, using default: none");
        }

        Ok(Self {
            endpoint,
            app_key,
            app_secret,
            consumer_key,
            service_name,
            container,
            region,
            prefix,
            file_pattern,
            gzipped,
            dist_dir,
            dist_files: file.dist_files,
            gzipped_files,
            manifest_path: file.manifest_path,
        })
    }

    /// Account API credentials.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            app_key: self.app_key.clone(),
            app_secret: self.app_secret.clone(),
            consumer_key: self.consumer_key.clone(),
        }
    }
}
