//! Deploy pipeline glue: turns configuration into an upload and reports it.

use async_trait::async_trait;
use serde::Serialize;
use std::error::Error as StdError;
use std::sync::Arc;
use tracing::{debug, error};

use ovhdeploy_common::{Error, Result};
use ovhdeploy_storage::{ApiEndpoint, OvhClient, SwiftClient, StorageEndpoint};

use crate::config::DeployConfig;
use crate::discovery::{discover_files, FilePattern};
use crate::engine::DeployEngine;
use crate::request::{CandidateFiles, UploadPlan, UploadRequest};

/// Something that can carry out an upload request.
///
/// `DeployEngine` is the real implementation; tests and embedders can supply
/// their own.
#[async_trait]
pub trait UploadClient: Send + Sync {
    /// Upload the request's files and return the uploaded relative paths.
    async fn upload(&self, request: &UploadRequest) -> Result<Vec<String>>;
}

/// Outcome of a successful deploy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    pub files_uploaded: Vec<String>,
}

/// Configured deploy of one build output tree.
pub struct DeployPlugin {
    config: DeployConfig,
    client: Arc<dyn UploadClient>,
}

impl DeployPlugin {
    /// Create a plugin with an explicit upload client.
    pub fn new(config: DeployConfig, client: Arc<dyn UploadClient>) -> Self {
        Self { config, client }
    }

    /// Create a plugin wired to the OVH API and Swift storage.
    ///
    /// # Errors
    /// - Unknown API endpoint
    /// - HTTP client construction failure
    pub fn from_config(config: DeployConfig) -> Result<Self> {
        let engine = Self::engine(&config)?;
        Ok(Self::new(config, Arc::new(engine)))
    }

    fn engine(config: &DeployConfig) -> Result<DeployEngine> {
        let api = OvhClient::new(ApiEndpoint::parse(&config.endpoint)?, config.credentials())?;
        let store = SwiftClient::new()?;
        Ok(DeployEngine::new(Arc::new(api), Arc::new(store)))
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    /// Candidate files: the gzipped list or the dist list, filtered by the
    /// configured file pattern.
    ///
    /// # Errors
    /// - Invalid file pattern
    /// - `dist_dir` cannot be walked when `dist_files` is unset
    pub fn candidate_files(&self) -> Result<CandidateFiles> {
        let files = if self.config.gzipped {
            self.config.gzipped_files.clone()
        } else {
            match &self.config.dist_files {
                Some(files) => files.clone(),
                None => CandidateFiles::new(discover_files(&self.config.dist_dir)?),
            }
        };

        let pattern = FilePattern::new(&self.config.file_pattern)?;
        debug!(
            "Filtering {} candidate file(s) with `{}`",
            files.len(),
            pattern.as_str()
        );
        Ok(pattern.filter(&files))
    }

    /// Build the upload request for this configuration.
    pub fn request(&self) -> Result<UploadRequest> {
        Ok(UploadRequest {
            candidate_files: self.candidate_files()?,
            local_root: self.config.dist_dir.clone(),
            remote_prefix: self.config.prefix.clone(),
            container_name: self.config.container.clone(),
            region: self.config.region.clone(),
            service_id: self.config.service_name.clone(),
            manifest_path: self.config.manifest_path.clone(),
        })
    }

    /// Upload the configured files.
    ///
    /// # Errors
    /// Any request or upload error, after logging it and its causes.
    pub async fn upload(&self) -> Result<UploadReport> {
        let result = self.run_upload().await;
        if let Err(err) = &result {
            log_failure(err);
        }
        result
    }

    async fn run_upload(&self) -> Result<UploadReport> {
        let request = self.request()?;

        debug!(
            "Preparing to upload to OVH Object Storage `{}`",
            request.service_id
        );

        let files = self.client.upload(&request).await?;

        debug!("Successfully uploaded {} files.", files.len());

        Ok(UploadReport {
            files_uploaded: files,
        })
    }

    /// Compute what an upload would transfer, without transferring anything.
    ///
    /// Always uses the OVH and Swift clients, since planning needs the
    /// manifest from real storage.
    pub async fn plan(&self) -> Result<(StorageEndpoint, UploadPlan)> {
        let result = self.run_plan().await;
        if let Err(err) = &result {
            log_failure(err);
        }
        result
    }

    async fn run_plan(&self) -> Result<(StorageEndpoint, UploadPlan)> {
        let request = self.request()?;
        Self::engine(&self.config)?.plan(&request).await
    }
}

/// Log an error and its source chain at error level.
fn log_failure(err: &Error) {
    error!("{}", err);
    let mut source = err.source();
    while let Some(cause) = source {
        error!("  caused by: {}", cause);
        source = cause.source();
    }
}
