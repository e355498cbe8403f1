//! Deploy engine that sequences locate, manifest, select and upload.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use ovhdeploy_common::Result;
use ovhdeploy_storage::{AccountApi, ObjectStore, StorageEndpoint, StorageLocator};

use crate::aggregate::aggregate;
use crate::executor::UploadExecutor;
use crate::manifest::ManifestResolver;
use crate::plugin::UploadClient;
use crate::request::{UploadPlan, UploadRequest};
use crate::selector::select;

/// Differential upload engine.
pub struct DeployEngine {
    locator: StorageLocator,
    resolver: ManifestResolver,
    executor: UploadExecutor,
}

impl DeployEngine {
    /// Create an engine from an account API client and an object store.
    pub fn new(api: Arc<dyn AccountApi>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            locator: StorageLocator::new(api),
            resolver: ManifestResolver::new(store.clone()),
            executor: UploadExecutor::new(store),
        }
    }

    /// Locate storage and compute the upload plan without uploading.
    ///
    /// # Errors
    /// - Storage locator errors (auth, region, access denied)
    pub async fn plan(&self, request: &UploadRequest) -> Result<(StorageEndpoint, UploadPlan)> {
        let endpoint = self
            .locator
            .locate(&request.service_id, &request.region)
            .await?;

        let target = request.target();
        let manifest = self
            .resolver
            .resolve(&endpoint, &target, request.manifest())
            .await;

        let plan = select(&request.candidate_files, &manifest, request.manifest());
        debug!(
            "Planned {} of {} candidate file(s) for upload",
            plan.len(),
            request.candidate_files.len()
        );

        Ok((endpoint, plan))
    }

    /// Run a full upload and return the uploaded relative paths.
    ///
    /// # Errors
    /// - Storage locator errors
    /// - The first upload or filesystem error; other uploads still settle
    pub async fn upload(&self, request: &UploadRequest) -> Result<Vec<String>> {
        let (endpoint, plan) = self.plan(request).await?;
        let settled = self
            .executor
            .dispatch(&plan, &endpoint, &request.target())
            .await;
        aggregate(settled)
    }
}

#[async_trait]
impl UploadClient for DeployEngine {
    async fn upload(&self, request: &UploadRequest) -> Result<Vec<String>> {
        DeployEngine::upload(self, request).await
    }
}
