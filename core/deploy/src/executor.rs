//! Concurrent streamed upload of a plan.

use futures::future::join_all;
use std::sync::Arc;
use tracing::debug;

use ovhdeploy_common::{Error, Result, UploadFailure};
use ovhdeploy_storage::store::open_file_stream;
use ovhdeploy_storage::{ObjectStore, StorageEndpoint};

use crate::request::{UploadPlan, UploadTarget};

/// Status the object storage answers to a successful PUT.
const CREATED: u16 = 201;

/// Uploads every file of a plan.
pub struct UploadExecutor {
    store: Arc<dyn ObjectStore>,
}

impl UploadExecutor {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Dispatch one upload per planned file and wait for all of them.
    ///
    /// Uploads run concurrently with no cap. A failure does not cancel its
    /// siblings; every upload settles before this returns. Results are in
    /// plan order.
    pub async fn dispatch(
        &self,
        plan: &UploadPlan,
        endpoint: &StorageEndpoint,
        target: &UploadTarget,
    ) -> Vec<Result<String>> {
        join_all(
            plan.files()
                .iter()
                .map(|file| self.upload_file(file, endpoint, target)),
        )
        .await
    }

    async fn upload_file(
        &self,
        relative: &str,
        endpoint: &StorageEndpoint,
        target: &UploadTarget,
    ) -> Result<String> {
        let location = target.object_path(relative);
        let url = location.to_url(&endpoint.base_url);

        debug!(
            "Uploading file `{}` to {} object storage with URL `{}`",
            relative,
            self.store.name(),
            url
        );

        let body = open_file_stream(&target.local_path(relative)).await?;

        let status = self
            .store
            .put_object(&url, &endpoint.access_token, body)
            .await
            .map_err(|err| match err {
                Error::Network(msg) => Error::Upload {
                    path: relative.to_string(),
                    cause: UploadFailure::Transport(msg),
                },
                other => other,
            })?;

        if status != CREATED {
            return Err(Error::Upload {
                path: relative.to_string(),
                cause: UploadFailure::Status(status),
            });
        }

        debug!("✔  {}", location);
        Ok(relative.to_string())
    }
}
