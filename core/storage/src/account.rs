//! Account API abstraction used to obtain object storage access.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ovhdeploy_common::Error;

/// One regional storage endpoint of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionEndpoint {
    /// Region code, e.g. `GRA1`.
    #[serde(default)]
    pub region: String,
    /// Storage base URL for that region.
    #[serde(default)]
    pub url: String,
}

/// Answer of a storage access request.
///
/// Both fields are optional on the wire; the locator decides what a missing
/// token or endpoint list means.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageAccess {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub endpoints: Option<Vec<RegionEndpoint>>,
}

/// Failure of an account API call.
#[derive(Debug, Error)]
pub enum AccountApiError {
    /// The API answered with a non-success HTTP status.
    #[error("account API responded with status code {0}")]
    Status(u16),

    /// Anything else (transport, decoding, signing).
    #[error(transparent)]
    Failed(#[from] Error),
}

/// Client of the cloud provider's account API.
#[async_trait]
pub trait AccountApi: Send + Sync {
    /// Request a storage token and the regional endpoints for a project.
    async fn request_storage_access(
        &self,
        service_id: &str,
    ) -> std::result::Result<StorageAccess, AccountApiError>;
}
