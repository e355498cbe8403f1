//! Resolution of a project/region pair to a storage endpoint.

use std::sync::Arc;
use tracing::debug;

use ovhdeploy_common::{Error, Result};

use crate::account::{AccountApi, AccountApiError};

/// Storage base URL plus the token that authorizes writes to it.
///
/// Created once per deploy and shared read-only by every upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEndpoint {
    pub base_url: String,
    pub access_token: String,
}

/// Finds the object storage of a project in a given region.
pub struct StorageLocator {
    api: Arc<dyn AccountApi>,
}

impl StorageLocator {
    /// Create a locator backed by an account API client.
    pub fn new(api: Arc<dyn AccountApi>) -> Self {
        Self { api }
    }

    /// Request storage access and pick the endpoint for `region`.
    ///
    /// The region must match exactly (case-sensitive); the first matching
    /// endpoint wins.
    ///
    /// # Errors
    /// - `Error::Auth` if no token was returned
    /// - `Error::NoStorage` if the project has no endpoints
    /// - `Error::RegionNotFound` if no endpoint serves `region`
    /// - `Error::AccessDenied` if the account API answered with a status code
    /// - any other account API failure, unchanged
    pub async fn locate(&self, service_id: &str, region: &str) -> Result<StorageEndpoint> {
        debug!(
            "Finding object storage for project `{}` and region `{}`...",
            service_id, region
        );

        let access = match self.api.request_storage_access(service_id).await {
            Ok(access) => access,
            Err(AccountApiError::Status(code)) => return Err(Error::AccessDenied(code)),
            Err(AccountApiError::Failed(err)) => return Err(err),
        };

        let token = access
            .token
            .filter(|t| !t.is_empty())
            .ok_or(Error::Auth)?;

        let endpoints = access
            .endpoints
            .filter(|e| !e.is_empty())
            .ok_or(Error::NoStorage)?;

        let endpoint = endpoints
            .into_iter()
            .find(|e| e.region == region)
            .ok_or_else(|| Error::RegionNotFound(region.to_string()))?;

        debug!(
            "Got object storage endpoint `{}` and token `{}`.",
            endpoint.url, token
        );

        Ok(StorageEndpoint {
            base_url: endpoint.url,
            access_token: token,
        })
    }
}
