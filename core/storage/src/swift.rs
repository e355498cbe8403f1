//! OpenStack Swift object storage client.

use async_trait::async_trait;
use reqwest::{Body, Client};

use ovhdeploy_common::{Error, Result};

use crate::store::{ByteStream, ObjectResponse, ObjectStore};

/// Header carrying the storage access token.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Swift object storage client over HTTPS.
#[derive(Debug, Clone)]
pub struct SwiftClient {
    http: Client,
}

impl SwiftClient {
    /// Create a new Swift client.
    ///
    /// # Errors
    /// - The underlying HTTP client cannot be built (TLS backend failure)
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("ovhdeploy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http })
    }

    /// Create a client around an existing HTTP client.
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ObjectStore for SwiftClient {
    fn name(&self) -> &str {
        "swift"
    }

    async fn get_object(&self, url: &str, token: &str) -> Result<ObjectResponse> {
        let response = self
            .http
            .get(url)
            .header(AUTH_TOKEN_HEADER, token)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to get object: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("Failed to read object body: {}", e)))?;

        Ok(ObjectResponse { status, body })
    }

    async fn put_object(&self, url: &str, token: &str, body: ByteStream) -> Result<u16> {
        let response = self
            .http
            .put(url)
            .header(AUTH_TOKEN_HEADER, token)
            .body(Body::wrap_stream(body))
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to put object: {}", e)))?;

        Ok(response.status().as_u16())
    }
}
