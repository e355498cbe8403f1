//! Signed HTTP client for the OVH account API.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header, Client, Method};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::debug;

use ovhdeploy_common::Error;

use crate::account::{AccountApi, AccountApiError, StorageAccess};

use super::auth::{ApiEndpoint, Credentials};

type ApiResult<T> = std::result::Result<T, AccountApiError>;

/// OVH account API client.
pub struct OvhClient {
    http: Client,
    endpoint: ApiEndpoint,
    credentials: Credentials,
    /// Server clock minus local clock, in seconds. Fetched once.
    time_delta: OnceCell<i64>,
}

impl OvhClient {
    /// Create a new API client.
    ///
    /// # Errors
    /// - The underlying HTTP client cannot be built
    pub fn new(endpoint: ApiEndpoint, credentials: Credentials) -> ovhdeploy_common::Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("ovhdeploy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint,
            credentials,
            time_delta: OnceCell::new(),
        })
    }

    /// Difference between the API server clock and ours.
    async fn time_delta(&self) -> ApiResult<i64> {
        self.time_delta
            .get_or_try_init(|| async {
                let url = self.endpoint.url("/auth/time");
                let response = self
                    .http
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| Error::Network(format!("Failed to get API time: {}", e)))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(AccountApiError::Status(status.as_u16()));
                }

                let text = response
                    .text()
                    .await
                    .map_err(|e| Error::Network(format!("Failed to read API time: {}", e)))?;
                let server_time: i64 = text.trim().parse().map_err(|_| {
                    Error::Serialization(format!("Invalid API time `{}`", text.trim()))
                })?;

                let delta = server_time - Utc::now().timestamp();
                debug!("OVH API clock delta is {}s", delta);
                Ok(delta)
            })
            .await
            .copied()
    }

    /// Perform a signed call and decode the JSON answer.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> ApiResult<T> {
        let url = self.endpoint.url(path);
        let body = match body {
            Some(value) => serde_json::to_string(value).map_err(Error::from)?,
            None => String::new(),
        };
        let timestamp = Utc::now().timestamp() + self.time_delta().await?;
        let signature = self
            .credentials
            .sign(method.as_str(), &url, &body, timestamp);

        let response = self
            .http
            .request(method, &url)
            .header(header::CONTENT_TYPE, "application/json")
            .header("X-Ovh-Application", &self.credentials.app_key)
            .header("X-Ovh-Consumer", self.credentials.consumer_key.expose())
            .header("X-Ovh-Timestamp", timestamp.to_string())
            .header("X-Ovh-Signature", signature)
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Network(format!("API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AccountApiError::Status(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("Failed to parse API response: {}", e)).into())
    }
}

#[async_trait]
impl AccountApi for OvhClient {
    async fn request_storage_access(&self, service_id: &str) -> ApiResult<StorageAccess> {
        let path = format!("/cloud/project/{}/storage/access", service_id);
        self.call(Method::POST, &path, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use httpmock::MockServer;

    fn client(server: &MockServer) -> OvhClient {
        OvhClient::new(
            ApiEndpoint::parse(&server.base_url()).unwrap(),
            Credentials::new("app", "secret", "consumer"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_request_storage_access() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/auth/time");
            then.status(200).body(Utc::now().timestamp().to_string());
        });
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/cloud/project/svc/storage/access")
                .header("x-ovh-application", "app")
                .header("x-ovh-consumer", "consumer")
                .header_exists("x-ovh-signature")
                .header_exists("x-ovh-timestamp");
            then.status(200).json_body(serde_json::json!({
                "token": "tok",
                "endpoints": [{"region": "GRA1", "url": "https://storage.gra1/v1/AUTH_p"}]
            }));
        });

        let access = client(&server)
            .request_storage_access("svc")
            .await
            .unwrap();

        mock.assert();
        assert_eq!(access.token.as_deref(), Some("tok"));
        assert_eq!(access.endpoints.unwrap()[0].region, "GRA1");
    }

    #[tokio::test]
    async fn test_error_status_is_surfaced() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/auth/time");
            then.status(200).body(Utc::now().timestamp().to_string());
        });
        server.mock(|when, then| {
            when.method(POST).path("/cloud/project/svc/storage/access");
            then.status(403).body(r#"{"message":"This call has not been granted"}"#);
        });

        let result = client(&server).request_storage_access("svc").await;
        assert!(matches!(result, Err(AccountApiError::Status(403))));
    }

    #[tokio::test]
    async fn test_time_is_fetched_once() {
        let server = MockServer::start_async().await;
        let time = server.mock(|when, then| {
            when.method(GET).path("/auth/time");
            then.status(200).body(Utc::now().timestamp().to_string());
        });
        server.mock(|when, then| {
            when.method(POST).path("/cloud/project/svc/storage/access");
            then.status(200).json_body(serde_json::json!({}));
        });

        let client = client(&server);
        client.request_storage_access("svc").await.unwrap();
        client.request_storage_access("svc").await.unwrap();

        time.assert();
    }

    #[tokio::test]
    async fn test_unreachable_api() {
        let client = OvhClient::new(
            ApiEndpoint::parse("http://127.0.0.1:1").unwrap(),
            Credentials::new("app", "secret", "consumer"),
        )
        .unwrap();

        let result = client.request_storage_access("svc").await;
        assert!(matches!(
            result,
            Err(AccountApiError::Failed(Error::Network(_)))
        ));
    }
}
