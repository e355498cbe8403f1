//! In-memory object store for testing.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use ovhdeploy_common::{Error, Result};

use crate::store::{ByteStream, ObjectResponse, ObjectStore};

/// HTTP method of a recorded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
}

/// A request seen by the memory store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub token: String,
}

#[derive(Default)]
struct State {
    objects: HashMap<String, Vec<u8>>,
    statuses: HashMap<String, u16>,
    unreachable: HashSet<String>,
    requests: Vec<RecordedRequest>,
}

/// In-memory object store.
///
/// Objects are keyed by their absolute URL. Individual URLs can be told to
/// answer with a fixed status or to fail at the transport level, which makes
/// it easy to script partial failures. All data is lost on drop.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    token: Option<String>,
}

impl MemoryStore {
    /// Create a new empty store that accepts any token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that answers 401 to any other token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            state: Mutex::default(),
            token: Some(token.into()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed an object.
    pub fn insert_object(&self, url: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.lock().objects.insert(url.into(), data.into());
    }

    /// Answer every request to `url` with `status`, storing nothing.
    pub fn respond_with(&self, url: impl Into<String>, status: u16) {
        self.lock().statuses.insert(url.into(), status);
    }

    /// Fail every request to `url` with a transport error.
    pub fn fail_transport(&self, url: impl Into<String>) {
        self.lock().unreachable.insert(url.into());
    }

    /// Get a stored object.
    pub fn object(&self, url: &str) -> Option<Vec<u8>> {
        self.lock().objects.get(url).cloned()
    }

    /// All requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// URLs of all PUT requests received so far.
    pub fn put_urls(&self) -> Vec<String> {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == Method::Put)
            .map(|r| r.url.clone())
            .collect()
    }

    /// Record a request and return the scripted outcome, if any.
    fn record(&self, method: Method, url: &str, token: &str) -> Result<Option<u16>> {
        let mut state = self.lock();
        state.requests.push(RecordedRequest {
            method,
            url: url.to_string(),
            token: token.to_string(),
        });

        if state.unreachable.contains(url) {
            return Err(Error::Network(format!("Connection refused: {}", url)));
        }
        if let Some(expected) = &self.token {
            if expected != token {
                return Ok(Some(401));
            }
        }
        Ok(state.statuses.get(url).copied())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_object(&self, url: &str, token: &str) -> Result<ObjectResponse> {
        if let Some(status) = self.record(Method::Get, url, token)? {
            return Ok(ObjectResponse {
                status,
                body: Bytes::new(),
            });
        }

        let response = match self.lock().objects.get(url) {
            Some(data) => ObjectResponse {
                status: 200,
                body: Bytes::from(data.clone()),
            },
            None => ObjectResponse {
                status: 404,
                body: Bytes::new(),
            },
        };
        Ok(response)
    }

    async fn put_object(&self, url: &str, token: &str, mut body: ByteStream) -> Result<u16> {
        let scripted = self.record(Method::Put, url, token)?;

        let mut data = Vec::new();
        while let Some(chunk) = body.next().await {
            data.extend_from_slice(&chunk?);
        }

        if let Some(status) = scripted {
            return Ok(status);
        }

        self.lock().objects.insert(url.to_string(), data);
        Ok(201)
    }
}
