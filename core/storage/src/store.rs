//! Object store trait definition.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::path::Path;
use std::pin::Pin;
use tokio_util::io::ReaderStream;

use ovhdeploy_common::{Error, Result};

/// Byte stream type for upload bodies.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send + Sync>>;

/// Raw answer to an object read.
#[derive(Debug, Clone)]
pub struct ObjectResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Bytes,
}

impl ObjectResponse {
    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Token-authenticated access to objects addressed by absolute URL.
///
/// Implementations report the status the storage answered with and only
/// fail for transport problems; deciding which status means success is
/// left to the caller.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Get the store name (e.g., "swift", "memory").
    fn name(&self) -> &str;

    /// Read an object.
    ///
    /// # Errors
    /// - Network errors (connection refused, reset, invalid response)
    async fn get_object(&self, url: &str, token: &str) -> Result<ObjectResponse>;

    /// Write an object, streaming `body` as the request payload.
    ///
    /// Returns the HTTP status code of the response.
    ///
    /// # Errors
    /// - Network errors, including failures while reading `body`
    async fn put_object(&self, url: &str, token: &str, body: ByteStream) -> Result<u16>;
}

/// Open a local file as an upload body.
///
/// # Errors
/// - `Error::Filesystem` if the file cannot be opened
pub async fn open_file_stream(path: &Path) -> Result<ByteStream> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|source| Error::Filesystem {
            path: path.to_path_buf(),
            source,
        })?;

    let owned = path.to_path_buf();
    let stream = ReaderStream::new(file).map(move |chunk| {
        chunk.map_err(|source| Error::Filesystem {
            path: owned.clone(),
            source,
        })
    });

    Ok(Box::pin(stream))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_file_stream_reads_contents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app.js");
        tokio::fs::write(&path, b"console.log(1);").await.unwrap();

        let mut stream = open_file_stream(&path).await.unwrap();
        let mut data = Vec::new();
        while let Some(chunk) = stream.next().await {
            data.extend_from_slice(&chunk.unwrap());
        }

        assert_eq!(data, b"console.log(1);");
    }

    #[tokio::test]
    async fn test_open_file_stream_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = open_file_stream(&temp.path().join("missing.js")).await;

        assert!(matches!(result, Err(Error::Filesystem { .. })));
    }

    #[test]
    fn test_object_response_text() {
        let response = ObjectResponse {
            status: 200,
            body: Bytes::from_static(b"app.css\n"),
        };
        assert_eq!(response.text(), "app.css\n");
    }
}
