//! Media storage boundary.
//!
//! Listings and category logos reference images by URL only; the bytes live
//! behind the `MediaStorage` trait. The default adapter is a content-addressed
//! local filesystem store served back over a static route.

use async_trait::async_trait;
use base64::Engine;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tokio::fs;

use crate::errors::ServiceError;

/// Blob store contract: store bytes under a folder, get a URL back; delete
/// by the URL previously issued.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    async fn upload(&self, data: Vec<u8>, folder: &str) -> Result<String, ServiceError>;
    async fn delete(&self, url: &str) -> Result<(), ServiceError>;
}

/// Decode a client-supplied image payload: either plain base64 or a
/// `data:<mime>;base64,<payload>` URI.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, ServiceError> {
    let encoded = match payload.split_once(";base64,") {
        Some((_, rest)) => rest,
        None => payload,
    };
    base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| ServiceError::Validation(format!("invalid image payload: {}", e)))
}

/// Local filesystem implementation of `MediaStorage`.
///
/// Files are stored content-addressed (SHA-256 of the bytes) under
/// `<root>/<folder>/<hash>`; identical uploads map to the same path.
pub struct LocalMediaStorage {
    root: PathBuf,
    url_prefix: String,
}

impl LocalMediaStorage {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self { root: root.into(), url_prefix: url_prefix.into() }
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn upload(&self, data: Vec<u8>, folder: &str) -> Result<String, ServiceError> {
        if data.is_empty() {
            return Err(ServiceError::Validation("empty image payload".into()));
        }
        let mut hasher = Sha256::new();
        hasher.update(&data);
        let hash = hex::encode(hasher.finalize());

        let dir = self.root.join(folder);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let path = dir.join(&hash);
        if fs::metadata(&path).await.is_err() {
            fs::write(&path, &data)
                .await
                .map_err(|e| ServiceError::Storage(e.to_string()))?;
        }

        Ok(format!("{}/{}/{}", self.url_prefix, folder, hash))
    }

    async fn delete(&self, url: &str) -> Result<(), ServiceError> {
        let rel = url
            .strip_prefix(&self.url_prefix)
            .and_then(|r| r.strip_prefix('/'))
            .ok_or_else(|| ServiceError::Storage(format!("url outside managed prefix: {}", url)))?;
        if rel.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
            return Err(ServiceError::Storage(format!("refusing suspicious media path: {}", rel)));
        }
        match fs::remove_file(self.root.join(rel)).await {
            Ok(()) => Ok(()),
            // Deleting an already-gone blob is a no-op, not a failure.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ServiceError::Storage(e.to_string())),
        }
    }
}

/// In-memory test double recording uploads and deletes.
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Payload bytes that make the mock fail the upload.
    pub const FAILING_BYTES: &[u8] = b"FAIL";

    #[derive(Default)]
    pub struct MockMediaStorage {
        counter: AtomicUsize,
        pub uploaded: Mutex<Vec<String>>,
        pub deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MediaStorage for MockMediaStorage {
        async fn upload(&self, data: Vec<u8>, folder: &str) -> Result<String, ServiceError> {
            if data == FAILING_BYTES {
                return Err(ServiceError::Storage("simulated upload failure".into()));
            }
            let n = self.counter.fetch_add(1, Ordering::SeqCst);
            let url = format!("/uploads/{}/mock-{}", folder, n);
            self.uploaded.lock().unwrap().push(url.clone());
            Ok(url)
        }

        async fn delete(&self, url: &str) -> Result<(), ServiceError> {
            self.deleted.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_accepts_plain_base64() {
        let bytes = decode_payload("aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn decode_accepts_data_uri() {
        let bytes = decode_payload("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_payload("%%not-base64%%").is_err());
    }

    #[tokio::test]
    async fn local_store_round_trip() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("media_store_{}", uuid::Uuid::new_v4()));
        let store = LocalMediaStorage::new(&tmp, "/uploads");

        let url = store.upload(b"image-bytes".to_vec(), "services").await?;
        assert!(url.starts_with("/uploads/services/"));

        // Same content, same URL (content-addressed)
        let again = store.upload(b"image-bytes".to_vec(), "services").await?;
        assert_eq!(url, again);

        store.delete(&url).await?;
        // Idempotent delete
        store.delete(&url).await?;

        let _ = tokio::fs::remove_dir_all(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn local_store_rejects_foreign_urls() {
        let store = LocalMediaStorage::new("/tmp/nope", "/uploads");
        assert!(store.delete("https://cdn.example.com/x.png").await.is_err());
        assert!(store.delete("/uploads/../etc/passwd").await.is_err());
    }
}
