//! Blob storage for rendered agreement documents.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Where a document ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub key: String,
    pub url: String,
}

#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Stores `bytes` under `key` and returns its public URL.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the key is rejected or the write fails.
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredDocument, StorageError>;
}

/// Stores documents on the local filesystem below `root`, served by the API
/// under `/documents`.
#[derive(Debug, Clone)]
pub struct LocalDocumentStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalDocumentStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_owned(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_plain {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredDocument, StorageError> {
        let path = self.resolve(key)?;
        let io_err = |source: std::io::Error| StorageError::Io {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        tokio::fs::write(&path, &bytes).await.map_err(io_err)?;

        tracing::debug!(key, content_type, size = bytes.len(), "document stored");

        Ok(StoredDocument {
            key: key.to_owned(),
            url: format!("{}/documents/{key}", self.public_base_url),
        })
    }
}

/// `agreements/<id>-<vendor>-<millis>.html`, with every non-alphanumeric
/// character of the vendor name replaced by `_`.
#[must_use]
pub fn document_key(agreement_id: i64, vendor_name: &str, unix_millis: i64) -> String {
    let vendor: String = vendor_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("agreements/{agreement_id}-{vendor}-{unix_millis}.html")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_key_sanitizes_vendor_name() {
        assert_eq!(
            document_key(42, "Spice Island Tours & Co.", 1_760_000_000_000),
            "agreements/42-Spice_Island_Tours___Co_-1760000000000.html"
        );
    }

    #[tokio::test]
    async fn put_writes_below_root_and_builds_url() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalDocumentStore::new(dir.path(), "http://localhost:3000/");

        let stored = store
            .put("agreements/1-a-2.html", b"<html></html>".to_vec(), "text/html")
            .await
            .expect("put");

        assert_eq!(stored.key, "agreements/1-a-2.html");
        assert_eq!(
            stored.url,
            "http://localhost:3000/documents/agreements/1-a-2.html"
        );
        let written = std::fs::read(dir.path().join("agreements/1-a-2.html")).expect("read back");
        assert_eq!(written, b"<html></html>");
    }

    #[tokio::test]
    async fn put_rejects_keys_escaping_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalDocumentStore::new(dir.path(), "http://localhost:3000");

        for key in ["../outside.html", "/etc/passwd", "a/../../b.html", ""] {
            let err = store
                .put(key, Vec::new(), "text/html")
                .await
                .expect_err("key should be rejected");
            assert!(matches!(err, StorageError::InvalidKey(_)), "key {key:?}");
        }
    }
}
