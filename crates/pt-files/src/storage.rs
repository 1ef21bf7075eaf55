//! Storage backends
//!
//! Keys are relative paths such as `documents/<uuid>_<name>`. Local storage
//! maps them under a root directory; memory storage keeps them in a map.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use pt_core::error::TrackerError;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("File exceeds the {limit} byte upload limit")]
    LimitExceeded { limit: usize },
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for TrackerError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => TrackerError::not_found("File", key),
            StorageError::LimitExceeded { .. } => TrackerError::invalid_field("file", err.to_string()),
            StorageError::InvalidPath(_) | StorageError::IoError(_) => {
                TrackerError::Storage(err.to_string())
            }
        }
    }
}

/// Metadata of a stored blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub size: u64,
    pub content_type: String,
    /// SHA256 hex digest
    pub digest: String,
}

impl FileMetadata {
    fn describe(key: &str, data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self {
            size: data.len() as u64,
            content_type: content_type_for(key),
            digest: hex::encode(hasher.finalize()),
        }
    }
}

/// Blob storage backend
#[async_trait]
pub trait Storage: Send + Sync {
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<FileMetadata>;

    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Removing a missing key is not an error
    async fn delete(&self, key: &str) -> StorageResult<()>;

    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Largest accepted blob in bytes
    fn max_size(&self) -> usize;

    /// Backend name for logging
    fn name(&self) -> &str;

    /// Reject blobs above `max_size` before they are written
    fn check_size(&self, len: usize) -> StorageResult<()> {
        let limit = self.max_size();
        if len > limit {
            Err(StorageError::LimitExceeded { limit })
        } else {
            Ok(())
        }
    }
}

/// Local filesystem storage
pub struct LocalStorage {
    root: PathBuf,
    max_size: usize,
}

impl LocalStorage {
    pub fn new(root: impl AsRef<Path>, max_size: usize) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            max_size,
        }
    }

    fn resolve_path(&self, key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(key)
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || key.starts_with('\\') || !relative {
            return Err(StorageError::InvalidPath(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    #[instrument(skip(self, data), fields(storage = "local"))]
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<FileMetadata> {
        self.check_size(data.len())?;
        let path = self.resolve_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let metadata = FileMetadata::describe(key, &data);
        let mut file = fs::File::create(&path).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;

        debug!(path = ?path, size = metadata.size, "File stored");
        Ok(metadata)
    }

    #[instrument(skip(self), fields(storage = "local"))]
    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let path = self.resolve_path(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self), fields(storage = "local"))]
    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.resolve_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = ?path, "File deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.resolve_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn max_size(&self) -> usize {
        self.max_size
    }

    fn name(&self) -> &str {
        "local"
    }
}

/// In-memory storage for testing and memory-backed runs
pub struct MemoryStorage {
    files: RwLock<HashMap<String, Bytes>>,
    max_size: usize,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new(usize::MAX)
    }
}

impl MemoryStorage {
    pub fn new(max_size: usize) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            max_size,
        }
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<FileMetadata> {
        self.check_size(data.len())?;
        let metadata = FileMetadata::describe(key, &data);
        self.files.write().await.insert(key.to_string(), data);
        Ok(metadata)
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.files
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.files.write().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.files.read().await.contains_key(key))
    }

    fn max_size(&self) -> usize {
        self.max_size
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Unique key under `prefix` that keeps a sanitized form of the filename
pub fn storage_key(prefix: &str, filename: &str) -> String {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");
    let safe: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    format!("{}/{}_{}", prefix, Uuid::new_v4().simple(), safe)
}

/// Original filename portion of a key produced by [`storage_key`]
pub fn original_filename(key: &str) -> &str {
    let last = key.rsplit('/').next().unwrap_or(key);
    last.split_once('_').map(|(_, name)| name).unwrap_or(last)
}

/// MIME type guessed from a filename or key
pub fn content_type_for(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_put_get() {
        let storage = MemoryStorage::default();
        let data = Bytes::from("Hello, World!");

        let meta = storage.put("docs/brief.txt", data.clone()).await.unwrap();
        assert_eq!(meta.size, 13);
        assert_eq!(meta.content_type, "text/plain");
        assert_eq!(meta.digest.len(), 64);

        assert_eq!(storage.get("docs/brief.txt").await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_memory_storage_delete() {
        let storage = MemoryStorage::default();
        storage.put("a.txt", Bytes::from("x")).await.unwrap();
        assert!(storage.exists("a.txt").await.unwrap());

        storage.delete("a.txt").await.unwrap();
        assert!(!storage.exists("a.txt").await.unwrap());
        assert!(matches!(storage.get("a.txt").await, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_size_limit() {
        let storage = MemoryStorage::new(4);
        let result = storage.put("big.bin", Bytes::from("12345")).await;
        assert!(matches!(result, Err(StorageError::LimitExceeded { limit: 4 })));
    }

    #[tokio::test]
    async fn test_local_storage_round_trip() {
        let root = std::env::temp_dir().join(format!("pt-files-{}", Uuid::new_v4()));
        let storage = LocalStorage::new(&root, 1024);

        storage.put("leads/spec.pdf", Bytes::from("%PDF")).await.unwrap();
        assert!(storage.exists("leads/spec.pdf").await.unwrap());
        assert_eq!(storage.get("leads/spec.pdf").await.unwrap(), Bytes::from("%PDF"));

        storage.delete("leads/spec.pdf").await.unwrap();
        storage.delete("leads/spec.pdf").await.unwrap();
        assert!(!storage.exists("leads/spec.pdf").await.unwrap());

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_local_storage_path_traversal() {
        let storage = LocalStorage::new(std::env::temp_dir(), 1024);
        let result = storage.get("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn test_local_storage_dotted_filenames() {
        let root = std::env::temp_dir().join(format!("pt-files-{}", Uuid::new_v4()));
        let storage = LocalStorage::new(&root, 1024);

        for filename in ["Report v1..2.pdf", "Draft...docx"] {
            let key = storage_key("documents", filename);
            storage.put(&key, Bytes::from("body")).await.unwrap();
            assert_eq!(storage.get(&key).await.unwrap(), Bytes::from("body"));
        }
        assert!(matches!(
            storage.put("documents/../escape.txt", Bytes::from("x")).await,
            Err(StorageError::InvalidPath(_))
        ));
        assert!(matches!(
            storage.put("/etc/escape.txt", Bytes::from("x")).await,
            Err(StorageError::InvalidPath(_))
        ));

        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn test_storage_key() {
        let key = storage_key("documents", "../Тех задание v2.docx");
        assert!(key.starts_with("documents/"));
        assert!(key.ends_with("_Тех_задание_v2.docx"));
        assert_eq!(original_filename(&key), "Тех_задание_v2.docx");
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type_for("report.pdf"), "application/pdf");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}
