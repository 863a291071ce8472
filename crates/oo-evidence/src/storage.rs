//! Storage Abstraction
//!
//! Path-addressed file storage. Keys are relative paths such as
//! `evidence/2026/10/16/user-7/01-Dina-Jumat-20261016_093000.png`.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use oo_core::OoError;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for OoError {
    fn from(err: StorageError) -> Self {
        OoError::storage("file storage", err)
    }
}

/// File metadata from storage
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// File size in bytes
    pub size: u64,
    /// Content type (MIME)
    pub content_type: String,
    /// SHA256 digest
    pub digest: String,
}

impl FileMetadata {
    fn describe(key: &str, data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self {
            size: data.len() as u64,
            content_type: mime_guess::from_path(key)
                .first_or_octet_stream()
                .to_string(),
            digest: hex::encode(hasher.finalize()),
        }
    }
}

/// Storage trait - unified interface for storage backends
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store data under a path, replacing any existing file
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<FileMetadata>;

    /// Retrieve data by path
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Check if a file or directory exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Move a file to a new path
    async fn rename(&self, from_key: &str, to_key: &str) -> StorageResult<()>;

    /// Delete a file; missing files are not an error
    async fn delete(&self, key: &str) -> StorageResult<()>;

    async fn make_directory(&self, key: &str) -> StorageResult<()>;

    /// Delete a directory and everything below it
    async fn delete_directory(&self, key: &str) -> StorageResult<()>;

    /// Paths of the immediate subdirectories of `key`
    async fn directories(&self, key: &str) -> StorageResult<Vec<String>>;

    /// Public URL of a path
    fn url(&self, key: &str) -> String;

    /// Get storage name for logging
    fn name(&self) -> &str;
}

fn validate_key(key: &str) -> StorageResult<()> {
    // Prevent directory traversal
    if key.is_empty()
        || key.split('/').any(|part| part == "..")
        || key.starts_with('/')
        || key.starts_with('\\')
    {
        return Err(StorageError::InvalidPath(key.to_string()));
    }
    Ok(())
}

fn join_url(base_url: &str, key: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), key)
}

/// Local filesystem storage
pub struct LocalStorage {
    /// Root directory for storage
    root: PathBuf,
    /// Base URL for generating URLs
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage
    pub fn new(root: impl AsRef<Path>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            base_url: base_url.into(),
        }
    }

    /// Resolve a key to a full path
    fn resolve_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    /// Ensure parent directory exists
    async fn ensure_parent(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    #[instrument(skip(self, data), fields(storage = "local", size = data.len()))]
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<FileMetadata> {
        let path = self.resolve_path(key)?;
        self.ensure_parent(&path).await?;

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

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.resolve_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    #[instrument(skip(self), fields(storage = "local"))]
    async fn rename(&self, from_key: &str, to_key: &str) -> StorageResult<()> {
        let from_path = self.resolve_path(from_key)?;
        let to_path = self.resolve_path(to_key)?;

        if !fs::try_exists(&from_path).await? {
            return Err(StorageError::NotFound(from_key.to_string()));
        }

        self.ensure_parent(&to_path).await?;
        fs::rename(&from_path, &to_path).await?;
        debug!(from = ?from_path, to = ?to_path, "File moved");
        Ok(())
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

    async fn make_directory(&self, key: &str) -> StorageResult<()> {
        let path = self.resolve_path(key)?;
        fs::create_dir_all(&path).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(storage = "local"))]
    async fn delete_directory(&self, key: &str) -> StorageResult<()> {
        let path = self.resolve_path(key)?;
        match fs::remove_dir_all(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn directories(&self, key: &str) -> StorageResult<Vec<String>> {
        let path = self.resolve_path(key)?;
        let mut entries = match fs::read_dir(&path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut dirs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    dirs.push(format!("{}/{}", key.trim_end_matches('/'), name));
                }
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    fn url(&self, key: &str) -> String {
        join_url(&self.base_url, key)
    }

    fn name(&self) -> &str {
        "local"
    }
}

/// In-memory storage for testing
pub struct MemoryStorage {
    files: RwLock<HashMap<String, (Bytes, FileMetadata)>>,
    directories: RwLock<HashSet<String>>,
    base_url: String,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            directories: RwLock::new(HashSet::new()),
            base_url: "/storage".to_string(),
        }
    }

    /// All stored file paths, sorted
    pub async fn paths(&self) -> Vec<String> {
        let files = self.files.read().await;
        let mut paths: Vec<String> = files.keys().cloned().collect();
        paths.sort();
        paths
    }
}

fn is_below(path: &str, dir: &str) -> bool {
    path.strip_prefix(dir.trim_end_matches('/'))
        .map(|rest| rest.starts_with('/'))
        .unwrap_or(false)
}

#[async_trait]
impl Storage for MemoryStorage {
    #[instrument(skip(self, data), fields(storage = "memory", size = data.len()))]
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<FileMetadata> {
        validate_key(key)?;
        let metadata = FileMetadata::describe(key, &data);
        let mut files = self.files.write().await;
        files.insert(key.to_string(), (data, metadata.clone()));
        Ok(metadata)
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let files = self.files.read().await;
        files
            .get(key)
            .map(|(data, _)| data.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        if self.files.read().await.contains_key(key) {
            return Ok(true);
        }
        if self.directories.read().await.contains(key) {
            return Ok(true);
        }
        let files = self.files.read().await;
        Ok(files.keys().any(|path| is_below(path, key)))
    }

    #[instrument(skip(self), fields(storage = "memory"))]
    async fn rename(&self, from_key: &str, to_key: &str) -> StorageResult<()> {
        validate_key(to_key)?;
        let mut files = self.files.write().await;
        let entry = files
            .remove(from_key)
            .ok_or_else(|| StorageError::NotFound(from_key.to_string()))?;
        files.insert(to_key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let mut files = self.files.write().await;
        files.remove(key);
        Ok(())
    }

    async fn make_directory(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        let mut dirs = self.directories.write().await;
        dirs.insert(key.trim_end_matches('/').to_string());
        Ok(())
    }

    async fn delete_directory(&self, key: &str) -> StorageResult<()> {
        let key = key.trim_end_matches('/');
        {
            let mut files = self.files.write().await;
            files.retain(|path, _| !is_below(path, key));
        }
        let mut dirs = self.directories.write().await;
        dirs.retain(|dir| dir != key && !is_below(dir, key));
        Ok(())
    }

    async fn directories(&self, key: &str) -> StorageResult<Vec<String>> {
        let key = key.trim_end_matches('/');
        let mut found = BTreeSet::new();

        let child_of = |path: &str| -> Option<String> {
            let rest = path.strip_prefix(key)?.strip_prefix('/')?;
            let (child, _) = rest.split_once('/')?;
            Some(format!("{}/{}", key, child))
        };

        for path in self.files.read().await.keys() {
            if let Some(child) = child_of(path) {
                found.insert(child);
            }
        }
        for dir in self.directories.read().await.iter() {
            // a directory path counts as its own child entry
            if let Some(child) = child_of(&format!("{}/", dir)) {
                found.insert(child);
            }
        }

        Ok(found.into_iter().collect())
    }

    fn url(&self, key: &str) -> String {
        join_url(&self.base_url, key)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
