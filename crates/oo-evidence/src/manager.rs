//! Evidence batch lifecycle
//!
//! Stages new evidence files, re-stages existing ones with a lifecycle marker
//! and purges superseded files. Callers commit the record between staging and
//! purging; see [`EvidenceManager::discard`] for the compensating step.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use oo_core::types::Locale;
use oo_core::{Id, OoError, OoResult};
use serde::Serialize;
use tracing::{debug, error, instrument, warn};

use crate::naming::{evidence_directory, file_stem, restage, EvidenceName, Stage};
use crate::storage::Storage;
use crate::upload::EvidenceUpload;

/// Attempts at a free name before a batch is refused
const MAX_COPIES: u32 = 50;

/// Naming context for one evidence submission
#[derive(Debug, Clone)]
pub struct EvidenceBatch {
    pub user_id: Id,
    pub user_name: String,
    /// Daily sequence of the todo
    pub sequence: i32,
    /// Submission instant in the regional timezone
    pub at: DateTime<FixedOffset>,
    pub locale: Locale,
    pub stage: Option<Stage>,
}

/// Presentation data for one evidence path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceFile {
    pub name: String,
    pub path: String,
    pub url: String,
    pub exists: bool,
}

pub struct EvidenceManager {
    storage: Arc<dyn Storage>,
}

impl EvidenceManager {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Writes every upload; on failure the files already written are removed.
    /// Existing files are never replaced: a taken name gets a copy number.
    #[instrument(skip(self, uploads), fields(user_id = batch.user_id, files = uploads.len()))]
    pub async fn store_batch(
        &self,
        batch: &EvidenceBatch,
        uploads: &[EvidenceUpload],
    ) -> OoResult<Vec<String>> {
        let directory = evidence_directory(batch.user_id, &batch.at);
        let mut written = Vec::with_capacity(uploads.len());

        for (position, upload) in uploads.iter().enumerate() {
            let extension = upload.extension();
            let name = EvidenceName {
                sequence: batch.sequence,
                user_name: &batch.user_name,
                at: batch.at,
                locale: batch.locale,
                copy: None,
                index: (uploads.len() > 1).then_some(position + 1),
                stage: batch.stage,
                extension: &extension,
            };

            match self.stage_one(&directory, name, upload).await {
                Ok(path) => written.push(path),
                Err(err) => {
                    error!(user_id = batch.user_id, error = %err, "Failed to store evidence file");
                    self.discard(&written).await;
                    return Err(err);
                }
            }
        }

        debug!(count = written.len(), "Evidence batch stored");
        Ok(written)
    }

    async fn stage_one(
        &self,
        directory: &str,
        name: EvidenceName<'_>,
        upload: &EvidenceUpload,
    ) -> OoResult<String> {
        let path = self.free_path(directory, name).await?;
        self.storage
            .put(&path, upload.data.clone())
            .await
            .map_err(|err| OoError::storage("store evidence", err))?;
        Ok(path)
    }

    /// First path for `name` that no stored file occupies
    async fn free_path(&self, directory: &str, mut name: EvidenceName<'_>) -> OoResult<String> {
        for copy in 1..=MAX_COPIES {
            name.copy = (copy > 1).then_some(copy);
            let path = format!("{}/{}", directory, name.file_name());
            let taken = self
                .storage
                .exists(&path)
                .await
                .map_err(|err| OoError::storage("check evidence path", err))?;
            if !taken {
                return Ok(path);
            }
            warn!(path = %path, "Evidence path already taken");
        }
        Err(OoError::storage(
            "store evidence",
            format!("no free file name in {}", directory),
        ))
    }

    /// Stores a single upload at an explicit path
    #[instrument(skip(self, upload), fields(size = upload.data.len()))]
    pub async fn store_at(&self, path: &str, upload: &EvidenceUpload) -> OoResult<String> {
        self.storage
            .put(path, upload.data.clone())
            .await
            .map_err(|err| {
                error!(path = %path, error = %err, "Failed to store file");
                OoError::storage("store file", err)
            })?;
        Ok(path.to_string())
    }

    /// Renames every file to carry `stage`. A file that cannot be moved keeps
    /// its old path in the result.
    #[instrument(skip(self, paths), fields(files = paths.len(), stage = %stage))]
    pub async fn restage_all(&self, paths: &[String], stage: Stage) -> Vec<String> {
        let mut renamed = Vec::with_capacity(paths.len());
        for path in paths {
            let target = restage(path, stage);
            if target == *path {
                renamed.push(target);
                continue;
            }
            match self.storage.rename(path, &target).await {
                Ok(()) => renamed.push(target),
                Err(err) => {
                    warn!(from = %path, to = %target, error = %err, "Failed to rename evidence file");
                    renamed.push(path.clone());
                }
            }
        }
        renamed
    }

    /// Moves re-staged files back to their previous paths, best effort
    pub async fn revert(&self, previous: &[String], restaged: &[String]) {
        for (current, original) in restaged.iter().zip(previous) {
            if current == original {
                continue;
            }
            if let Err(err) = self.storage.rename(current, original).await {
                warn!(from = %current, to = %original, error = %err, "Failed to restore evidence file");
            }
        }
    }

    /// Deletes the old files that are not part of the new set
    pub async fn purge_superseded(&self, old_paths: &[String], new_paths: &[String]) {
        let stale: Vec<String> = old_paths
            .iter()
            .filter(|path| !new_paths.contains(path))
            .cloned()
            .collect();
        self.discard(&stale).await;
    }

    /// Best-effort deletion
    pub async fn discard(&self, paths: &[String]) {
        for path in paths {
            if let Err(err) = self.storage.delete(path).await {
                warn!(path = %path, error = %err, "Failed to delete evidence file");
            }
        }
    }

    pub async fn describe(&self, path: &str) -> EvidenceFile {
        let exists = match self.storage.exists(path).await {
            Ok(exists) => exists,
            Err(err) => {
                warn!(path = %path, error = %err, "Failed to check evidence file");
                false
            }
        };
        EvidenceFile {
            name: file_stem(path).to_string(),
            path: path.to_string(),
            url: self.storage.url(path),
            exists,
        }
    }

    pub async fn describe_all(&self, paths: &[String]) -> Vec<EvidenceFile> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            files.push(self.describe(path).await);
        }
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileMetadata, MemoryStorage, StorageError, StorageResult};
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::TimeZone;

    fn batch(stage: Option<Stage>) -> EvidenceBatch {
        EvidenceBatch {
            user_id: 7,
            user_name: "Dina Putri".into(),
            sequence: 2,
            at: FixedOffset::east_opt(7 * 3600)
                .unwrap()
                .with_ymd_and_hms(2026, 10, 16, 9, 30, 0)
                .unwrap(),
            locale: Locale::Id,
            stage,
        }
    }

    fn uploads(n: usize) -> Vec<EvidenceUpload> {
        (0..n)
            .map(|i| EvidenceUpload::new(format!("photo{}.png", i), "img"))
            .collect()
    }

    #[tokio::test]
    async fn test_single_upload_has_no_index() {
        let manager = EvidenceManager::new(Arc::new(MemoryStorage::new()));
        let paths = manager.store_batch(&batch(None), &uploads(1)).await.unwrap();
        assert_eq!(
            paths,
            vec!["evidence/2026/10/16/user-7/02-Dina Putri-Jumat-20261016_093000.png".to_string()]
        );
    }

    #[tokio::test]
    async fn test_batch_is_indexed_and_staged() {
        let storage = Arc::new(MemoryStorage::new());
        let manager = EvidenceManager::new(storage.clone());
        let paths = manager
            .store_batch(&batch(Some(Stage::Reworked)), &uploads(2))
            .await
            .unwrap();

        assert!(paths[0].ends_with("20261016_093000-1-Reworked.png"));
        assert!(paths[1].ends_with("20261016_093000-2-Reworked.png"));
        assert_eq!(storage.paths().await.len(), 2);
    }

    #[tokio::test]
    async fn test_taken_name_is_not_overwritten() {
        let storage = Arc::new(MemoryStorage::new());
        let manager = EvidenceManager::new(storage.clone());
        let first = manager.store_batch(&batch(None), &uploads(1)).await.unwrap();
        let second = manager
            .store_batch(&batch(None), &[EvidenceUpload::new("other.png", "other")])
            .await
            .unwrap();
        let third = manager.store_batch(&batch(None), &uploads(1)).await.unwrap();

        assert!(second[0].ends_with("/02-Dina Putri-Jumat-20261016_093000_2.png"));
        assert!(third[0].ends_with("/02-Dina Putri-Jumat-20261016_093000_3.png"));
        assert_eq!(storage.get(&first[0]).await.unwrap(), Bytes::from("img"));
        assert_eq!(storage.get(&second[0]).await.unwrap(), Bytes::from("other"));
        assert_eq!(storage.paths().await.len(), 3);
    }

    #[tokio::test]
    async fn test_restage_and_purge() {
        let storage = Arc::new(MemoryStorage::new());
        let manager = EvidenceManager::new(storage.clone());
        let original = manager.store_batch(&batch(None), &uploads(2)).await.unwrap();

        let approved = manager.restage_all(&original, Stage::Approved).await;
        assert!(approved.iter().all(|p| p.ends_with("-Approved.png")));
        assert!(approved[0].contains("/02-Dina Putri-"));

        manager.purge_superseded(&approved, &approved[..1]).await;
        assert_eq!(storage.paths().await, vec![approved[0].clone()]);
    }

    #[tokio::test]
    async fn test_restage_keeps_missing_paths() {
        let manager = EvidenceManager::new(Arc::new(MemoryStorage::new()));
        let paths = vec!["evidence/gone.png".to_string()];
        let renamed = manager.restage_all(&paths, Stage::Deleted).await;
        assert_eq!(renamed, paths);
    }

    #[tokio::test]
    async fn test_describe() {
        let manager = EvidenceManager::new(Arc::new(MemoryStorage::new()));
        let paths = manager.store_batch(&batch(None), &uploads(1)).await.unwrap();

        let file = manager.describe(&paths[0]).await;
        assert_eq!(file.name, "02-Dina Putri-Jumat-20261016_093000");
        assert!(file.exists);
        assert!(file.url.starts_with("/storage/evidence/"));

        assert!(!manager.describe("evidence/none.png").await.exists);
    }

    /// Accepts a fixed number of writes, then fails
    struct FlakyStorage {
        inner: MemoryStorage,
        allowed: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl Storage for FlakyStorage {
        async fn put(&self, key: &str, data: Bytes) -> StorageResult<FileMetadata> {
            use std::sync::atomic::Ordering;
            if self.allowed.fetch_sub(1, Ordering::SeqCst) == 0 {
                return Err(StorageError::InvalidPath(key.to_string()));
            }
            self.inner.put(key, data).await
        }
        async fn get(&self, key: &str) -> StorageResult<Bytes> {
            self.inner.get(key).await
        }
        async fn exists(&self, key: &str) -> StorageResult<bool> {
            self.inner.exists(key).await
        }
        async fn rename(&self, from_key: &str, to_key: &str) -> StorageResult<()> {
            self.inner.rename(from_key, to_key).await
        }
        async fn delete(&self, key: &str) -> StorageResult<()> {
            self.inner.delete(key).await
        }
        async fn make_directory(&self, key: &str) -> StorageResult<()> {
            self.inner.make_directory(key).await
        }
        async fn delete_directory(&self, key: &str) -> StorageResult<()> {
            self.inner.delete_directory(key).await
        }
        async fn directories(&self, key: &str) -> StorageResult<Vec<String>> {
            self.inner.directories(key).await
        }
        fn url(&self, key: &str) -> String {
            self.inner.url(key)
        }
        fn name(&self) -> &str {
            "flaky"
        }
    }

    #[tokio::test]
    async fn test_failed_batch_removes_written_files() {
        let storage = Arc::new(FlakyStorage {
            inner: MemoryStorage::new(),
            allowed: std::sync::atomic::AtomicUsize::new(2),
        });
        let manager = EvidenceManager::new(storage.clone());

        let err = manager.store_batch(&batch(None), &uploads(3)).await.unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert!(storage.inner.paths().await.is_empty());
    }
}
