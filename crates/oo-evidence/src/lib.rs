//! # oo-evidence
//!
//! File storage for todo evidence and visitor images.
//!
//! ## Features
//!
//! - Path-addressed storage abstraction (local filesystem, in-memory)
//! - Evidence file naming with daily sequence, localized day and stage suffix
//! - Batch staging, re-staging and purging of evidence files
//!
//! ## Example
//!
//! ```rust,ignore
//! use oo_evidence::{EvidenceManager, MemoryStorage};
//! use std::sync::Arc;
//!
//! let manager = EvidenceManager::new(Arc::new(MemoryStorage::new()));
//! let paths = manager.store_batch(&batch, &uploads).await?;
//! ```

pub mod manager;
pub mod naming;
pub mod storage;
pub mod upload;

pub use manager::{EvidenceBatch, EvidenceFile, EvidenceManager};
pub use naming::{evidence_directory, restage, safe_name, visitor_folder, EvidenceName, Stage, VisitorImage};
pub use storage::{FileMetadata, LocalStorage, MemoryStorage, Storage, StorageError, StorageResult};
pub use upload::EvidenceUpload;
