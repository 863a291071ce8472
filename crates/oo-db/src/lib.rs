//! # oo-db
//!
//! Database layer for OfficeOps RS.
//!
//! This crate provides persistence through per-entity store traits, each with
//! a PostgreSQL implementation (SQLx) and an in-memory implementation used by
//! tests and local demos:
//!
//! - Connection pool management and embedded migrations
//! - Store traits for todos, warnings, users, requests, procurements,
//!   assets, meetings and visitors
//! - A [`Stores`] bundle wiring one backend into the services layer
//!
//! ## Example
//!
//! ```ignore
//! use oo_core::config::AppConfig;
//! use oo_db::{Database, Stores};
//!
//! let config = AppConfig::load()?;
//! let db = Database::connect(&config.database).await?;
//! db.migrate().await?;
//!
//! let stores = Stores::postgres(db.pool().clone());
//! let todo = stores.todos.find(1).await?;
//! ```

pub mod pool;
pub mod repository;
mod memory;
pub mod todos;
pub mod warnings;
pub mod users;
pub mod request_items;
pub mod procurements;
pub mod assets;
pub mod meetings;
pub mod visitors;
pub mod stores;

// Re-exports
pub use pool::{Database, PoolStats};
pub use repository::{RepositoryError, RepositoryResult};
pub use todos::{MemoryTodoStore, PgTodoStore, TodoFilter, TodoStore};
pub use warnings::{MemoryWarningStore, PgWarningStore, WarningStore};
pub use users::{MemoryUserDirectory, PgUserDirectory, UserDirectory};
pub use request_items::{MemoryRequestItemStore, PgRequestItemStore, RequestItemStore};
pub use procurements::{MemoryProcurementStore, PgProcurementStore, ProcurementStore};
pub use assets::{AssetStore, MemoryAssetStore, PgAssetStore};
pub use meetings::{MeetingStore, MemoryMeetingStore, PgMeetingStore};
pub use visitors::{MemoryVisitorStore, PgVisitorStore, VisitorQuery, VisitorStore};
pub use stores::Stores;
