//! One backend for every store

use std::sync::Arc;

use sqlx::PgPool;

use crate::assets::{AssetStore, MemoryAssetStore, PgAssetStore};
use crate::meetings::{MeetingStore, MemoryMeetingStore, PgMeetingStore};
use crate::procurements::{MemoryProcurementStore, PgProcurementStore, ProcurementStore};
use crate::request_items::{MemoryRequestItemStore, PgRequestItemStore, RequestItemStore};
use crate::todos::{MemoryTodoStore, PgTodoStore, TodoStore};
use crate::users::{MemoryUserDirectory, PgUserDirectory, UserDirectory};
use crate::visitors::{MemoryVisitorStore, PgVisitorStore, VisitorStore};
use crate::warnings::{MemoryWarningStore, PgWarningStore, WarningStore};

#[derive(Clone)]
pub struct Stores {
    pub todos: Arc<dyn TodoStore>,
    pub warnings: Arc<dyn WarningStore>,
    pub users: Arc<dyn UserDirectory>,
    pub request_items: Arc<dyn RequestItemStore>,
    pub procurements: Arc<dyn ProcurementStore>,
    pub assets: Arc<dyn AssetStore>,
    pub meetings: Arc<dyn MeetingStore>,
    pub visitors: Arc<dyn VisitorStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            todos: Arc::new(PgTodoStore::new(pool.clone())),
            warnings: Arc::new(PgWarningStore::new(pool.clone())),
            users: Arc::new(PgUserDirectory::new(pool.clone())),
            request_items: Arc::new(PgRequestItemStore::new(pool.clone())),
            procurements: Arc::new(PgProcurementStore::new(pool.clone())),
            assets: Arc::new(PgAssetStore::new(pool.clone())),
            meetings: Arc::new(PgMeetingStore::new(pool.clone())),
            visitors: Arc::new(PgVisitorStore::new(pool)),
        }
    }

    /// Empty in-memory stores; users are seeded through `directory`
    pub fn in_memory(directory: Arc<MemoryUserDirectory>) -> Self {
        Self {
            todos: Arc::new(MemoryTodoStore::new()),
            warnings: Arc::new(MemoryWarningStore::new()),
            users: directory,
            request_items: Arc::new(MemoryRequestItemStore::new()),
            procurements: Arc::new(MemoryProcurementStore::new()),
            assets: Arc::new(MemoryAssetStore::new()),
            meetings: Arc::new(MemoryMeetingStore::new()),
            visitors: Arc::new(MemoryVisitorStore::new()),
        }
    }
}
