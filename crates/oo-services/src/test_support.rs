//! Fixtures for service tests: in-memory stores, storage and a fixed clock

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use oo_contracts::UserContext;
use oo_core::config::AppConfig;
use oo_core::time::FixedClock;
use oo_core::types::Role;
use oo_core::Id;
use oo_db::{MemoryUserDirectory, Stores};
use oo_evidence::{EvidenceUpload, MemoryStorage};
use oo_models::User;

use crate::context::ServiceContext;

pub struct MockUser {
    pub id: Id,
    pub name: &'static str,
    pub role: Role,
}

impl UserContext for MockUser {
    fn id(&self) -> Id {
        self.id
    }

    fn display_name(&self) -> &str {
        self.name
    }

    fn role(&self) -> Role {
        self.role
    }
}

pub const OWNER: MockUser = MockUser {
    id: 7,
    name: "Budi Santoso",
    role: Role::User,
};

pub const STRANGER: MockUser = MockUser {
    id: 8,
    name: "Sari",
    role: Role::User,
};

pub const GA: MockUser = MockUser {
    id: 2,
    name: "Dina",
    role: Role::Ga,
};

pub const ADMIN: MockUser = MockUser {
    id: 1,
    name: "Root",
    role: Role::Admin,
};

/// 09:00 at UTC+7 on a Friday
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 2, 0, 0).unwrap()
}

pub struct Harness {
    pub ctx: ServiceContext,
    pub storage: Arc<MemoryStorage>,
    pub clock: Arc<FixedClock>,
}

pub async fn harness() -> Harness {
    let directory = Arc::new(MemoryUserDirectory::new());
    for user in [&ADMIN, &GA, &OWNER, &STRANGER] {
        directory
            .add(User::new(
                user.id,
                user.name,
                format!("user{}@example.com", user.id),
                user.role,
            ))
            .await;
    }

    let storage = Arc::new(MemoryStorage::new());
    let clock = Arc::new(FixedClock::new(start_time()));
    let ctx = ServiceContext::from_config(
        &AppConfig::default(),
        Stores::in_memory(directory),
        storage.clone(),
        clock.clone(),
    )
    .unwrap();

    Harness {
        ctx,
        storage,
        clock,
    }
}

pub fn png(name: &str) -> EvidenceUpload {
    EvidenceUpload::new(name, vec![1u8; 64]).with_content_type("image/png")
}

pub fn pngs(n: usize) -> Vec<EvidenceUpload> {
    (1..=n).map(|i| png(&format!("photo{}.png", i))).collect()
}

/// A todo of OWNER in `in_progress`
pub async fn started_todo(h: &Harness) -> Id {
    use crate::todos::{CreateTodoService, StartTodoService};
    use oo_models::NewTodo;

    let todo = CreateTodoService::new(&h.ctx, &OWNER)
        .call(NewTodo {
            title: "Clean the pantry".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let id = todo.id.unwrap();
    StartTodoService::new(&h.ctx, &OWNER).call(id).await.unwrap();
    id
}

/// A todo of OWNER in `checking` with `files` evidence files
pub async fn checking_todo(h: &Harness, files: usize) -> oo_models::Todo {
    use crate::todos::SubmitTodoService;

    let id = started_todo(h).await;
    SubmitTodoService::new(&h.ctx, &OWNER)
        .call(id, pngs(files))
        .await
        .unwrap()
}
