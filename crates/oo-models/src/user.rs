//! User read model
//!
//! Table: users
//!
//! Accounts are managed elsewhere; this crate only reads them to embed the
//! owner in listings and rank users on the leaderboard.

use chrono::{DateTime, Utc};
use oo_core::traits::{Entity, Id, Identifiable};
use oo_core::types::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<Id>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for User {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for User {
    const TYPE_NAME: &'static str = "User";
}

impl User {
    pub fn new(id: Id, name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            email: email.into(),
            role,
            created_at: None,
            updated_at: None,
        }
    }
}
