//! Asset model
//!
//! Table: assets

use chrono::{DateTime, NaiveDate, Utc};
use oo_core::traits::{Entity, Id, Identifiable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    #[default]
    NotReceived,
    Received,
    NeedsRepair,
    NeedsReplacement,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::NotReceived => "not_received",
            AssetStatus::Received => "received",
            AssetStatus::NeedsRepair => "needs_repair",
            AssetStatus::NeedsReplacement => "needs_replacement",
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_received" => Ok(AssetStatus::NotReceived),
            "received" => Ok(AssetStatus::Received),
            "needs_repair" => Ok(AssetStatus::NeedsRepair),
            "needs_replacement" => Ok(AssetStatus::NeedsReplacement),
            other => Err(format!("unknown asset status: {}", other)),
        }
    }
}

/// A physical item tracked by general affairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: Option<Id>,
    pub request_item_id: Id,
    pub procurement_id: Option<Id>,
    /// `AST-` followed by 8 uppercase alphanumerics
    pub asset_code: String,
    pub category: String,
    pub location: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub status: AssetStatus,
    pub received_date: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for Asset {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for Asset {
    const TYPE_NAME: &'static str = "Asset";
}

impl Asset {
    /// Asset code derived from random bytes
    pub fn code_from(seed: Uuid) -> String {
        let hex = seed.simple().to_string().to_uppercase();
        format!("AST-{}", &hex[..8])
    }

    pub fn create(input: NewAsset, asset_code: String, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            request_item_id: input.request_item_id,
            procurement_id: input.procurement_id,
            asset_code,
            category: input.category,
            location: input.location,
            notes: input.notes,
            status: AssetStatus::NotReceived,
            received_date: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    pub fn with_status(
        &self,
        status: AssetStatus,
        received_date: Option<NaiveDate>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            status,
            received_date: received_date.or(self.received_date),
            notes: notes.or_else(|| self.notes.clone()),
            updated_at: Some(now),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAsset {
    pub request_item_id: Id,
    pub procurement_id: Option<Id>,
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub category: String,
    #[validate(length(max = 150, message = "must be at most 150 characters"))]
    pub location: Option<String>,
    pub notes: Option<String>,
}
