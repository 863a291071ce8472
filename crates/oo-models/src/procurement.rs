//! Procurement model
//!
//! Table: procurements

use chrono::{DateTime, NaiveDate, Utc};
use oo_core::traits::{Entity, Id, Identifiable};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A purchase executed for a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Procurement {
    pub id: Option<Id>,
    pub request_item_id: Id,
    /// Evaluator who made the purchase
    pub executed_by: Id,
    pub purchase_date: NaiveDate,
    pub amount: f64,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for Procurement {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for Procurement {
    const TYPE_NAME: &'static str = "Procurement";
}

impl Procurement {
    pub fn create(executed_by: Id, input: NewProcurement, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            request_item_id: input.request_item_id,
            executed_by,
            purchase_date: input.purchase_date,
            amount: input.amount,
            notes: input.notes,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewProcurement {
    pub request_item_id: Id,
    pub purchase_date: NaiveDate,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub amount: f64,
    pub notes: Option<String>,
}
