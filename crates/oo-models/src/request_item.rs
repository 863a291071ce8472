//! RequestItem model
//!
//! Table: request_items

use chrono::{DateTime, Utc};
use oo_core::traits::{Entity, Id, Identifiable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::transition::TransitionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Purchased,
    Received,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Purchased => "purchased",
            RequestStatus::Received => "received",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            "purchased" => Ok(RequestStatus::Purchased),
            "received" => Ok(RequestStatus::Received),
            other => Err(format!("unknown request status: {}", other)),
        }
    }
}

/// An item requested by an employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestItem {
    pub id: Option<Id>,
    /// Requesting user
    pub user_id: Id,
    pub item_name: String,
    pub quantity: i32,
    pub reason: Option<String>,
    #[serde(default)]
    pub status: RequestStatus,
    /// Note left by general affairs on approval or rejection
    pub ga_note: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for RequestItem {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for RequestItem {
    const TYPE_NAME: &'static str = "RequestItem";
}

impl RequestItem {
    pub fn create(user_id: Id, input: NewRequestItem, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            user_id,
            item_name: input.item_name,
            quantity: input.quantity,
            reason: input.reason,
            status: RequestStatus::Pending,
            ga_note: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    pub fn approve(&self, ga_note: Option<String>, now: DateTime<Utc>) -> Result<Self, TransitionError> {
        self.decide(RequestStatus::Approved, "approve", ga_note, now)
    }

    pub fn reject(&self, ga_note: Option<String>, now: DateTime<Utc>) -> Result<Self, TransitionError> {
        self.decide(RequestStatus::Rejected, "reject", ga_note, now)
    }

    /// Marks the request bought unless it already got that far
    pub fn mark_purchased(&self, now: DateTime<Utc>) -> Self {
        match self.status {
            RequestStatus::Purchased | RequestStatus::Received => self.clone(),
            _ => Self {
                status: RequestStatus::Purchased,
                updated_at: Some(now),
                ..self.clone()
            },
        }
    }

    pub fn mark_received(&self, now: DateTime<Utc>) -> Self {
        Self {
            status: RequestStatus::Received,
            updated_at: Some(now),
            ..self.clone()
        }
    }

    fn decide(
        &self,
        status: RequestStatus,
        action: &'static str,
        ga_note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, TransitionError> {
        if self.status != RequestStatus::Pending {
            return Err(TransitionError::invalid("request", self.status, action));
        }
        Ok(Self {
            status,
            ga_note: ga_note.or_else(|| self.ga_note.clone()),
            updated_at: Some(now),
            ..self.clone()
        })
    }
}

/// Input for a new request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewRequestItem {
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub item_name: String,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub quantity: i32,
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RequestItem {
        RequestItem::create(
            4,
            NewRequestItem {
                item_name: "Printer toner".into(),
                quantity: 2,
                reason: None,
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_decisions_only_from_pending() {
        let approved = request().approve(Some("ok".into()), Utc::now()).unwrap();
        assert_eq!(approved.status, RequestStatus::Approved);
        assert_eq!(approved.ga_note.as_deref(), Some("ok"));
        assert!(approved.reject(None, Utc::now()).is_err());
    }

    #[test]
    fn test_mark_purchased_does_not_regress_received() {
        let received = request().mark_received(Utc::now());
        assert_eq!(received.mark_purchased(Utc::now()).status, RequestStatus::Received);
        assert_eq!(request().mark_purchased(Utc::now()).status, RequestStatus::Purchased);
    }

    #[test]
    fn test_quantity_must_be_positive() {
        let input = NewRequestItem {
            item_name: "Chair".into(),
            quantity: 0,
            reason: None,
        };
        assert!(input.validate().is_err());
    }
}
