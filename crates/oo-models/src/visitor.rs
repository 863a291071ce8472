//! Visitor model
//!
//! Table: visitors

use chrono::{DateTime, Utc};
use oo_core::traits::{Entity, Id, Identifiable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::transition::TransitionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VisitorStatus {
    #[default]
    CheckedIn,
    CheckedOut,
}

impl VisitorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitorStatus::CheckedIn => "checked_in",
            VisitorStatus::CheckedOut => "checked_out",
        }
    }
}

impl fmt::Display for VisitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisitorStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checked_in" => Ok(VisitorStatus::CheckedIn),
            "checked_out" => Ok(VisitorStatus::CheckedOut),
            other => Err(format!("unknown visitor status: {}", other)),
        }
    }
}

/// A registered guest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visitor {
    pub id: Option<Id>,
    pub name: String,
    /// Person the visitor came to see
    pub meet_with: String,
    pub purpose: String,
    pub origin: Option<String>,
    pub visit_time: DateTime<Utc>,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    /// ID card (KTP) scan
    pub ktp_image_path: String,
    pub ktp_ocr: Option<String>,
    pub face_image_path: String,
    pub face_verified: bool,
    #[serde(default)]
    pub status: VisitorStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for Visitor {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for Visitor {
    const TYPE_NAME: &'static str = "Visitor";
}

impl Visitor {
    pub fn check_in(&self, now: DateTime<Utc>) -> Self {
        Self {
            status: VisitorStatus::CheckedIn,
            check_in: Some(now),
            updated_at: Some(now),
            ..self.clone()
        }
    }

    pub fn check_out(&self, now: DateTime<Utc>) -> Result<Self, TransitionError> {
        if self.status != VisitorStatus::CheckedIn {
            return Err(TransitionError::invalid("visitor", self.status, "check out"));
        }
        Ok(Self {
            status: VisitorStatus::CheckedOut,
            check_out: Some(now),
            updated_at: Some(now),
            ..self.clone()
        })
    }
}

/// Text fields of a registration; images travel separately
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewVisitor {
    #[validate(length(min = 1, max = 150, message = "must be between 1 and 150 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 150, message = "must be between 1 and 150 characters"))]
    pub meet_with: String,
    #[validate(length(min = 1, max = 300, message = "must be between 1 and 300 characters"))]
    pub purpose: String,
    #[validate(length(max = 150, message = "must be at most 150 characters"))]
    pub origin: Option<String>,
}

/// "budi  SANTOSO" -> "Budi Santoso"
pub fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
