//! JSON projections of domain records
//!
//! Todos and visitors reference stored files, so their representers resolve
//! public URLs through the storage backend and add display strings in the
//! regional timezone. The flat resources serialize as-is.

pub mod todo;
pub mod visitor;

pub use todo::{TodoRepresenter, TodoResource};
pub use visitor::{VisitorRepresenter, VisitorResource};

use std::fmt::{Display, Write};

use chrono::{DateTime, NaiveDate, Utc};
use oo_core::config::InstanceConfig;
use oo_core::time::RegionalTime;

/// strftime patterns for the `formatted_*` fields
#[derive(Debug, Clone)]
pub struct DisplayFormats {
    pub datetime: String,
    pub date: String,
}

impl Default for DisplayFormats {
    fn default() -> Self {
        Self {
            datetime: "%d-%m-%Y %H:%M".to_string(),
            date: "%d-%m-%Y".to_string(),
        }
    }
}

impl From<&InstanceConfig> for DisplayFormats {
    fn from(instance: &InstanceConfig) -> Self {
        Self {
            datetime: instance.datetime_format.clone(),
            date: instance.date_format.clone(),
        }
    }
}

impl DisplayFormats {
    /// Instant rendered in regional time
    pub fn datetime(&self, region: &RegionalTime, at: DateTime<Utc>) -> String {
        let local = region.local(at);
        render(local.format(&self.datetime), || local.to_rfc3339())
    }

    pub fn date(&self, date: NaiveDate) -> String {
        render(date.format(&self.date), || date.to_string())
    }
}

/// A bad pattern from configuration falls back to ISO 8601
fn render(formatted: impl Display, fallback: impl FnOnce() -> String) -> String {
    let mut out = String::new();
    match write!(out, "{}", formatted) {
        Ok(()) => out,
        Err(_) => fallback(),
    }
}
