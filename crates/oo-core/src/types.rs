//! Common types used throughout OfficeOps RS

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of an authenticated actor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    /// General affairs staff
    Ga,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Ga => "ga",
            Role::Admin => "admin",
        }
    }

    /// Label used in checker display strings, e.g. "Dina (GA)"
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Ga => "GA",
            Role::Admin => "Admin",
        }
    }

    /// GA and admin actors may evaluate work
    pub fn is_evaluator(&self) -> bool {
        matches!(self, Role::Ga | Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "ga" => Ok(Role::Ga),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Locale used for day names and duration labels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Indonesian
    #[default]
    Id,
    En,
}

impl Locale {
    pub fn weekday_name(&self, day: Weekday) -> &'static str {
        match self {
            Locale::Id => match day {
                Weekday::Mon => "Senin",
                Weekday::Tue => "Selasa",
                Weekday::Wed => "Rabu",
                Weekday::Thu => "Kamis",
                Weekday::Fri => "Jumat",
                Weekday::Sat => "Sabtu",
                Weekday::Sun => "Minggu",
            },
            Locale::En => match day {
                Weekday::Mon => "Monday",
                Weekday::Tue => "Tuesday",
                Weekday::Wed => "Wednesday",
                Weekday::Thu => "Thursday",
                Weekday::Fri => "Friday",
                Weekday::Sat => "Saturday",
                Weekday::Sun => "Sunday",
            },
        }
    }

    /// Human-readable work duration for a number of minutes
    pub fn duration_label(&self, total_minutes: i64) -> String {
        let total_minutes = total_minutes.max(0);
        let hours = total_minutes / 60;
        let minutes = total_minutes % 60;

        match self {
            Locale::Id => {
                if hours > 0 {
                    format!("{} jam {} menit", hours, minutes)
                } else {
                    format!("{} menit", minutes)
                }
            }
            Locale::En => {
                let unit = |n: i64, one: &str, many: &str| {
                    format!("{} {}", n, if n == 1 { one } else { many })
                };
                if hours > 0 {
                    format!(
                        "{} {}",
                        unit(hours, "hour", "hours"),
                        unit(minutes, "minute", "minutes")
                    )
                } else {
                    unit(minutes, "minute", "minutes")
                }
            }
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "id" | "id_id" | "id-id" => Ok(Locale::Id),
            "en" | "en_us" | "en-us" => Ok(Locale::En),
            other => Err(format!("unsupported locale: {}", other)),
        }
    }
}
