//! Meeting model
//!
//! Table: meetings

use chrono::{DateTime, Utc};
use oo_core::traits::{Entity, Id, Identifiable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError};

use crate::transition::TransitionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    #[default]
    Scheduled,
    Ongoing,
    Ended,
    ForceEnded,
}

impl MeetingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingStatus::Scheduled => "scheduled",
            MeetingStatus::Ongoing => "ongoing",
            MeetingStatus::Ended => "ended",
            MeetingStatus::ForceEnded => "force_ended",
        }
    }
}

impl fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeetingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(MeetingStatus::Scheduled),
            "ongoing" => Ok(MeetingStatus::Ongoing),
            "ended" => Ok(MeetingStatus::Ended),
            "force_ended" => Ok(MeetingStatus::ForceEnded),
            other => Err(format!("unknown meeting status: {}", other)),
        }
    }
}

/// A meeting room booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: Option<Id>,
    /// Organizer
    pub user_id: Id,
    pub room_name: String,
    pub agenda: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub status: MeetingStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for Meeting {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for Meeting {
    const TYPE_NAME: &'static str = "Meeting";
}

impl Meeting {
    pub fn book(user_id: Id, input: NewMeeting, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            user_id,
            room_name: input.room_name,
            agenda: input.agenda,
            start_time: input.start_time,
            end_time: input.end_time,
            status: MeetingStatus::Scheduled,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    pub fn start(&self, now: DateTime<Utc>) -> Result<Self, TransitionError> {
        self.move_to(MeetingStatus::Scheduled, MeetingStatus::Ongoing, "start", now)
    }

    pub fn end(&self, now: DateTime<Utc>) -> Result<Self, TransitionError> {
        self.move_to(MeetingStatus::Ongoing, MeetingStatus::Ended, "end", now)
    }

    pub fn force_end(&self, now: DateTime<Utc>) -> Result<Self, TransitionError> {
        match self.status {
            MeetingStatus::Scheduled | MeetingStatus::Ongoing => Ok(Self {
                status: MeetingStatus::ForceEnded,
                updated_at: Some(now),
                ..self.clone()
            }),
            _ => Err(TransitionError::invalid("meeting", self.status, "force end")),
        }
    }

    fn move_to(
        &self,
        from: MeetingStatus,
        to: MeetingStatus,
        action: &'static str,
        now: DateTime<Utc>,
    ) -> Result<Self, TransitionError> {
        if self.status != from {
            return Err(TransitionError::invalid("meeting", self.status, action));
        }
        Ok(Self {
            status: to,
            updated_at: Some(now),
            ..self.clone()
        })
    }
}

/// Booking request
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_time_range", skip_on_field_errors = false))]
pub struct NewMeeting {
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub room_name: String,
    #[validate(length(min = 1, message = "can't be blank"))]
    pub agenda: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

fn validate_time_range(meeting: &NewMeeting) -> Result<(), ValidationError> {
    if meeting.end_time <= meeting.start_time {
        let mut err = ValidationError::new("end_time");
        err.message = Some("must be after start_time".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn booking(hours: i64) -> NewMeeting {
        let start = Utc::now();
        NewMeeting {
            room_name: "Room A".into(),
            agenda: "Weekly sync".into(),
            start_time: start,
            end_time: start + Duration::hours(hours),
        }
    }

    #[test]
    fn test_end_must_follow_start() {
        assert!(booking(1).validate().is_ok());
        assert!(booking(0).validate().is_err());
        assert!(booking(-1).validate().is_err());
    }

    #[test]
    fn test_meeting_flow() {
        let meeting = Meeting::book(1, booking(1), Utc::now());
        assert!(meeting.end(Utc::now()).is_err());

        let ongoing = meeting.start(Utc::now()).unwrap();
        assert_eq!(ongoing.status, MeetingStatus::Ongoing);
        let ended = ongoing.end(Utc::now()).unwrap();
        assert_eq!(ended.status, MeetingStatus::Ended);
        assert!(ended.force_end(Utc::now()).is_err());
    }
}
