//! Activity log entries: what the crew spent shift time on.

use crate::domain::metrics::{self, MetricsError};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "activity_kind", rename_all = "lowercase")]
pub enum ActivityKind {
    Drilling,
    Maintenance,
    Safety,
    Meeting,
    Other,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            ActivityKind::Drilling => "drilling",
            ActivityKind::Maintenance => "maintenance",
            ActivityKind::Safety => "safety",
            ActivityKind::Meeting => "meeting",
            ActivityKind::Other => "other",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub shift_id: Uuid,
    pub kind: ActivityKind,
    pub description: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityAdd {
    pub kind: ActivityKind,
    pub description: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl ActivityEntry {
    /// Computes the duration from the start/end times (with midnight
    /// wraparound) and rejects zero-length activities. Durations are rounded
    /// to the nearest minute so a sub-minute block still counts as one.
    pub fn new(shift_id: Uuid, add: ActivityAdd) -> Result<Self, MetricsError> {
        let duration_minutes =
            (metrics::span_hours(add.start_time, add.end_time) * 60.0).round() as i64;
        if duration_minutes <= 0 {
            return Err(MetricsError::InvalidDuration);
        }
        Ok(ActivityEntry {
            id: Uuid::new_v4(),
            shift_id,
            kind: add.kind,
            description: add.description,
            start_time: add.start_time,
            end_time: add.end_time,
            duration_minutes,
        })
    }
}

#[doc(hidden)]
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ActivityTest {
    pub kind: ActivityKind,
    pub description: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl ActivityTest {
    pub fn new<T: AsRef<str>>(kind: ActivityKind, start: T, end: T) -> Self {
        ActivityTest {
            kind,
            description: format!("{kind} block"),
            start_time: NaiveTime::parse_from_str(start.as_ref(), "%H:%M:%S")
                .expect("invalid time"),
            end_time: NaiveTime::parse_from_str(end.as_ref(), "%H:%M:%S").expect("invalid time"),
        }
    }
}
