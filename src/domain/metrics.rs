//! Pure metric calculations over shift data. Nothing in here touches
//! storage; the route handlers fetch rows and hand them over.

use crate::domain::{ActivityEntry, ActivityKind, ProgressEntry, ShiftRecord};
use chrono::NaiveTime;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    #[error("{0}")]
    InvalidRange(String),
    #[error("the computed duration is zero")]
    InvalidDuration,
}

/// Hours between two times of day. When `end` is before `start` the span is
/// assumed to cross midnight and 24 hours are added, so a 19:00 → 07:00
/// night shift yields 12.
pub fn span_hours(start: NaiveTime, end: NaiveTime) -> f64 {
    let mut seconds = end.signed_duration_since(start).num_seconds();
    if seconds < 0 {
        seconds += 24 * 3600;
    }
    seconds as f64 / 3600.0
}

/// Derived figures for a single shift.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShiftMetrics {
    pub shift_hours: f64,
    pub total_meters: f64,
    pub avg_penetration_rate: Option<f64>,
    pub man_hours: f64,
    pub activity_hours: BTreeMap<ActivityKind, f64>,
    pub standby_hours: f64,
}

/// Additive 24-hour totals for a day/night pair. A missing companion
/// contributes zero to every field.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Combined24h {
    pub shift_hours: f64,
    pub total_meters: f64,
    pub man_hours: f64,
    pub activity_hours: BTreeMap<ActivityKind, f64>,
    pub standby_hours: f64,
}

impl ShiftMetrics {
    pub fn compute(
        shift: &ShiftRecord,
        progress: &[ProgressEntry],
        activities: &[ActivityEntry],
    ) -> ShiftMetrics {
        let shift_hours = span_hours(shift.start_time, shift.end_time);
        let total_meters = progress.iter().map(|p| p.meters_drilled).sum();

        let rates: Vec<f64> = progress.iter().filter_map(|p| p.penetration_rate).collect();
        let avg_penetration_rate = if rates.is_empty() {
            None
        } else {
            Some(rates.iter().sum::<f64>() / rates.len() as f64)
        };

        let man_hours = shift.crew_size() as f64 * shift_hours;

        let mut activity_hours: BTreeMap<ActivityKind, f64> = BTreeMap::new();
        for activity in activities {
            *activity_hours.entry(activity.kind).or_insert(0.0) +=
                activity.duration_minutes as f64 / 60.0;
        }
        let logged_hours: f64 = activity_hours.values().sum();
        // Standby never goes negative even when the crew over-logs.
        let standby_hours = (shift_hours - logged_hours).max(0.0);

        ShiftMetrics {
            shift_hours,
            total_meters,
            avg_penetration_rate,
            man_hours,
            activity_hours,
            standby_hours,
        }
    }

    /// Field-wise sum with the companion shift's metrics.
    pub fn combined_with(&self, companion: Option<&ShiftMetrics>) -> Combined24h {
        let mut combined = Combined24h {
            shift_hours: self.shift_hours,
            total_meters: self.total_meters,
            man_hours: self.man_hours,
            activity_hours: self.activity_hours.clone(),
            standby_hours: self.standby_hours,
        };
        if let Some(other) = companion {
            combined.shift_hours += other.shift_hours;
            combined.total_meters += other.total_meters;
            combined.man_hours += other.man_hours;
            combined.standby_hours += other.standby_hours;
            for (kind, hours) in &other.activity_hours {
                *combined.activity_hours.entry(*kind).or_insert(0.0) += hours;
            }
        }
        combined
    }
}
