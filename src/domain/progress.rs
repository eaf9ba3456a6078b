//! Drilling progress entries: one row per drilling run within a shift.

use super::ValidName;
use crate::domain::metrics::{self, MetricsError};
use chrono::NaiveTime;
use fake::{Dummy, Fake, Faker};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Drill bit / core barrel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "bit_size")]
pub enum BitSize {
    PQ,
    HQ,
    NQ,
    BQ,
    AQ,
}

impl fmt::Display for BitSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            BitSize::PQ => "PQ",
            BitSize::HQ => "HQ",
            BitSize::NQ => "NQ",
            BitSize::BQ => "BQ",
            BitSize::AQ => "AQ",
        };
        write!(f, "{s}")
    }
}

/// A persisted progress entry. The derived columns (`meters_drilled`,
/// `recovery_percentage`, `penetration_rate`) are computed once at entry
/// creation and stored.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProgressEntry {
    pub id: Uuid,
    pub shift_id: Uuid,
    pub hole: String,
    pub bit: BitSize,
    pub start_depth: f64,
    pub end_depth: f64,
    pub meters_drilled: f64,
    pub core_loss: f64,
    pub core_gain: f64,
    pub recovery_percentage: Option<f64>,
    pub penetration_rate: Option<f64>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub image_ref: Option<String>,
    pub remarks: Option<String>,
}

/// Raw progress payload as received over HTTP. Range and duration rules are
/// enforced when this is turned into a [`ProgressEntry`].
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressAdd {
    pub hole: ValidName,
    pub bit: BitSize,
    pub start_depth: f64,
    pub end_depth: f64,
    #[serde(default)]
    pub core_loss: f64,
    #[serde(default)]
    pub core_gain: f64,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub image_ref: Option<String>,
    pub remarks: Option<String>,
}

impl ProgressEntry {
    /// Validates the raw payload and computes the derived fields.
    ///
    /// # Errors
    ///
    /// * [`MetricsError::InvalidRange`] - when `end_depth <= start_depth` or
    ///   a core loss/gain is negative.
    /// * [`MetricsError::InvalidDuration`] - when start and end time of the
    ///   run coincide, which would make the penetration rate undefined.
    pub fn new(shift_id: Uuid, add: ProgressAdd) -> Result<Self, MetricsError> {
        if add.end_depth <= add.start_depth {
            return Err(MetricsError::InvalidRange(format!(
                "end depth {} must be greater than start depth {}",
                add.end_depth, add.start_depth
            )));
        }
        if add.core_loss < 0.0 || add.core_gain < 0.0 {
            return Err(MetricsError::InvalidRange(
                "core loss and core gain must not be negative".into(),
            ));
        }

        let meters_drilled = add.end_depth - add.start_depth;
        let duration_hours = metrics::span_hours(add.start_time, add.end_time);
        if duration_hours == 0.0 {
            return Err(MetricsError::InvalidDuration);
        }
        let penetration_rate = meters_drilled / duration_hours;

        // Recovery is recovered core over the theoretical core length, which
        // for a run equals the meters drilled.
        let recovered = meters_drilled - add.core_loss + add.core_gain;
        let recovery_percentage = if meters_drilled == 0.0 {
            None
        } else {
            Some(recovered / meters_drilled * 100.0)
        };

        Ok(ProgressEntry {
            id: Uuid::new_v4(),
            shift_id,
            hole: add.hole.as_ref().to_string(),
            bit: add.bit,
            start_depth: add.start_depth,
            end_depth: add.end_depth,
            meters_drilled,
            core_loss: add.core_loss,
            core_gain: add.core_gain,
            recovery_percentage,
            penetration_rate: Some(penetration_rate),
            start_time: add.start_time,
            end_time: add.end_time,
            image_ref: add.image_ref,
            remarks: add.remarks,
        })
    }
}

#[doc(hidden)]
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ProgressTest {
    pub hole: Option<String>,
    pub bit: Option<BitSize>,
    pub start_depth: Option<f64>,
    pub end_depth: Option<f64>,
    pub core_loss: Option<f64>,
    pub core_gain: Option<f64>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub image_ref: Option<String>,
    pub remarks: Option<String>,
}

impl ProgressTest {
    pub fn new<T: AsRef<str>>(hole: T, bit: BitSize, start_depth: f64, end_depth: f64) -> Self {
        ProgressTest {
            hole: Some(hole.as_ref().to_string()),
            bit: Some(bit),
            start_depth: Some(start_depth),
            end_depth: Some(end_depth),
            core_loss: Some(0.0),
            core_gain: Some(0.0),
            start_time: NaiveTime::from_hms_opt(8, 0, 0),
            end_time: NaiveTime::from_hms_opt(12, 0, 0),
            ..ProgressTest::default()
        }
    }

    pub fn with_times<T: AsRef<str>>(mut self, start: T, end: T) -> Self {
        self.start_time =
            Some(NaiveTime::parse_from_str(start.as_ref(), "%H:%M:%S").expect("invalid time"));
        self.end_time =
            Some(NaiveTime::parse_from_str(end.as_ref(), "%H:%M:%S").expect("invalid time"));
        self
    }

    pub fn with_core<T: Into<f64>>(mut self, loss: T, gain: T) -> Self {
        self.core_loss = Some(loss.into());
        self.core_gain = Some(gain.into());
        self
    }
}

impl Dummy<Faker> for ProgressTest {
    fn dummy_with_rng<R: Rng + ?Sized>(_: &Faker, rng: &mut R) -> ProgressTest {
        let start_depth = rng.gen_range(0.0..500.0);
        let end_depth = start_depth + rng.gen_range(0.5..30.0);
        let hole = format!("BH-{:03}", rng.gen_range(1..100));
        let start_hour = rng.gen_range(7..15);
        let duration = rng.gen_range(1..4);
        ProgressTest::new(hole, BitSize::HQ, start_depth, end_depth).with_times(
            format!("{start_hour:02}:00:00"),
            format!("{:02}:00:00", start_hour + duration),
        )
    }
}
