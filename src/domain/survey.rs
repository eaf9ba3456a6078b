//! Downhole survey entries: orientation measurements taken during drilling.

use crate::domain::metrics::MetricsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "survey_kind", rename_all = "lowercase")]
pub enum SurveyKind {
    Gyro,
    Camera,
    Ongoing,
    Magnetic,
    Other,
}

impl fmt::Display for SurveyKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            SurveyKind::Gyro => "gyro",
            SurveyKind::Camera => "camera",
            SurveyKind::Ongoing => "ongoing",
            SurveyKind::Magnetic => "magnetic",
            SurveyKind::Other => "other",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SurveyEntry {
    pub id: Uuid,
    pub shift_id: Uuid,
    pub kind: SurveyKind,
    pub depth: f64,
    pub dip_angle: f64,
    pub azimuth: f64,
    pub findings: Option<String>,
    pub surveyor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SurveyAdd {
    pub kind: SurveyKind,
    pub depth: f64,
    pub dip_angle: f64,
    pub azimuth: f64,
    pub findings: Option<String>,
    pub surveyor: Option<String>,
}

impl SurveyEntry {
    /// Validates the measurement ranges: depth must not be negative, the dip
    /// angle lies in `[-90, 90]` degrees and the azimuth in `[0, 360)`.
    pub fn new(shift_id: Uuid, add: SurveyAdd) -> Result<Self, MetricsError> {
        if add.depth < 0.0 {
            return Err(MetricsError::InvalidRange(format!(
                "survey depth must not be negative, got {}",
                add.depth
            )));
        }
        if !(-90.0..=90.0).contains(&add.dip_angle) {
            return Err(MetricsError::InvalidRange(format!(
                "dip angle must lie between -90 and 90 degrees, got {}",
                add.dip_angle
            )));
        }
        if !(0.0..360.0).contains(&add.azimuth) {
            return Err(MetricsError::InvalidRange(format!(
                "azimuth must lie between 0 and 360 degrees, got {}",
                add.azimuth
            )));
        }
        Ok(SurveyEntry {
            id: Uuid::new_v4(),
            shift_id,
            kind: add.kind,
            depth: add.depth,
            dip_angle: add.dip_angle,
            azimuth: add.azimuth,
            findings: add.findings,
            surveyor: add.surveyor,
        })
    }
}

#[doc(hidden)]
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SurveyTest {
    pub kind: SurveyKind,
    pub depth: f64,
    pub dip_angle: f64,
    pub azimuth: f64,
    pub findings: Option<String>,
    pub surveyor: Option<String>,
}

impl SurveyTest {
    pub fn new(kind: SurveyKind, depth: f64, dip_angle: f64, azimuth: f64) -> Self {
        SurveyTest {
            kind,
            depth,
            dip_angle,
            azimuth,
            findings: None,
            surveyor: Some("S. Urveyor".to_string()),
        }
    }
}
