//! Casing installation entries: pipe runs set in a hole during a shift.

use super::ValidName;
use crate::domain::metrics::MetricsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "casing_kind", rename_all = "lowercase")]
pub enum CasingKind {
    Pvc,
    Steel,
    Hdpe,
    Fiberglass,
    Other,
}

impl fmt::Display for CasingKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            CasingKind::Pvc => "pvc",
            CasingKind::Steel => "steel",
            CasingKind::Hdpe => "hdpe",
            CasingKind::Fiberglass => "fiberglass",
            CasingKind::Other => "other",
        };
        write!(f, "{s}")
    }
}

/// A persisted casing run. `length` is derived from the depth interval when
/// the entry is created and stored.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CasingEntry {
    pub id: Uuid,
    pub shift_id: Uuid,
    pub size: String,
    pub kind: CasingKind,
    pub start_depth: f64,
    pub end_depth: f64,
    pub length: f64,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CasingAdd {
    /// Free-form diameter designation, e.g. `4"` or `HW`.
    pub size: ValidName,
    pub kind: CasingKind,
    pub start_depth: f64,
    pub end_depth: f64,
    pub remarks: Option<String>,
}

impl CasingEntry {
    pub fn new(shift_id: Uuid, add: CasingAdd) -> Result<Self, MetricsError> {
        if add.start_depth < 0.0 {
            return Err(MetricsError::InvalidRange(format!(
                "casing start depth must not be negative, got {}",
                add.start_depth
            )));
        }
        if add.end_depth <= add.start_depth {
            return Err(MetricsError::InvalidRange(format!(
                "casing end depth {} must be greater than start depth {}",
                add.end_depth, add.start_depth
            )));
        }
        Ok(CasingEntry {
            id: Uuid::new_v4(),
            shift_id,
            size: add.size.as_ref().to_string(),
            kind: add.kind,
            start_depth: add.start_depth,
            end_depth: add.end_depth,
            length: add.end_depth - add.start_depth,
            remarks: add.remarks,
        })
    }
}

#[doc(hidden)]
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CasingTest {
    pub size: String,
    pub kind: CasingKind,
    pub start_depth: f64,
    pub end_depth: f64,
    pub remarks: Option<String>,
}

impl CasingTest {
    pub fn new<T: AsRef<str>>(size: T, kind: CasingKind, start_depth: f64, end_depth: f64) -> Self {
        CasingTest {
            size: size.as_ref().to_string(),
            kind,
            start_depth,
            end_depth,
            remarks: None,
        }
    }
}
