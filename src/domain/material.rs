//! Materials consumed during a shift.

use super::ValidName;
use crate::domain::metrics::MetricsError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MaterialEntry {
    pub id: Uuid,
    pub shift_id: Uuid,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MaterialAdd {
    pub name: ValidName,
    pub quantity: f64,
    pub unit: String,
}

impl MaterialEntry {
    pub fn new(shift_id: Uuid, add: MaterialAdd) -> Result<Self, MetricsError> {
        if add.quantity <= 0.0 {
            return Err(MetricsError::InvalidRange(format!(
                "material quantity must be positive, got {}",
                add.quantity
            )));
        }
        Ok(MaterialEntry {
            id: Uuid::new_v4(),
            shift_id,
            name: add.name.as_ref().to_string(),
            quantity: add.quantity,
            unit: add.unit,
        })
    }
}

#[doc(hidden)]
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MaterialTest {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

impl MaterialTest {
    pub fn new<T: AsRef<str>>(name: T, quantity: f64, unit: T) -> Self {
        MaterialTest {
            name: name.as_ref().to_string(),
            quantity,
            unit: unit.as_ref().to_string(),
        }
    }
}
