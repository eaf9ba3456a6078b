//! Client dimension: the company a shift is drilled for.

use super::ValidName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ClientProfile {
    pub id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientAdd {
    pub name: ValidName,
    pub contact_person: Option<String>,
    pub email: Option<String>,
}
