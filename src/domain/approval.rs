//! The append-only approval audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Resolved role of the acting party. Authentication happens upstream; the
/// service only ever consumes a resolved role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "actor_role", rename_all = "lowercase")]
pub enum Role {
    Supervisor,
    Manager,
    Client,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Role::Supervisor => write!(f, "supervisor"),
            Role::Manager => write!(f, "manager"),
            Role::Client => write!(f, "client"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "supervisor" => Ok(Role::Supervisor),
            "manager" => Ok(Role::Manager),
            "client" => Ok(Role::Client),
            other => Err(format!("`{other}` is not a known role")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "approval_decision", rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

/// One approval or rejection, written exactly once per decision and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ApprovalRecord {
    pub id: Uuid,
    pub shift_id: Uuid,
    pub approver: String,
    pub role: Role,
    pub decision: Decision,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
