mod activity;
mod approval;
mod casing;
mod client;
mod material;
pub mod metrics;
mod progress;
mod shift;
mod survey;
mod validname;
pub mod workflow;

pub use activity::{ActivityAdd, ActivityEntry, ActivityKind, ActivityTest};
pub use approval::{ApprovalRecord, Decision, Role};
pub use casing::{CasingAdd, CasingEntry, CasingKind, CasingTest};
pub use client::{ClientAdd, ClientProfile};
pub use material::{MaterialAdd, MaterialEntry, MaterialTest};
pub use metrics::{Combined24h, MetricsError, ShiftMetrics};
pub use progress::{BitSize, ProgressAdd, ProgressEntry, ProgressTest};
pub use shift::{ShiftAdd, ShiftKind, ShiftRecord, ShiftStatus, ShiftTest, ShiftUpdate};
pub use survey::{SurveyAdd, SurveyEntry, SurveyKind, SurveyTest};
pub use validname::ValidName;
pub use workflow::{Action, Transition, WorkflowError};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);
