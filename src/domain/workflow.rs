//! The approval state machine governing a shift's lifecycle.
//!
//! A shift moves through `draft → submitted → manager_approved →
//! client_approved`, with a rejection at either approval stage sending it
//! back to the supervisor for rework. The transition table lives entirely in
//! [`decide`]; callers apply the returned [`Transition`] to storage inside a
//! transaction that has re-read the current status under a row lock, so a
//! concurrent loser observes the advanced status and fails with
//! [`WorkflowError::InvalidTransition`].

use crate::domain::{Decision, Role, ShiftStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Actions a caller can request against a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Submit,
    Approve,
    Reject,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Action::Submit => write!(f, "submit"),
            Action::Approve => write!(f, "approve"),
            Action::Reject => write!(f, "reject"),
        }
    }
}

/// The outcome of a legal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: ShiftStatus,
    /// Whether the shift is locked for edits after this transition.
    pub locked: bool,
    /// The approval record to append, if any. Submit and resubmit do not
    /// leave an audit entry.
    pub decision: Option<Decision>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("cannot {action} a shift that is {status}")]
    InvalidTransition { action: Action, status: ShiftStatus },
    #[error("a {actor} may not {action} a shift that is {status}; expected {expected}")]
    Unauthorized {
        actor: Role,
        expected: Role,
        action: Action,
        status: ShiftStatus,
    },
}

/// Evaluates the transition table for `action` performed by `actor` against
/// a shift currently in `status`.
///
/// Role mismatches on an otherwise legal transition fail with
/// [`WorkflowError::Unauthorized`]; everything else illegal fails with
/// [`WorkflowError::InvalidTransition`].
pub fn decide(status: ShiftStatus, action: Action, actor: Role) -> Result<Transition, WorkflowError> {
    use ShiftStatus::*;

    match action {
        Action::Submit => match status {
            Draft | ManagerRejected | ClientRejected => {
                if actor != Role::Supervisor {
                    return Err(WorkflowError::Unauthorized {
                        actor,
                        expected: Role::Supervisor,
                        action,
                        status,
                    });
                }
                Ok(Transition {
                    next: Submitted,
                    locked: false,
                    decision: None,
                })
            }
            _ => Err(WorkflowError::InvalidTransition { action, status }),
        },
        Action::Approve | Action::Reject => {
            let expected = match status {
                Submitted => Role::Manager,
                ManagerApproved => Role::Client,
                _ => return Err(WorkflowError::InvalidTransition { action, status }),
            };
            // A manager acting on a manager_approved shift lost a decision
            // race; their stage is already decided, so this is a stale
            // transition rather than a role mismatch.
            if status == ManagerApproved && actor == Role::Manager {
                return Err(WorkflowError::InvalidTransition { action, status });
            }
            if actor != expected {
                return Err(WorkflowError::Unauthorized {
                    actor,
                    expected,
                    action,
                    status,
                });
            }
            let approving = action == Action::Approve;
            let next = match (status, approving) {
                (Submitted, true) => ManagerApproved,
                (Submitted, false) => ManagerRejected,
                (ManagerApproved, true) => ClientApproved,
                (ManagerApproved, false) => ClientRejected,
                _ => unreachable!(),
            };
            Ok(Transition {
                next,
                // Manager approval locks the record until the client decides;
                // client approval locks it for good. Rejections unlock.
                locked: matches!(next, ManagerApproved | ClientApproved),
                decision: Some(if approving {
                    Decision::Approved
                } else {
                    Decision::Rejected
                }),
            })
        }
    }
}
