//! Handlers driving a shift through the approval workflow.
//!
//! All three actions share [`apply_action`]: the current status is re-read
//! under a `FOR UPDATE` row lock inside a transaction, the transition table
//! is consulted, and the status update plus the approval entry are committed
//! together. Of two concurrent decisions on the same shift exactly one
//! commits; the loser re-reads the advanced status and fails the transition
//! check.

use crate::domain::workflow::{Action, WorkflowError, decide};
use crate::domain::ShiftStatus;
use crate::middleware::Actor;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(serde::Deserialize, Debug, Default)]
pub struct DecisionNote {
    pub comment: Option<String>,
}

#[derive(thiserror::Error)]
pub enum WorkflowActionError {
    #[error("there is no shift with id {0}")]
    NotFound(Uuid),
    #[error(transparent)]
    Transition(#[from] WorkflowError),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

debug_for_error!(WorkflowActionError);

impl ResponseError for WorkflowActionError {
    fn status_code(&self) -> StatusCode {
        match self {
            WorkflowActionError::NotFound(_) => StatusCode::NOT_FOUND,
            WorkflowActionError::Transition(WorkflowError::InvalidTransition { .. }) => {
                StatusCode::CONFLICT
            }
            WorkflowActionError::Transition(WorkflowError::Unauthorized { .. }) => {
                StatusCode::FORBIDDEN
            }
            WorkflowActionError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

#[tracing::instrument(name = "Submitting a shift", skip(actor, pool), fields(actor = %actor.name))]
pub async fn submit(
    actor: Actor,
    shift_id: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, WorkflowActionError> {
    act(Action::Submit, actor, shift_id.into_inner(), None, &pool).await
}

#[tracing::instrument(name = "Approving a shift", skip(actor, note, pool), fields(actor = %actor.name))]
pub async fn approve(
    actor: Actor,
    shift_id: web::Path<Uuid>,
    note: Option<web::Json<DecisionNote>>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, WorkflowActionError> {
    let comment = note.and_then(|n| n.into_inner().comment);
    act(Action::Approve, actor, shift_id.into_inner(), comment, &pool).await
}

#[tracing::instrument(name = "Rejecting a shift", skip(actor, note, pool), fields(actor = %actor.name))]
pub async fn reject(
    actor: Actor,
    shift_id: web::Path<Uuid>,
    note: Option<web::Json<DecisionNote>>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, WorkflowActionError> {
    let comment = note.and_then(|n| n.into_inner().comment);
    act(Action::Reject, actor, shift_id.into_inner(), comment, &pool).await
}

async fn act(
    action: Action,
    actor: Actor,
    shift_id: Uuid,
    comment: Option<String>,
    pool: &PgPool,
) -> Result<HttpResponse, WorkflowActionError> {
    let status = apply_action(action, shift_id, &actor, comment, pool).await?;
    Ok(HttpResponse::Ok().json(json!({ "id": shift_id, "status": status })))
}

#[tracing::instrument(
    name = "Applying a workflow action",
    skip(actor, comment, pool),
    fields(actor = %actor.name, role = %actor.role)
)]
pub async fn apply_action(
    action: Action,
    shift_id: Uuid,
    actor: &Actor,
    comment: Option<String>,
    pool: &PgPool,
) -> Result<ShiftStatus, WorkflowActionError> {
    let mut transaction = pool
        .begin()
        .await
        .map_err(|e| WorkflowActionError::UnexpectedError(TransitionDbError(e).into()))?;

    let row: Option<(ShiftStatus,)> =
        sqlx::query_as("SELECT status FROM shifts WHERE id = $1 FOR UPDATE")
            .bind(shift_id)
            .fetch_optional(&mut *transaction)
            .await
            .map_err(|e| WorkflowActionError::UnexpectedError(TransitionDbError(e).into()))?;

    let (status,) = row.ok_or(WorkflowActionError::NotFound(shift_id))?;
    let transition = decide(status, action, actor.role)?;

    sqlx::query("UPDATE shifts SET status = $1, is_locked = $2, updated_at = $3 WHERE id = $4")
        .bind(transition.next)
        .bind(transition.locked)
        .bind(Utc::now())
        .bind(shift_id)
        .execute(&mut *transaction)
        .await
        .map_err(|e| WorkflowActionError::UnexpectedError(TransitionDbError(e).into()))?;

    if let Some(decision) = transition.decision {
        sqlx::query(
            r#"
            INSERT INTO approvals (id, shift_id, approver, role, decision, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(shift_id)
        .bind(&actor.name)
        .bind(actor.role)
        .bind(decision)
        .bind(&comment)
        .bind(Utc::now())
        .execute(&mut *transaction)
        .await
        .map_err(|e| WorkflowActionError::UnexpectedError(TransitionDbError(e).into()))?;
    }

    transaction
        .commit()
        .await
        .map_err(|e| WorkflowActionError::UnexpectedError(TransitionDbError(e).into()))?;

    Ok(transition.next)
}

pub struct TransitionDbError(sqlx::Error);

debug_for_error!(TransitionDbError);
error_for_error!(TransitionDbError);
display_for_error!(
    TransitionDbError,
    "A database error was encountered while trying to apply a workflow action."
);
