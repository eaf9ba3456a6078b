use crate::domain::{MetricsError, Role, ShiftUpdate};
use crate::middleware::Actor;
use crate::routes::add::{ChildEntries, ChildPayload};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(thiserror::Error)]
pub enum UpdateError {
    #[error("{0}")]
    Validation(#[from] MetricsError),
    #[error("there is no shift with id {0}")]
    NotFound(Uuid),
    #[error("the shift has been approved and can no longer be modified")]
    Locked,
    #[error("only a supervisor may edit a shift")]
    Forbidden,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

debug_for_error!(UpdateError);

impl ResponseError for UpdateError {
    fn status_code(&self) -> StatusCode {
        match self {
            UpdateError::Validation(_) => StatusCode::BAD_REQUEST,
            UpdateError::NotFound(_) => StatusCode::NOT_FOUND,
            UpdateError::Locked => StatusCode::LOCKED,
            UpdateError::Forbidden => StatusCode::FORBIDDEN,
            UpdateError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

#[tracing::instrument(name = "Updating a shift", skip(actor, shift, pool), fields(actor = %actor.name))]
pub async fn update(
    actor: Actor,
    shift_id: web::Path<Uuid>,
    shift: web::Json<ShiftUpdate>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, UpdateError> {
    if actor.role != Role::Supervisor {
        return Err(UpdateError::Forbidden);
    }

    let shift_id = shift_id.into_inner();
    let shift = shift.into_inner();
    let children = ChildEntries::validate(
        shift_id,
        ChildPayload {
            progress: shift.progress.clone(),
            activities: shift.activities.clone(),
            materials: shift.materials.clone(),
            surveys: shift.surveys.clone(),
            casings: shift.casings.clone(),
        },
    )?;

    update_shift(shift_id, &shift, &children, &pool).await?;

    Ok(HttpResponse::Ok().json(json!({ "id": shift_id })))
}

/// Replaces the mutable columns and the whole set of child entries. The row
/// lock taken by `FOR UPDATE` keeps a concurrent approval from slipping in
/// between the lock check and the write.
#[tracing::instrument(name = "Writing shift update to database", skip(shift, children, pool))]
async fn update_shift(
    shift_id: Uuid,
    shift: &ShiftUpdate,
    children: &ChildEntries,
    pool: &PgPool,
) -> Result<(), UpdateError> {
    let mut transaction = pool
        .begin()
        .await
        .map_err(|e| UpdateError::UnexpectedError(UpdateShiftError(e).into()))?;

    let row: Option<(bool,)> =
        sqlx::query_as("SELECT is_locked FROM shifts WHERE id = $1 FOR UPDATE")
            .bind(shift_id)
            .fetch_optional(&mut *transaction)
            .await
            .map_err(|e| UpdateError::UnexpectedError(UpdateShiftError(e).into()))?;

    match row {
        None => return Err(UpdateError::NotFound(shift_id)),
        Some((true,)) => return Err(UpdateError::Locked),
        Some((false,)) => {}
    }

    sqlx::query(
        r#"
        UPDATE shifts
        SET location = $2,
            client_id = $3,
            supervisor = $4,
            driller = $5,
            helpers = $6,
            start_time = $7,
            end_time = $8,
            notes = $9,
            updated_at = $10
        WHERE id = $1
        "#,
    )
    .bind(shift_id)
    .bind(&shift.location)
    .bind(shift.client_id)
    .bind(shift.supervisor.as_ref())
    .bind(&shift.driller)
    .bind(&shift.helpers)
    .bind(shift.start_time)
    .bind(shift.end_time)
    .bind(&shift.notes)
    .bind(Utc::now())
    .execute(&mut *transaction)
    .await
    .map_err(|e| UpdateError::UnexpectedError(UpdateShiftError(e).into()))?;

    for table in [
        "DELETE FROM progress_entries WHERE shift_id = $1",
        "DELETE FROM activity_entries WHERE shift_id = $1",
        "DELETE FROM material_entries WHERE shift_id = $1",
        "DELETE FROM survey_entries WHERE shift_id = $1",
        "DELETE FROM casing_entries WHERE shift_id = $1",
    ] {
        sqlx::query(table)
            .bind(shift_id)
            .execute(&mut *transaction)
            .await
            .map_err(|e| UpdateError::UnexpectedError(UpdateShiftError(e).into()))?;
    }

    children
        .insert(&mut transaction)
        .await
        .map_err(|e| UpdateError::UnexpectedError(UpdateShiftError(e).into()))?;

    transaction
        .commit()
        .await
        .map_err(|e| UpdateError::UnexpectedError(UpdateShiftError(e).into()))
}

pub struct UpdateShiftError(sqlx::Error);

debug_for_error!(UpdateShiftError);
error_for_error!(UpdateShiftError);
display_for_error!(
    UpdateShiftError,
    "A database error was encountered while trying to update a shift."
);
