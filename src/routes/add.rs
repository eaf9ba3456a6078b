use crate::domain::{
    ActivityAdd, ActivityEntry, CasingAdd, CasingEntry, MaterialAdd, MaterialEntry, MetricsError,
    ProgressAdd, ProgressEntry, Role, ShiftAdd, ShiftStatus, SurveyAdd, SurveyEntry,
};
use crate::middleware::Actor;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use chrono::Utc;
use serde_json::json;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

#[derive(thiserror::Error)]
pub enum AddError {
    #[error("{0}")]
    Validation(#[from] MetricsError),
    #[error("a shift for this date, rig and kind has already been recorded")]
    ShiftExists,
    #[error("only a supervisor may record a shift")]
    Forbidden,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

debug_for_error!(AddError);

impl ResponseError for AddError {
    fn status_code(&self) -> StatusCode {
        match self {
            AddError::Validation(_) => StatusCode::BAD_REQUEST,
            AddError::ShiftExists => StatusCode::CONFLICT,
            AddError::Forbidden => StatusCode::FORBIDDEN,
            AddError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

#[tracing::instrument(
    name = "Recording a new shift",
    skip(shift, pool),
    fields(date = %shift.date, rig = %shift.rig, kind = %shift.kind)
)]
pub async fn add(
    actor: Actor,
    shift: web::Json<ShiftAdd>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AddError> {
    if actor.role != Role::Supervisor {
        return Err(AddError::Forbidden);
    }

    let shift = shift.into_inner();
    let shift_id = Uuid::new_v4();
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

    insert_shift(shift_id, &actor, &shift, &children, &pool)
        .await
        .map_err(|e| {
            let code = e
                .0
                .as_database_error()
                .and_then(|db_err| db_err.code().map(|c| c.to_string()));
            match code.as_deref() {
                Some("23505") => AddError::ShiftExists,
                _ => AddError::UnexpectedError(e.into()),
            }
        })?;

    Ok(HttpResponse::Created().json(json!({ "id": shift_id })))
}

/// Raw child collections as they arrive in a create or update payload.
pub(crate) struct ChildPayload {
    pub progress: Vec<ProgressAdd>,
    pub activities: Vec<ActivityAdd>,
    pub materials: Vec<MaterialAdd>,
    pub surveys: Vec<SurveyAdd>,
    pub casings: Vec<CasingAdd>,
}

/// Validated child rows belonging to one shift, ready to be persisted.
pub(crate) struct ChildEntries {
    pub progress: Vec<ProgressEntry>,
    pub activities: Vec<ActivityEntry>,
    pub materials: Vec<MaterialEntry>,
    pub surveys: Vec<SurveyEntry>,
    pub casings: Vec<CasingEntry>,
}

impl ChildEntries {
    /// Turns the raw payloads into entries, computing the derived columns.
    /// The first invalid entry aborts the whole request.
    pub(crate) fn validate(
        shift_id: Uuid,
        payload: ChildPayload,
    ) -> Result<ChildEntries, MetricsError> {
        Ok(ChildEntries {
            progress: payload
                .progress
                .into_iter()
                .map(|p| ProgressEntry::new(shift_id, p))
                .collect::<Result<_, _>>()?,
            activities: payload
                .activities
                .into_iter()
                .map(|a| ActivityEntry::new(shift_id, a))
                .collect::<Result<_, _>>()?,
            materials: payload
                .materials
                .into_iter()
                .map(|m| MaterialEntry::new(shift_id, m))
                .collect::<Result<_, _>>()?,
            surveys: payload
                .surveys
                .into_iter()
                .map(|s| SurveyEntry::new(shift_id, s))
                .collect::<Result<_, _>>()?,
            casings: payload
                .casings
                .into_iter()
                .map(|c| CasingEntry::new(shift_id, c))
                .collect::<Result<_, _>>()?,
        })
    }

    pub(crate) async fn insert(
        &self,
        transaction: &mut Transaction<'_, Postgres>,
    ) -> Result<(), sqlx::Error> {
        if !self.progress.is_empty() {
            let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO progress_entries \
                 (id, shift_id, hole, bit, start_depth, end_depth, meters_drilled, \
                  core_loss, core_gain, recovery_percentage, penetration_rate, \
                  start_time, end_time, image_ref, remarks) ",
            );
            query_builder.push_values(self.progress.iter(), |mut b, p| {
                b.push_bind(p.id)
                    .push_bind(p.shift_id)
                    .push_bind(&p.hole)
                    .push_bind(p.bit)
                    .push_bind(p.start_depth)
                    .push_bind(p.end_depth)
                    .push_bind(p.meters_drilled)
                    .push_bind(p.core_loss)
                    .push_bind(p.core_gain)
                    .push_bind(p.recovery_percentage)
                    .push_bind(p.penetration_rate)
                    .push_bind(p.start_time)
                    .push_bind(p.end_time)
                    .push_bind(&p.image_ref)
                    .push_bind(&p.remarks);
            });
            query_builder.build().execute(&mut **transaction).await?;
        }

        if !self.activities.is_empty() {
            let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO activity_entries \
                 (id, shift_id, kind, description, start_time, end_time, duration_minutes) ",
            );
            query_builder.push_values(self.activities.iter(), |mut b, a| {
                b.push_bind(a.id)
                    .push_bind(a.shift_id)
                    .push_bind(a.kind)
                    .push_bind(&a.description)
                    .push_bind(a.start_time)
                    .push_bind(a.end_time)
                    .push_bind(a.duration_minutes);
            });
            query_builder.build().execute(&mut **transaction).await?;
        }

        if !self.materials.is_empty() {
            let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO material_entries (id, shift_id, name, quantity, unit) ",
            );
            query_builder.push_values(self.materials.iter(), |mut b, m| {
                b.push_bind(m.id)
                    .push_bind(m.shift_id)
                    .push_bind(&m.name)
                    .push_bind(m.quantity)
                    .push_bind(&m.unit);
            });
            query_builder.build().execute(&mut **transaction).await?;
        }

        if !self.surveys.is_empty() {
            let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO survey_entries \
                 (id, shift_id, kind, depth, dip_angle, azimuth, findings, surveyor) ",
            );
            query_builder.push_values(self.surveys.iter(), |mut b, s| {
                b.push_bind(s.id)
                    .push_bind(s.shift_id)
                    .push_bind(s.kind)
                    .push_bind(s.depth)
                    .push_bind(s.dip_angle)
                    .push_bind(s.azimuth)
                    .push_bind(&s.findings)
                    .push_bind(&s.surveyor);
            });
            query_builder.build().execute(&mut **transaction).await?;
        }

        if !self.casings.is_empty() {
            let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO casing_entries \
                 (id, shift_id, size, kind, start_depth, end_depth, length, remarks) ",
            );
            query_builder.push_values(self.casings.iter(), |mut b, c| {
                b.push_bind(c.id)
                    .push_bind(c.shift_id)
                    .push_bind(&c.size)
                    .push_bind(c.kind)
                    .push_bind(c.start_depth)
                    .push_bind(c.end_depth)
                    .push_bind(c.length)
                    .push_bind(&c.remarks);
            });
            query_builder.build().execute(&mut **transaction).await?;
        }

        Ok(())
    }
}

#[tracing::instrument(name = "Inserting shift into database", skip(actor, shift, children, pool))]
async fn insert_shift(
    shift_id: Uuid,
    actor: &Actor,
    shift: &ShiftAdd,
    children: &ChildEntries,
    pool: &PgPool,
) -> Result<(), InsertShiftError> {
    let mut transaction = pool.begin().await.map_err(InsertShiftError)?;
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO shifts (
            id, shift_date, rig, kind, location, client_id, supervisor, driller,
            helpers, start_time, end_time, notes, status, is_locked,
            created_by, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, false, $14, $15, $15)
        "#,
    )
    .bind(shift_id)
    .bind(shift.date)
    .bind(shift.rig.as_ref())
    .bind(shift.kind)
    .bind(&shift.location)
    .bind(shift.client_id)
    .bind(shift.supervisor.as_ref())
    .bind(&shift.driller)
    .bind(&shift.helpers)
    .bind(shift.start_time)
    .bind(shift.end_time)
    .bind(&shift.notes)
    .bind(ShiftStatus::Draft)
    .bind(&actor.name)
    .bind(now)
    .execute(&mut *transaction)
    .await
    .map_err(InsertShiftError)?;

    children
        .insert(&mut transaction)
        .await
        .map_err(InsertShiftError)?;

    transaction.commit().await.map_err(InsertShiftError)
}

pub struct InsertShiftError(sqlx::Error);

debug_for_error!(InsertShiftError);
error_for_error!(InsertShiftError);
display_for_error!(
    InsertShiftError,
    "A database error was encountered while trying to store a shift."
);
