use crate::domain::{
    ActivityEntry, ApprovalRecord, CasingEntry, Combined24h, MaterialEntry, ProgressEntry,
    ShiftMetrics, ShiftRecord, ShiftStatus, SurveyEntry, ValidName,
};
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use chrono::NaiveDate;
use serde_json::json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Filters {
    pub status: Option<ShiftStatus>,
    pub rig: Option<ValidName>,
    pub client_id: Option<Uuid>,
    pub hole: Option<ValidName>,
    pub date: Option<Operator<NaiveDate>>,
    pub sort_by: Option<SortOption>,
    pub limit: Option<i64>,
}

impl Filters {
    pub fn is_all_none(&self) -> bool {
        self.status.is_none()
            && self.rig.is_none()
            && self.client_id.is_none()
            && self.hole.is_none()
            && self.date.is_none()
            && self.sort_by.is_none()
            && self.limit.is_none()
    }
}

/// Comparison operators accepted in bracketed query parameters, e.g.
/// `date[gte]=2025-01-01&date[lt]=2025-02-01`.
#[derive(serde::Deserialize, Debug, Clone)]
pub struct Operator<T> {
    pub gt: Option<T>,
    pub lt: Option<T>,
    pub gte: Option<T>,
    pub lte: Option<T>,
    pub equals: Option<T>,
}

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    ASC(SortField),
    DESC(SortField),
}

#[derive(serde::Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "rig")]
    Rig,
    #[serde(rename = "status")]
    Status,
    #[serde(rename = "created_at")]
    CreatedAt,
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SortField::Date => write!(f, "shift_date"),
            SortField::Rig => write!(f, "rig"),
            SortField::Status => write!(f, "status"),
            SortField::CreatedAt => write!(f, "created_at"),
        }
    }
}

#[derive(Debug, Error)]
pub enum GetFilterError {
    #[error("Invalid query parameters")]
    InvalidQuery,

    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl ResponseError for GetFilterError {
    fn error_response(&self) -> HttpResponse {
        match self {
            GetFilterError::InvalidQuery => {
                HttpResponse::BadRequest().json(json!({ "error": "Invalid query parameters" }))
            }
            GetFilterError::UnexpectedError(ref err) => {
                HttpResponse::InternalServerError().json(json!({ "error": err }))
            }
        }
    }
}

#[tracing::instrument(name = "Listing shifts", skip(query, pool))]
pub async fn query_shifts(
    query: HttpRequest,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, GetFilterError> {
    let query_string = query.query_string();

    let filters: Filters = match serde_qs::from_str(query_string) {
        Ok(filters) => filters,
        Err(_) => return Err(GetFilterError::InvalidQuery),
    };

    if !query_string.is_empty() && filters.is_all_none() {
        return Err(GetFilterError::InvalidQuery);
    }

    let shifts = advanced_shift_filtering(filters, &pool)
        .await
        .map_err(|err| GetFilterError::UnexpectedError(err.to_string()))?;

    Ok(HttpResponse::Ok().json(shifts))
}

#[tracing::instrument(name = "Filtering shifts with custom query", skip(filters, pool))]
pub async fn advanced_shift_filtering(
    filters: Filters,
    pool: &PgPool,
) -> Result<Vec<ShiftRecord>, anyhow::Error> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT s.id, s.shift_date, s.rig, s.kind, s.location, s.client_id,
                s.supervisor, s.driller, s.helpers, s.start_time, s.end_time,
                s.notes, s.status, s.is_locked, s.created_by, s.created_at, s.updated_at
         FROM shifts s
         WHERE TRUE",
    );

    if let Some(status) = &filters.status {
        query.push(" and s.status = ");
        query.push_bind(*status);
    }

    if let Some(rig) = &filters.rig {
        query.push(" and s.rig = ");
        query.push_bind(rig.as_ref());
    }

    if let Some(client_id) = &filters.client_id {
        query.push(" and s.client_id = ");
        query.push_bind(*client_id);
    }

    if let Some(hole) = &filters.hole {
        query.push(" and EXISTS (SELECT 1 FROM progress_entries p WHERE p.shift_id = s.id and p.hole = ");
        query.push_bind(hole.as_ref());
        query.push(" ) ");
    }

    if let Some(date_filters) = &filters.date {
        if let Some(operators) = get_operator(date_filters) {
            for operator in operators {
                query.push(format!(" and s.shift_date {} ", operator.0));
                query.push_bind(*operator.1);
            }
        }
    }

    if let Some(sort_by) = &filters.sort_by {
        match sort_by {
            SortOption::ASC(field) => query.push(format!(" ORDER BY s.{field} ASC")),
            SortOption::DESC(field) => query.push(format!(" ORDER BY s.{field} DESC")),
        };
    } else {
        query.push(" ORDER BY s.shift_date, s.rig, s.kind");
    }

    if let Some(limit) = &filters.limit {
        query.push(" LIMIT ");
        query.push_bind(limit);
    }

    Ok(query
        .build_query_as::<ShiftRecord>()
        .fetch_all(pool)
        .await
        .map_err(GetShiftDbError)?)
}

fn get_operator<T>(operator: &Operator<T>) -> Option<Vec<(&str, &T)>> {
    // Contradictory bound pairs drop the whole filter.
    if operator.gt.is_some() && operator.gte.is_some()
        || operator.lt.is_some() && operator.lte.is_some()
    {
        return None;
    }

    let mut operators: Vec<(&str, &T)> = Vec::new();
    if let Some(gt) = &operator.gt {
        operators.push((">", gt));
    }
    if let Some(lt) = &operator.lt {
        operators.push(("<", lt));
    }
    if let Some(gte) = &operator.gte {
        operators.push((">=", gte));
    }
    if let Some(lte) = &operator.lte {
        operators.push(("<=", lte));
    }
    if let Some(equals) = &operator.equals {
        operators.push(("=", equals));
    }
    if operators.is_empty() {
        None
    } else {
        Some(operators)
    }
}

/// A full shift view: the row itself, its child entries, the approval trail,
/// the derived metrics and the combined totals with the companion shift.
#[derive(Debug, serde::Serialize)]
pub struct ShiftDetail {
    #[serde(flatten)]
    pub shift: ShiftRecord,
    pub progress: Vec<ProgressEntry>,
    pub activities: Vec<ActivityEntry>,
    pub materials: Vec<MaterialEntry>,
    pub surveys: Vec<SurveyEntry>,
    pub casings: Vec<CasingEntry>,
    pub approvals: Vec<ApprovalRecord>,
    pub metrics: ShiftMetrics,
    pub companion_id: Option<Uuid>,
    pub combined_24h: Combined24h,
}

#[derive(thiserror::Error)]
pub enum GetShiftError {
    #[error("there is no shift with id {0}")]
    NotFound(Uuid),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

debug_for_error!(GetShiftError);
responseerror_for_error!(GetShiftError, NotFound => NOT_FOUND; UnexpectedError => INTERNAL_SERVER_ERROR;);

#[tracing::instrument(name = "Getting one shift", skip(pool))]
pub async fn get_shift(
    shift_id: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, GetShiftError> {
    let shift_id = shift_id.into_inner();
    let detail = get_one_shift(shift_id, &pool)
        .await?
        .ok_or(GetShiftError::NotFound(shift_id))?;
    Ok(HttpResponse::Ok().json(detail))
}

#[tracing::instrument(name = "Getting the approval trail of a shift", skip(pool))]
pub async fn get_approvals(
    shift_id: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, GetShiftError> {
    let shift_id = shift_id.into_inner();
    if fetch_shift(shift_id, &pool).await?.is_none() {
        return Err(GetShiftError::NotFound(shift_id));
    }
    let approvals = fetch_approvals(shift_id, &pool).await?;
    Ok(HttpResponse::Ok().json(approvals))
}

async fn get_one_shift(shift_id: Uuid, pool: &PgPool) -> Result<Option<ShiftDetail>, anyhow::Error> {
    let Some(shift) = fetch_shift(shift_id, pool).await? else {
        return Ok(None);
    };

    let progress = fetch_progress(shift_id, pool).await?;
    let activities = fetch_activities(shift_id, pool).await?;
    let materials = fetch_materials(shift_id, pool).await?;
    let surveys = fetch_surveys(shift_id, pool).await?;
    let casings = fetch_casings(shift_id, pool).await?;
    let approvals = fetch_approvals(shift_id, pool).await?;
    let metrics = ShiftMetrics::compute(&shift, &progress, &activities);

    let companion = fetch_companion(&shift, pool).await?;
    let companion_metrics = match &companion {
        Some(companion) => Some(ShiftMetrics::compute(
            companion,
            &fetch_progress(companion.id, pool).await?,
            &fetch_activities(companion.id, pool).await?,
        )),
        None => None,
    };
    let combined_24h = metrics.combined_with(companion_metrics.as_ref());

    Ok(Some(ShiftDetail {
        shift,
        progress,
        activities,
        materials,
        surveys,
        casings,
        approvals,
        metrics,
        companion_id: companion.map(|c| c.id),
        combined_24h,
    }))
}

pub(crate) async fn fetch_shift(
    shift_id: Uuid,
    pool: &PgPool,
) -> Result<Option<ShiftRecord>, anyhow::Error> {
    Ok(sqlx::query_as::<_, ShiftRecord>(
        r#"
        SELECT id, shift_date, rig, kind, location, client_id, supervisor, driller,
               helpers, start_time, end_time, notes, status, is_locked,
               created_by, created_at, updated_at
        FROM shifts
        WHERE id = $1
        "#,
    )
    .bind(shift_id)
    .fetch_optional(pool)
    .await
    .map_err(GetShiftDbError)?)
}

/// The other half of the 24-hour period: same date and rig, opposite kind.
async fn fetch_companion(
    shift: &ShiftRecord,
    pool: &PgPool,
) -> Result<Option<ShiftRecord>, anyhow::Error> {
    Ok(sqlx::query_as::<_, ShiftRecord>(
        r#"
        SELECT id, shift_date, rig, kind, location, client_id, supervisor, driller,
               helpers, start_time, end_time, notes, status, is_locked,
               created_by, created_at, updated_at
        FROM shifts
        WHERE shift_date = $1 AND rig = $2 AND kind = $3
        "#,
    )
    .bind(shift.date)
    .bind(&shift.rig)
    .bind(shift.kind.opposite())
    .fetch_optional(pool)
    .await
    .map_err(GetShiftDbError)?)
}

pub(crate) async fn fetch_progress(
    shift_id: Uuid,
    pool: &PgPool,
) -> Result<Vec<ProgressEntry>, anyhow::Error> {
    Ok(sqlx::query_as::<_, ProgressEntry>(
        r#"
        SELECT id, shift_id, hole, bit, start_depth, end_depth, meters_drilled,
               core_loss, core_gain, recovery_percentage, penetration_rate,
               start_time, end_time, image_ref, remarks
        FROM progress_entries
        WHERE shift_id = $1
        ORDER BY start_time
        "#,
    )
    .bind(shift_id)
    .fetch_all(pool)
    .await
    .map_err(GetShiftDbError)?)
}

pub(crate) async fn fetch_activities(
    shift_id: Uuid,
    pool: &PgPool,
) -> Result<Vec<ActivityEntry>, anyhow::Error> {
    Ok(sqlx::query_as::<_, ActivityEntry>(
        r#"
        SELECT id, shift_id, kind, description, start_time, end_time, duration_minutes
        FROM activity_entries
        WHERE shift_id = $1
        ORDER BY start_time
        "#,
    )
    .bind(shift_id)
    .fetch_all(pool)
    .await
    .map_err(GetShiftDbError)?)
}

pub(crate) async fn fetch_materials(
    shift_id: Uuid,
    pool: &PgPool,
) -> Result<Vec<MaterialEntry>, anyhow::Error> {
    Ok(sqlx::query_as::<_, MaterialEntry>(
        r#"
        SELECT id, shift_id, name, quantity, unit
        FROM material_entries
        WHERE shift_id = $1
        ORDER BY name
        "#,
    )
    .bind(shift_id)
    .fetch_all(pool)
    .await
    .map_err(GetShiftDbError)?)
}

pub(crate) async fn fetch_surveys(
    shift_id: Uuid,
    pool: &PgPool,
) -> Result<Vec<SurveyEntry>, anyhow::Error> {
    Ok(sqlx::query_as::<_, SurveyEntry>(
        r#"
        SELECT id, shift_id, kind, depth, dip_angle, azimuth, findings, surveyor
        FROM survey_entries
        WHERE shift_id = $1
        ORDER BY depth
        "#,
    )
    .bind(shift_id)
    .fetch_all(pool)
    .await
    .map_err(GetShiftDbError)?)
}

pub(crate) async fn fetch_casings(
    shift_id: Uuid,
    pool: &PgPool,
) -> Result<Vec<CasingEntry>, anyhow::Error> {
    Ok(sqlx::query_as::<_, CasingEntry>(
        r#"
        SELECT id, shift_id, size, kind, start_depth, end_depth, length, remarks
        FROM casing_entries
        WHERE shift_id = $1
        ORDER BY start_depth
        "#,
    )
    .bind(shift_id)
    .fetch_all(pool)
    .await
    .map_err(GetShiftDbError)?)
}

pub(crate) async fn fetch_approvals(
    shift_id: Uuid,
    pool: &PgPool,
) -> Result<Vec<ApprovalRecord>, anyhow::Error> {
    Ok(sqlx::query_as::<_, ApprovalRecord>(
        r#"
        SELECT id, shift_id, approver, role, decision, comment, created_at
        FROM approvals
        WHERE shift_id = $1
        ORDER BY created_at
        "#,
    )
    .bind(shift_id)
    .fetch_all(pool)
    .await
    .map_err(GetShiftDbError)?)
}

pub struct GetShiftDbError(sqlx::Error);

error_for_error!(GetShiftDbError);
debug_for_error!(GetShiftDbError);
display_for_error!(
    GetShiftDbError,
    "A database error was encountered while trying to get a shift from the database."
);
