use crate::domain::ValidName;
use crate::report::{self, BoqSourceRow};
use actix_web::{HttpResponse, ResponseError, web};
use chrono::{Days, Months, NaiveDate};
use serde_json::json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BoqError {
    #[error("the month must be formatted as YYYY-MM")]
    InvalidMonth,

    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl ResponseError for BoqError {
    fn error_response(&self) -> HttpResponse {
        match self {
            BoqError::InvalidMonth => {
                HttpResponse::BadRequest().json(json!({ "error": self.to_string() }))
            }
            BoqError::UnexpectedError(ref err) => {
                HttpResponse::InternalServerError().json(json!({ "error": err }))
            }
        }
    }
}

#[derive(serde::Deserialize, Debug)]
pub struct DailyBoqQuery {
    pub date: NaiveDate,
    pub rig: Option<ValidName>,
    pub client_id: Option<Uuid>,
    pub hole: Option<ValidName>,
}

#[derive(serde::Deserialize, Debug)]
pub struct MonthlyBoqQuery {
    /// `YYYY-MM`.
    pub month: String,
    pub rig: Option<ValidName>,
    pub client_id: Option<Uuid>,
}

#[tracing::instrument(name = "Assembling the daily BOQ report", skip(pool))]
pub async fn boq_daily(
    query: web::Query<DailyBoqQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, BoqError> {
    let end = query
        .date
        .checked_add_days(Days::new(1))
        .ok_or(BoqError::InvalidMonth)?;
    let rows = fetch_boq_rows(
        query.date,
        end,
        query.rig.as_ref(),
        query.client_id,
        query.hole.as_ref(),
        &pool,
    )
    .await
    .map_err(|err| BoqError::UnexpectedError(err.to_string()))?;

    Ok(HttpResponse::Ok().json(report::daily_boq(&rows)))
}

#[tracing::instrument(name = "Assembling the monthly BOQ report", skip(pool))]
pub async fn boq_monthly(
    query: web::Query<MonthlyBoqQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, BoqError> {
    let start = NaiveDate::parse_from_str(&format!("{}-01", query.month), "%Y-%m-%d")
        .map_err(|_| BoqError::InvalidMonth)?;
    let end = start
        .checked_add_months(Months::new(1))
        .ok_or(BoqError::InvalidMonth)?;

    let rows = fetch_boq_rows(start, end, query.rig.as_ref(), query.client_id, None, &pool)
        .await
        .map_err(|err| BoqError::UnexpectedError(err.to_string()))?;

    Ok(HttpResponse::Ok().json(report::monthly_boq(&rows)))
}

/// Progress rows joined with their shifts over `[start, end)`.
#[tracing::instrument(name = "Fetching BOQ source rows", skip(rig, client_id, hole, pool))]
async fn fetch_boq_rows(
    start: NaiveDate,
    end: NaiveDate,
    rig: Option<&ValidName>,
    client_id: Option<Uuid>,
    hole: Option<&ValidName>,
    pool: &PgPool,
) -> Result<Vec<BoqSourceRow>, anyhow::Error> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT s.shift_date, s.rig, p.hole, p.bit, p.meters_drilled, p.penetration_rate
         FROM progress_entries p
         JOIN shifts s ON p.shift_id = s.id
         WHERE s.shift_date >= ",
    );
    query.push_bind(start);
    query.push(" and s.shift_date < ");
    query.push_bind(end);

    if let Some(rig) = rig {
        query.push(" and s.rig = ");
        query.push_bind(rig.as_ref());
    }
    if let Some(client_id) = client_id {
        query.push(" and s.client_id = ");
        query.push_bind(client_id);
    }
    if let Some(hole) = hole {
        query.push(" and p.hole = ");
        query.push_bind(hole.as_ref());
    }
    query.push(" ORDER BY s.shift_date, s.rig, p.hole");

    Ok(query
        .build_query_as::<BoqSourceRow>()
        .fetch_all(pool)
        .await
        .map_err(BoqDbError)?)
}

pub struct BoqDbError(sqlx::Error);

debug_for_error!(BoqDbError);
error_for_error!(BoqDbError);
display_for_error!(
    BoqDbError,
    "A database error was encountered while trying to assemble a BOQ report."
);
