use crate::domain::{MaterialEntry, ProgressEntry, ShiftRecord};
use crate::report::{self, ReportTable};
use actix_web::{HttpResponse, ResponseError, web};
use anyhow::Context;
use chrono::NaiveDate;
use serde_json::{Value, json};
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("`from` must not be after `to`")]
    InvalidRange,

    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl ResponseError for ExportError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ExportError::InvalidRange => {
                HttpResponse::BadRequest().json(json!({ "error": self.to_string() }))
            }
            ExportError::UnexpectedError(ref err) => {
                HttpResponse::InternalServerError().json(json!({ "error": err }))
            }
        }
    }
}

#[derive(serde::Deserialize, Debug)]
pub struct ExportQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[tracing::instrument(name = "Exporting shift summaries as CSV", skip(pool))]
pub async fn export_shifts_csv(
    query: web::Query<ExportQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ExportError> {
    if query.from > query.to {
        return Err(ExportError::InvalidRange);
    }

    let table = summaries_between(query.from, query.to, &pool)
        .await
        .map_err(|err| ExportError::UnexpectedError(err.to_string()))?;
    let body = to_csv(&table).map_err(|err| ExportError::UnexpectedError(err.to_string()))?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            "content-disposition",
            "attachment; filename=\"shifts.csv\"",
        ))
        .body(body))
}

async fn summaries_between(
    from: NaiveDate,
    to: NaiveDate,
    pool: &PgPool,
) -> Result<ReportTable, anyhow::Error> {
    let shifts = sqlx::query_as::<_, ShiftRecord>(
        r#"
        SELECT id, shift_date, rig, kind, location, client_id, supervisor, driller,
               helpers, start_time, end_time, notes, status, is_locked,
               created_by, created_at, updated_at
        FROM shifts
        WHERE shift_date BETWEEN $1 AND $2
        ORDER BY shift_date, rig, kind
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
    .map_err(ExportDbError)?;

    let progress = sqlx::query_as::<_, ProgressEntry>(
        r#"
        SELECT p.id, p.shift_id, p.hole, p.bit, p.start_depth, p.end_depth,
               p.meters_drilled, p.core_loss, p.core_gain, p.recovery_percentage,
               p.penetration_rate, p.start_time, p.end_time, p.image_ref, p.remarks
        FROM progress_entries p
        JOIN shifts s ON p.shift_id = s.id
        WHERE s.shift_date BETWEEN $1 AND $2
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
    .map_err(ExportDbError)?;

    let materials = sqlx::query_as::<_, MaterialEntry>(
        r#"
        SELECT m.id, m.shift_id, m.name, m.quantity, m.unit
        FROM material_entries m
        JOIN shifts s ON m.shift_id = s.id
        WHERE s.shift_date BETWEEN $1 AND $2
        ORDER BY m.name
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
    .map_err(ExportDbError)?;

    Ok(report::shift_summaries(&shifts, &progress, &materials))
}

fn to_csv(table: &ReportTable) -> Result<String, anyhow::Error> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer
        .write_record(&table.columns)
        .context("Failed to write the CSV header")?;
    for row in &table.rows {
        writer
            .write_record(row.iter().map(cell_to_string))
            .context("Failed to write a CSV row")?;
    }
    let bytes = writer.into_inner().context("Failed to flush the CSV")?;
    String::from_utf8(bytes).context("The CSV was not valid UTF-8")
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub struct ExportDbError(sqlx::Error);

debug_for_error!(ExportDbError);
error_for_error!(ExportDbError);
display_for_error!(
    ExportDbError,
    "A database error was encountered while trying to export shift summaries."
);
