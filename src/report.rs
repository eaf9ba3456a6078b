//! Report assembly for BOQ views and exports.
//!
//! Everything in this module turns already-fetched rows into a
//! [`ReportTable`]: an ordered list of column names plus rows of plain JSON
//! scalars. Rendering (CSV download, spreadsheet, PDF) happens outside; the
//! assembler never encodes anything itself.

use crate::domain::{BitSize, MaterialEntry, ProgressEntry, ShiftRecord};
use chrono::NaiveDate;
use itertools::Itertools;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// A language-neutral table handed to rendering collaborators.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReportTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ReportTable {
    fn new<S: Into<String>>(columns: Vec<S>) -> Self {
        ReportTable {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }
}

/// One progress row joined with its shift, as fetched for BOQ queries.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BoqSourceRow {
    pub shift_date: NaiveDate,
    pub rig: String,
    pub hole: String,
    pub bit: BitSize,
    pub meters_drilled: f64,
    pub penetration_rate: Option<f64>,
}

#[derive(Default)]
struct Accumulator {
    meters: f64,
    rate_sum: f64,
    rate_count: usize,
    runs: usize,
}

impl Accumulator {
    fn push(&mut self, row: &BoqSourceRow) {
        self.meters += row.meters_drilled;
        if let Some(rate) = row.penetration_rate {
            self.rate_sum += rate;
            self.rate_count += 1;
        }
        self.runs += 1;
    }

    fn avg_rate(&self) -> Value {
        if self.rate_count == 0 {
            Value::Null
        } else {
            json!(self.rate_sum / self.rate_count as f64)
        }
    }
}

/// Daily bill of quantities: progress grouped by `(hole, bit size)` with
/// summed meters, mean penetration rate and run count.
pub fn daily_boq(rows: &[BoqSourceRow]) -> ReportTable {
    let mut groups: BTreeMap<(String, BitSize), Accumulator> = BTreeMap::new();
    for row in rows {
        groups
            .entry((row.hole.clone(), row.bit))
            .or_default()
            .push(row);
    }

    let mut table = ReportTable::new(vec![
        "hole",
        "bit_size",
        "total_meters",
        "avg_penetration_rate",
        "runs",
    ]);
    for ((hole, bit), acc) in groups {
        table.rows.push(vec![
            json!(hole),
            json!(bit.to_string()),
            json!(acc.meters),
            acc.avg_rate(),
            json!(acc.runs),
        ]);
    }
    table
}

/// Monthly bill of quantities: progress grouped by `(date, rig)` with summed
/// daily meters and mean penetration rate.
pub fn monthly_boq(rows: &[BoqSourceRow]) -> ReportTable {
    let mut groups: BTreeMap<(NaiveDate, String), Accumulator> = BTreeMap::new();
    for row in rows {
        groups
            .entry((row.shift_date, row.rig.clone()))
            .or_default()
            .push(row);
    }

    let mut table = ReportTable::new(vec!["date", "rig", "total_meters", "avg_penetration_rate"]);
    for ((date, rig), acc) in groups {
        table.rows.push(vec![
            json!(date.to_string()),
            json!(rig),
            json!(acc.meters),
            acc.avg_rate(),
        ]);
    }
    table
}

/// Per-shift summary rows for the CSV export: one row per shift with its
/// aggregate meters, mean rate and a flattened material list.
pub fn shift_summaries(
    shifts: &[ShiftRecord],
    progress: &[ProgressEntry],
    materials: &[MaterialEntry],
) -> ReportTable {
    let mut table = ReportTable::new(vec![
        "date",
        "rig",
        "shift",
        "status",
        "supervisor",
        "total_meters",
        "avg_penetration_rate",
        "materials",
    ]);

    for shift in shifts {
        let mut acc = Accumulator::default();
        for p in progress.iter().filter(|p| p.shift_id == shift.id) {
            acc.meters += p.meters_drilled;
            if let Some(rate) = p.penetration_rate {
                acc.rate_sum += rate;
                acc.rate_count += 1;
            }
        }
        let material_list = materials
            .iter()
            .filter(|m| m.shift_id == shift.id)
            .map(|m| format!("{}: {} {}", m.name, m.quantity, m.unit))
            .join(", ");

        table.rows.push(vec![
            json!(shift.date.to_string()),
            json!(shift.rig),
            json!(shift.kind.to_string()),
            json!(shift.status.to_string()),
            json!(shift.supervisor),
            json!(acc.meters),
            acc.avg_rate(),
            json!(material_list),
        ]);
    }
    table
}
