//! Turning a raw table into validated `SalesRep` records.

pub mod cells;
pub mod columns;

pub use columns::Layout;

use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::ingest::error::{MissingColumnsSnafu, NoValidDataSnafu};
use crate::ingest::{Cell, IngestResult, RawTable};
use crate::model::{CategoryStats, SalesRep, UnitBucket};
use cells::{
    detect_scale, parse_close_rate, parse_count, parse_percentage, PercentScale, RateKind,
};
use columns::{resolve_columns, ColumnMap, APPOINTMENTS_COLUMN, CAPTURE_COLUMN, CLOSE_COLUMN};

/// A data row that could not be used, with a message the user can act on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowRejection {
    /// 1-based line in the source, counting the header as line 1
    pub row: usize,
    pub rep: String,
    pub column: String,
    pub reason: String,
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {} ({}): column '{}': {}",
            self.row, self.rep, self.column, self.reason
        )
    }
}

#[derive(Debug, Clone)]
pub struct NormalizeOutcome {
    pub reps: Vec<SalesRep>,
    pub rejections: Vec<RowRejection>,
    pub layout: Layout,
}

/// Percent scale chosen for every rate column
struct Scales {
    overall_close: PercentScale,
    overall_capture: PercentScale,
    buckets: BTreeMap<UnitBucket, (PercentScale, PercentScale)>,
}

fn column_scale(table: &RawTable, col: Option<usize>, kind: RateKind) -> PercentScale {
    match col {
        Some(c) => detect_scale((0..table.rows.len()).map(|r| table.cell(r, c)), kind),
        None => PercentScale::Percent,
    }
}

impl Scales {
    fn detect(table: &RawTable, map: &ColumnMap) -> Scales {
        let buckets = UnitBucket::ALL
            .into_iter()
            .map(|b| {
                let cols = map.bucket(b);
                (
                    b,
                    (
                        column_scale(table, cols.close, RateKind::Close),
                        column_scale(table, cols.capture, RateKind::Capture),
                    ),
                )
            })
            .collect();
        Scales {
            overall_close: column_scale(table, map.overall_close, RateKind::Close),
            overall_capture: column_scale(table, map.overall_capture, RateKind::Capture),
            buckets,
        }
    }
}

/// Validate and convert every data row of `table`.
///
/// Fails when required columns are missing or when no row survives; single
/// bad rows are collected as rejections instead.
pub fn normalize_table(table: &RawTable) -> IngestResult<NormalizeOutcome> {
    let (map, layout) = resolve_columns(&table.headers);
    debug!("normalize_table: layout {:?}, columns {:?}", layout, map);

    let missing = map.missing_required();
    if !missing.is_empty() {
        return MissingColumnsSnafu { missing }.fail();
    }
    for bucket in UnitBucket::ALL {
        if !map.bucket(bucket).is_complete() {
            warn!(
                "Columns for the {} bucket are incomplete; it will show no data",
                bucket
            );
        }
    }

    let scales = Scales::detect(table, &map);
    let mut reps = Vec::new();
    let mut rejections = Vec::new();

    for (idx, row) in table.rows.iter().enumerate() {
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        let line = idx + 2;
        let name = map
            .rep
            .map(|c| table.cell(idx, c).as_text())
            .unwrap_or_default();
        let name = name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("nan") {
            warn!("Skipping row {}: no sales rep name", line);
            continue;
        }

        match convert_row(table, idx, name, &map, &scales) {
            Ok(rep) => reps.push(rep),
            Err((column, reason)) => {
                let rejection = RowRejection {
                    row: line,
                    rep: name.to_string(),
                    column,
                    reason,
                };
                warn!("Rejected {}", rejection);
                rejections.push(rejection);
            }
        }
    }

    if reps.is_empty() {
        return NoValidDataSnafu {
            rejected: rejections.len(),
        }
        .fail();
    }
    Ok(NormalizeOutcome {
        reps,
        rejections,
        layout,
    })
}

/// Convert one row; `Err` names the offending column and the reason
fn convert_row(
    table: &RawTable,
    idx: usize,
    name: &str,
    map: &ColumnMap,
    scales: &Scales,
) -> Result<SalesRep, (String, String)> {
    let cell = |col: Option<usize>| col.map_or(&Cell::Empty, |c| table.cell(idx, c));
    let header = |col: Option<usize>, fallback: &str| {
        col.and_then(|c| table.headers.get(c))
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    };

    let mut rep = SalesRep::new(name);
    rep.total_appts = parse_count(cell(map.appointments))
        .map_err(|r| (header(map.appointments, APPOINTMENTS_COLUMN), r))?;
    rep.overall_close = parse_close_rate(cell(map.overall_close), scales.overall_close)
        .map_err(|r| (header(map.overall_close, CLOSE_COLUMN), r))?;
    rep.overall_capture = parse_percentage(cell(map.overall_capture), scales.overall_capture)
        .map_err(|r| (header(map.overall_capture, CAPTURE_COLUMN), r))?;

    for bucket in UnitBucket::ALL {
        let cols = map.bucket(bucket);
        let (close_scale, capture_scale) = scales
            .buckets
            .get(&bucket)
            .copied()
            .unwrap_or((PercentScale::Percent, PercentScale::Percent));
        let stats = CategoryStats {
            appointments: parse_count(cell(cols.appointments))
                .map_err(|r| (header(cols.appointments, &bucket.appointments_column()), r))?,
            close_rate: parse_close_rate(cell(cols.close), close_scale)
                .map_err(|r| (header(cols.close, &bucket.close_column()), r))?,
            capture_rate: parse_percentage(cell(cols.capture), capture_scale)
                .map_err(|r| (header(cols.capture, &bucket.capture_column()), r))?,
        };
        rep.categories.insert(bucket, stats);
    }
    Ok(rep)
}

/// Summary of how much usable data a load produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataStats {
    pub total_reps: usize,
    pub reps_with_appointments: usize,
    pub avg_appointments: f64,
    /// Reps with appointments and a close rate, per bucket
    pub categories_with_data: BTreeMap<UnitBucket, usize>,
}

pub fn data_stats(reps: &[SalesRep]) -> DataStats {
    let total_reps = reps.len();
    let avg_appointments = if total_reps == 0 {
        0.0
    } else {
        reps.iter().map(|r| r.total_appts as f64).sum::<f64>() / total_reps as f64
    };
    let categories_with_data = UnitBucket::ALL
        .into_iter()
        .map(|b| {
            let count = reps
                .iter()
                .filter(|r| {
                    let c = r.category(b);
                    c.appointments > 0 && c.has_close_rate()
                })
                .count();
            (b, count)
        })
        .collect();
    DataStats {
        total_reps,
        reps_with_appointments: reps.iter().filter(|r| r.total_appts > 0).count(),
        avg_appointments,
        categories_with_data,
    }
}
