use super::config::ScoringConfig;
use super::engine::RankedRep;
use crate::model::{CategoryStats, UnitBucket};

pub const EMPTY_CELL: &str = "—";

/// One row of the rep x bucket performance matrix
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixRow {
    pub name: String,
    pub score: f64,
    pub incomplete: bool,
    pub cells: Vec<(UnitBucket, String)>,
    pub total_appts: u32,
}

/// `"<close>% / <capture>% (<appts>)"`, or a dash when the bucket has too
/// few appointments or no close rate
pub fn matrix_cell(stats: &CategoryStats, min_appts: u32) -> String {
    match stats.close_rate {
        Some(close) if stats.appointments >= min_appts => format!(
            "{:.1}% / {:.0}% ({})",
            close,
            stats.capture_rate.unwrap_or(0.0),
            stats.appointments
        ),
        _ => EMPTY_CELL.to_string(),
    }
}

pub fn matrix_rows(ranked: &[RankedRep], config: &ScoringConfig) -> Vec<MatrixRow> {
    let min_appts = config.min_category_appointments();
    ranked
        .iter()
        .map(|r| MatrixRow {
            name: r.rep.name.clone(),
            score: r.result.score,
            incomplete: r.result.incomplete,
            cells: UnitBucket::ALL
                .into_iter()
                .map(|b| (b, matrix_cell(&r.rep.category(b), min_appts)))
                .collect(),
            total_appts: r.rep.total_appts,
        })
        .collect()
}
