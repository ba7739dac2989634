use chrono::{DateTime, Local};
use log::{info, warn};

use crate::ingest::{DataSource, IngestResult, Loaded};
use crate::model::SalesRep;
use crate::normalize::{normalize_table, Layout, RowRejection};
use crate::scoring::{rank_reps, RankedRep, ScoringConfig};

/// Everything the views need from one load of the data source
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub reps: Vec<SalesRep>,
    /// All reps ranked, before the minimum-appointments filter
    pub ranked: Vec<RankedRep>,
    pub rejections: Vec<RowRejection>,
    /// `None` when the data did not come from a table
    pub layout: Option<Layout>,
    pub source_label: String,
    pub loaded_at: DateTime<Local>,
}

impl Dashboard {
    pub fn new(
        reps: Vec<SalesRep>,
        rejections: Vec<RowRejection>,
        layout: Option<Layout>,
        source_label: String,
        scoring: &ScoringConfig,
    ) -> Self {
        let ranked = rank_reps(&reps, scoring);
        Self {
            reps,
            ranked,
            rejections,
            layout,
            source_label,
            loaded_at: Local::now(),
        }
    }
}

/// Read the source, normalize it and rank every rep.
///
/// This function is called from main.rs for the initial load and from the
/// TUI event loop for manual/auto reload.
pub async fn load_and_score(source: &DataSource, scoring: &ScoringConfig) -> IngestResult<Dashboard> {
    let (reps, rejections, layout) = match source.read().await? {
        Loaded::Table(table) => {
            info!(
                "Read {} row(s) and {} column(s)",
                table.rows.len(),
                table.headers.len()
            );
            let outcome = normalize_table(&table)?;
            (outcome.reps, outcome.rejections, Some(outcome.layout))
        }
        Loaded::Reps(reps) => (reps, Vec::new(), None),
    };

    if !rejections.is_empty() {
        warn!("{} row(s) rejected", rejections.len());
    }
    info!("Loaded {} sales rep(s) from {}", reps.len(), source.label());

    Ok(Dashboard::new(
        reps,
        rejections,
        layout,
        source.label(),
        scoring,
    ))
}
