//! The `convert` command: turn a weekly export into a JSON snapshot the
//! dashboard can load directly.

use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::path::Path;

use crate::ingest::json::reps_to_json;
use crate::model::SalesRep;
use crate::normalize::DataStats;

/// Longest JSON printed to the terminal when no output file is given
pub const PREVIEW_CHARS: usize = 500;

/// Save the snapshot atomically so a dashboard reading the same file never
/// sees a partial write
pub fn save_json_file(path: &Path, reps: &[SalesRep]) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, reps).context("Failed to serialize sales data")?;

    file.commit()
        .with_context(|| format!("Failed to save {}", path.display()))?;

    Ok(())
}

/// JSON for terminal output, cut to `limit` characters with a trailing `...`
pub fn json_preview(reps: &[SalesRep], limit: usize) -> Result<String> {
    let json = reps_to_json(reps).context("Failed to serialize sales data")?;
    if json.chars().count() <= limit {
        return Ok(json);
    }
    let mut cut: String = json.chars().take(limit).collect();
    cut.push_str("...");
    Ok(cut)
}

pub fn format_data_stats(stats: &DataStats) -> String {
    let mut lines = vec![
        format!("Total reps: {}", stats.total_reps),
        format!("Reps with appointments: {}", stats.reps_with_appointments),
        format!("Average appointments: {:.1}", stats.avg_appointments),
        "Reps with data per category:".to_string(),
    ];
    for (bucket, count) in &stats.categories_with_data {
        lines.push(format!("  {}: {}", bucket.display_name(), count));
    }
    lines.join("\n")
}
