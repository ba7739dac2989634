use chrono::{DateTime, Local};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::model::UnitBucket;
use crate::normalize::RowRejection;
use crate::scoring::{BucketEntry, MatrixRow, RankedRep, Summary};

pub const NO_REPS_MESSAGE: &str = "No reps meet the minimum appointment criteria.";
pub const BUILDING_DATA_MESSAGE: &str = "Building Data";
pub const NO_BUCKET_DATA_MESSAGE: &str = "No reps with sufficient data in this category";
pub const MATRIX_CAPTION: &str = "Format: Close Rate / Capture Rate (Appointments)";

const NAME_WIDTH: usize = 22;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Score with one decimal. If incomplete is true, appends asterisk to
/// indicate that overall close or capture was missing.
pub fn format_score(score: f64, incomplete: bool) -> String {
    if incomplete {
        format!("{:.1}*", score)
    } else {
        format!("{:.1}", score)
    }
}

/// Medal for the podium, pin for everyone else
pub fn rank_badge(rank: usize) -> String {
    let emoji = match rank {
        1 => "🥇",
        2 => "🥈",
        3 => "🥉",
        _ => "📍",
    };
    format!("{} {}", emoji, rank)
}

/// Label for a minimum-appointments filter value
pub fn min_appts_label(min_appts: u32) -> String {
    if min_appts == 0 {
        "All Reps".to_string()
    } else {
        format!("{}+ Appointments", min_appts)
    }
}

pub fn format_percent(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}%", decimals, v),
        None => "—".to_string(),
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
pub fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Pad to `width` characters (char count, not bytes)
fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - len))
    }
}

/// Name column width that still fits the terminal next to `fixed_width`
fn name_width(fixed_width: usize) -> usize {
    match get_terminal_width() {
        Some(width) if width > fixed_width + 10 => (width - fixed_width).min(NAME_WIDTH),
        Some(_) => 10,
        // No terminal (pipe), keep the full column
        None => NAME_WIDTH,
    }
}

fn heading(text: &str, use_colors: bool) -> String {
    if use_colors {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

/// Rankings table: Rank, Sales Rep, Score, Overall Close %,
/// Avg Category Close %, Avg Capture %, Total Appts, Active Categories
pub fn format_rankings_table(ranked: &[RankedRep], use_colors: bool) -> String {
    let name_w = name_width(8 + 8 + 16 + 21 + 14 + 12 + 17 + 14);
    render_rankings(ranked, name_w, use_colors)
}

fn render_rankings(ranked: &[RankedRep], name_w: usize, use_colors: bool) -> String {
    if ranked.is_empty() {
        return NO_REPS_MESSAGE.to_string();
    }

    let header = format!(
        "{:<6}  {}  {:>7}  {:>15}  {:>20}  {:>13}  {:>11}  {:>17}",
        "Rank",
        pad("Sales Rep", name_w),
        "Score",
        "Overall Close %",
        "Avg Category Close %",
        "Avg Capture %",
        "Total Appts",
        "Active Categories"
    );

    let mut lines = vec![heading(&header, use_colors)];
    for r in ranked {
        let badge = rank_badge(r.rank);
        let name = pad(&truncate_name(&r.rep.name, name_w), name_w);
        let score = format!("{:>7}", format_score(r.result.score, r.result.incomplete));
        let rest = format!(
            "{:>15}  {:>20}  {:>13}  {:>11}  {:>17}",
            format_percent(r.rep.overall_close, 1),
            format!("{:.1}%", r.result.avg_category_close),
            format!("{:.0}%", r.result.avg_category_capture),
            r.rep.total_appts,
            r.result.valid_categories
        );
        // the badge emoji renders two columns wide
        let badge = pad(&badge, 5);
        if use_colors {
            lines.push(format!(
                "{}  {}  {}  {}",
                badge,
                name,
                score.bold(),
                rest
            ));
        } else {
            lines.push(format!("{}  {}  {}  {}", badge, name, score, rest));
        }
    }
    lines.join("\n")
}

/// Leader cards for every bucket, then each bucket's table
pub fn format_leaders(
    leaders: &[(UnitBucket, Option<BucketEntry>)],
    tables: &[(UnitBucket, Vec<BucketEntry>)],
    leader_min_appts: u32,
    use_colors: bool,
) -> String {
    let mut out = Vec::new();
    out.push(heading("Category Leaders", use_colors));
    out.push(String::new());

    for (bucket, leader) in leaders {
        out.push(heading(bucket.display_name(), use_colors));
        match leader {
            Some(l) => {
                let name = if use_colors {
                    l.name.green().bold().to_string()
                } else {
                    l.name.clone()
                };
                out.push(format!("  🏆 {}", name));
                out.push(format!(
                    "  📊 {} Close Rate",
                    format_percent(l.stats.close_rate, 1)
                ));
                out.push(format!(
                    "  📈 {:.0}% Capture Rate",
                    l.stats.capture_rate.unwrap_or(0.0)
                ));
                out.push(format!("  📅 {} Appointments", l.stats.appointments));
            }
            None => {
                let msg = if use_colors {
                    BUILDING_DATA_MESSAGE.yellow().to_string()
                } else {
                    BUILDING_DATA_MESSAGE.to_string()
                };
                out.push(format!("  {}", msg));
                out.push(format!(
                    "  Need {}+ appointments for reliable ranking",
                    leader_min_appts
                ));
            }
        }
    }

    for (bucket, entries) in tables {
        out.push(String::new());
        out.push(heading(
            &format!("📊 {} - Detailed Rankings", bucket.display_name()),
            use_colors,
        ));
        out.push(format_bucket_table(entries));
    }
    out.join("\n")
}

/// One bucket's table: Rank, Sales Rep, Close Rate, Capture Rate, Appointments
pub fn format_bucket_table(entries: &[BucketEntry]) -> String {
    if entries.is_empty() {
        return format!("  {}", NO_BUCKET_DATA_MESSAGE);
    }
    let mut lines = vec![format!(
        "  {:>4}  {}  {:>10}  {:>12}  {:>12}",
        "Rank",
        pad("Sales Rep", NAME_WIDTH),
        "Close Rate",
        "Capture Rate",
        "Appointments"
    )];
    for e in entries {
        lines.push(format!(
            "  {:>4}  {}  {:>10}  {:>12}  {:>12}",
            e.rank,
            pad(&truncate_name(&e.name, NAME_WIDTH), NAME_WIDTH),
            format_percent(e.stats.close_rate, 1),
            format!("{:.0}%", e.stats.capture_rate.unwrap_or(0.0)),
            e.stats.appointments
        ));
    }
    lines.join("\n")
}

/// Performance matrix: one row per rep, one cell per bucket
pub fn format_matrix(rows: &[MatrixRow], use_colors: bool) -> String {
    let mut out = vec![
        heading("Complete Performance Matrix", use_colors),
        MATRIX_CAPTION.to_string(),
        String::new(),
    ];
    if rows.is_empty() {
        out.push(NO_REPS_MESSAGE.to_string());
        return out.join("\n");
    }

    let cell_w = 22;
    let mut header = format!("{}  {:>13}", pad("Sales Rep", NAME_WIDTH), "Overall Score");
    for bucket in UnitBucket::ALL {
        header.push_str(&format!("  {}", pad(&format!("{} Units", bucket), cell_w)));
    }
    header.push_str(&format!("  {:>11}", "Total Appts"));
    out.push(heading(&header, use_colors));

    for row in rows {
        let mut line = format!(
            "{}  {:>13}",
            pad(&truncate_name(&row.name, NAME_WIDTH), NAME_WIDTH),
            format_score(row.score, row.incomplete)
        );
        for (_, cell) in &row.cells {
            line.push_str(&format!("  {}", pad(cell, cell_w)));
        }
        line.push_str(&format!("  {:>11}", row.total_appts));
        out.push(line);
    }
    out.join("\n")
}

/// Quick stats block plus footer
pub fn format_summary(
    summary: &Summary,
    source_label: &str,
    loaded_at: DateTime<Local>,
    use_colors: bool,
) -> String {
    let top = match &summary.top_performer {
        Some(t) => format!("{} (Score: {:.1})", t.first_name, t.score),
        None => "N/A".to_string(),
    };
    let lines = [
        heading("Sales Rep Performance Rankings", use_colors),
        String::new(),
        format!("👥 Total Reps:        {}", summary.total_reps),
        format!("🎯 Avg Close Rate:    {:.1}%", summary.avg_close),
        format!("📈 Avg Capture Rate:  {:.1}%", summary.avg_capture),
        format!("🏆 Top Performer:     {}", top),
        String::new(),
        format_footer(source_label, loaded_at),
    ];
    lines.join("\n")
}

pub fn format_footer(source_label: &str, loaded_at: DateTime<Local>) -> String {
    format!(
        "Data Source: {} | Last Updated: {}",
        source_label,
        format_timestamp(loaded_at)
    )
}

pub fn format_timestamp(at: DateTime<Local>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// Rejected rows, one per line
pub fn format_rejections(rejections: &[RowRejection], use_colors: bool) -> String {
    let title = format!("{} row(s) rejected:", rejections.len());
    let title = if use_colors {
        title.yellow().to_string()
    } else {
        title
    };
    std::iter::once(title)
        .chain(rejections.iter().map(|r| format!("  {}", r)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format rankings as tab-separated values for scripting
/// Columns: rank, name, score, overall close, avg category close,
/// avg capture, total appts, active categories (no headers, no colors)
pub fn format_tsv(ranked: &[RankedRep]) -> String {
    ranked
        .iter()
        .map(|r| {
            format!(
                "{}\t{}\t{:.2}\t{}\t{:.2}\t{:.2}\t{}\t{}",
                r.rank,
                r.rep.name,
                r.result.score,
                r.rep
                    .overall_close
                    .map(|c| format!("{:.2}", c))
                    .unwrap_or_default(),
                r.result.avg_category_close,
                r.result.avg_category_capture,
                r.rep.total_appts,
                r.result.valid_categories
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonRanking<'a> {
    rank: usize,
    name: &'a str,
    score: f64,
    incomplete: bool,
    overall_close: Option<f64>,
    overall_capture: Option<f64>,
    avg_category_close: f64,
    avg_category_capture: f64,
    total_appts: u32,
    valid_categories: usize,
}

/// Rankings as a pretty-printed JSON array
pub fn format_json(ranked: &[RankedRep]) -> serde_json::Result<String> {
    let rows: Vec<JsonRanking> = ranked
        .iter()
        .map(|r| JsonRanking {
            rank: r.rank,
            name: &r.rep.name,
            score: r.result.score,
            incomplete: r.result.incomplete,
            overall_close: r.rep.overall_close,
            overall_capture: r.rep.overall_capture,
            avg_category_close: r.result.avg_category_close,
            avg_category_capture: r.result.avg_category_capture,
            total_appts: r.rep.total_appts,
            valid_categories: r.result.valid_categories,
        })
        .collect();
    serde_json::to_string_pretty(&rows)
}
