pub mod formatter;

pub use formatter::{
    format_bucket_table, format_footer, format_json, format_leaders, format_matrix,
    format_percent, format_rankings_table, format_rejections, format_score, format_summary,
    format_timestamp, format_tsv, min_appts_label, rank_badge, should_use_colors, truncate_name,
};
