use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::scoring::ScoringConfig;

/// Color theme for the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeChoice {
    Dark,
    Light,
    /// Pick dark or light from the terminal background
    #[default]
    Auto,
}

/// Contents of `~/.config/sales-rank/config.yaml`. Every field is optional;
/// command-line flags override the file.
///
/// Example YAML:
/// ```yaml
/// input: "~/exports/weekly-*.xlsx"
/// worksheet: Summary
/// min_appointments: 10
/// auto_reload: 10m
/// theme: auto
/// scoring:
///   capture_cap: 150
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Spreadsheet path or glob; the newest match is used
    #[serde(default)]
    pub input: Option<String>,

    /// Public Google Sheets link, takes precedence over `input`
    #[serde(default)]
    pub sheet_url: Option<String>,

    /// Worksheet name inside a workbook (default: first sheet)
    #[serde(default)]
    pub worksheet: Option<String>,

    /// Initial minimum-appointments filter (default: 10)
    #[serde(default)]
    pub min_appointments: Option<u32>,

    /// Reload interval for the dashboard, e.g. "10m" (default: off)
    #[serde(default)]
    pub auto_reload: Option<String>,

    #[serde(default)]
    pub theme: Option<ThemeChoice>,

    #[serde(default)]
    pub scoring: Option<ScoringConfig>,
}

impl Config {
    /// Parsed `auto_reload`; `None` when unset or unparseable
    pub fn auto_reload_interval(&self) -> Option<Duration> {
        self.auto_reload
            .as_deref()
            .and_then(|s| humantime::parse_duration(s.trim()).ok())
            .filter(|d| !d.is_zero())
    }

    pub fn effective_scoring(&self) -> ScoringConfig {
        self.scoring.clone().unwrap_or_default()
    }
}
