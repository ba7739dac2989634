//! Reading raw sales tables from spreadsheets, CSV exports, JSON snapshots
//! and public Google Sheets.

pub mod csv_reader;
pub mod error;
pub mod excel;
pub mod gsheet;
pub mod json;

pub use error::{IngestError, IngestResult};

use error::*;

use log::{debug, info};
use snafu::{OptionExt, ResultExt};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::model::SalesRep;

/// A single cell as read from any tabular source
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Build a cell from raw text, trimming whitespace. Numbers are kept as
    /// text here; the normalizer decides how to interpret them.
    pub fn from_text(s: &str) -> Cell {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Text rendering used for names and headers
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }
}

/// Header row plus data rows, before any interpretation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Split a grid of cells on its first row. Trailing fully-empty rows
    /// are dropped.
    pub fn from_grid(mut grid: Vec<Vec<Cell>>) -> IngestResult<RawTable> {
        if grid.is_empty() {
            return MissingHeaderSnafu {}.fail();
        }
        let headers: Vec<String> = grid.remove(0).iter().map(|c| c.as_text()).collect();
        if headers.iter().all(|h| h.is_empty()) {
            return MissingHeaderSnafu {}.fail();
        }
        while grid.last().is_some_and(|r| r.iter().all(Cell::is_empty)) {
            grid.pop();
        }
        Ok(RawTable {
            headers,
            rows: grid,
        })
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&Cell::Empty)
    }
}

/// What the raw input looked like once read
#[derive(Debug, Clone)]
pub enum Loaded {
    /// A table that still has to be normalized
    Table(RawTable),
    /// Already-structured reps (JSON snapshot or built-in sample)
    Reps(Vec<SalesRep>),
}

/// Where dashboard data comes from
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    File {
        path: PathBuf,
        worksheet: Option<String>,
    },
    Sheet {
        url: String,
    },
    Sample,
}

impl DataSource {
    /// Pick a source from CLI/config values. A sheet URL wins over a file
    /// input; with neither, the built-in sample data is used. Sheet links are
    /// checked here so a bad link never reaches the network.
    pub fn from_args(
        input: Option<&str>,
        sheet_url: Option<&str>,
        worksheet: Option<&str>,
    ) -> IngestResult<DataSource> {
        if let Some(url) = sheet_url.filter(|u| !u.trim().is_empty()) {
            gsheet::sheet_export_url(url)?;
            return Ok(DataSource::Sheet {
                url: url.trim().to_string(),
            });
        }
        match input.filter(|i| !i.trim().is_empty()) {
            Some(pattern) => Ok(DataSource::File {
                path: resolve_input(pattern)?,
                worksheet: worksheet.map(str::to_string),
            }),
            None => Ok(DataSource::Sample),
        }
    }

    /// Short description for status bars and report footers
    pub fn label(&self) -> String {
        match self {
            DataSource::File { path, worksheet } => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                match worksheet {
                    Some(ws) => format!("{} [{}]", name, ws),
                    None => name,
                }
            }
            DataSource::Sheet { .. } => "Google Sheet".to_string(),
            DataSource::Sample => "Sample data".to_string(),
        }
    }

    pub fn sheet_url(&self) -> Option<&str> {
        match self {
            DataSource::Sheet { url } => Some(url),
            _ => None,
        }
    }

    /// Read the source without interpreting it
    pub async fn read(&self) -> IngestResult<Loaded> {
        match self {
            DataSource::File { path, worksheet } => read_path(path, worksheet.as_deref()),
            DataSource::Sheet { url } => {
                let body = gsheet::fetch_sheet_csv(url).await?;
                Ok(Loaded::Table(csv_reader::read_csv(body.as_bytes())?))
            }
            DataSource::Sample => Ok(Loaded::Reps(crate::sample::sample_reps())),
        }
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_home(pattern: &str) -> String {
    let rest = match pattern.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return pattern.to_string(),
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest).to_string_lossy().to_string(),
        None => pattern.to_string(),
    }
}

/// Resolve a path or glob pattern to a single file. With several matches the
/// most recently modified one wins, so `exports/*.xlsx` always picks up the
/// latest weekly export.
pub fn resolve_input(pattern: &str) -> IngestResult<PathBuf> {
    let expanded = expand_home(pattern);
    let direct = Path::new(&expanded);
    if direct.is_file() {
        return Ok(direct.to_path_buf());
    }

    let paths = glob::glob(&expanded).context(InvalidPatternSnafu { pattern })?;
    let newest = paths
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .map(|p| {
            let modified = std::fs::metadata(&p)
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, p)
        })
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(&a.1)))
        .map(|(_, p)| p)
        .context(NoMatchingInputSnafu { pattern })?;

    debug!("resolve_input: {} -> {}", pattern, newest.display());
    Ok(newest)
}

/// Read a local file, dispatching on its extension
pub fn read_path(path: &Path, worksheet: Option<&str>) -> IngestResult<Loaded> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    info!("Reading {} ({})", path.display(), extension);
    match extension.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => {
            Ok(Loaded::Table(excel::read_excel_file(path, worksheet)?))
        }
        "csv" | "tsv" | "txt" => Ok(Loaded::Table(csv_reader::read_csv_file(path)?)),
        "json" => Ok(Loaded::Reps(json::read_json_file(path)?)),
        _ => UnsupportedFormatSnafu { extension }.fail(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::time::Duration;

    #[test]
    fn test_cell_from_text() {
        assert_eq!(Cell::from_text("  "), Cell::Empty);
        assert_eq!(Cell::from_text(" 42% "), Cell::Text("42%".to_string()));
    }

    #[test]
    fn test_cell_as_text() {
        assert_eq!(Cell::Number(25.0).as_text(), "25");
        assert_eq!(Cell::Number(0.5).as_text(), "0.5");
        assert_eq!(Cell::Empty.as_text(), "");
    }

    #[test]
    fn test_from_grid_trims_trailing_blank_rows() {
        let grid = vec![
            vec![Cell::from_text("Sales Rep"), Cell::from_text("Issued Appts")],
            vec![Cell::from_text("Jane"), Cell::Number(3.0)],
            vec![Cell::Empty, Cell::Empty],
        ];
        let table = RawTable::from_grid(grid).unwrap();
        assert_eq!(table.headers, vec!["Sales Rep", "Issued Appts"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.cell(0, 1), &Cell::Number(3.0));
        assert_eq!(table.cell(5, 5), &Cell::Empty);
    }

    #[test]
    fn test_from_grid_requires_header() {
        assert!(matches!(
            RawTable::from_grid(vec![]),
            Err(IngestError::MissingHeader {})
        ));
        assert!(matches!(
            RawTable::from_grid(vec![vec![Cell::Empty]]),
            Err(IngestError::MissingHeader {})
        ));
    }

    #[test]
    fn test_source_from_args() {
        assert_eq!(
            DataSource::from_args(None, None, None).unwrap(),
            DataSource::Sample
        );
        let sheet = DataSource::from_args(
            Some("x.csv"),
            Some("https://docs.google.com/spreadsheets/d/1AbC/edit"),
            None,
        )
        .unwrap();
        assert!(matches!(sheet, DataSource::Sheet { .. }));
        assert_eq!(sheet.label(), "Google Sheet");
    }

    #[test]
    fn test_source_from_args_rejects_foreign_sheet_host() {
        let err = DataSource::from_args(
            None,
            Some("https://example.com/spreadsheets/d/abc/edit"),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::InvalidSheetUrl { .. }));
        assert!(!err.is_network());
    }

    #[test]
    fn test_resolve_input_no_match() {
        let err = resolve_input("/definitely/not/here/*.xlsx").unwrap_err();
        assert!(matches!(err, IngestError::NoMatchingInput { .. }));
    }

    fn touch_at(path: &Path, secs: u64) {
        std::fs::write(path, "Sales Rep\n").unwrap();
        std::fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn test_resolve_input_direct_and_glob() {
        let dir = env::temp_dir().join("sales_rank_test_resolve");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("week1.csv");
        std::fs::write(&file, "Sales Rep\n").unwrap();

        assert_eq!(resolve_input(file.to_str().unwrap()).unwrap(), file);
        let pattern = format!("{}/*.csv", dir.display());
        assert_eq!(resolve_input(&pattern).unwrap(), file);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_resolve_input_newest_match_wins() {
        let dir = env::temp_dir().join("sales_rank_test_newest");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        // The name that sorts last is the older export
        let newer = dir.join("week1.csv");
        let older = dir.join("week2.csv");
        touch_at(&older, 1_700_000_000);
        touch_at(&newer, 1_700_600_000);

        let pattern = format!("{}/week*.csv", dir.display());
        assert_eq!(resolve_input(&pattern).unwrap(), newer);

        touch_at(&older, 1_701_000_000);
        assert_eq!(resolve_input(&pattern).unwrap(), older);

        // Equal mtimes fall back to the first path by name
        touch_at(&newer, 1_701_000_000);
        assert_eq!(resolve_input(&pattern).unwrap(), newer);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_expand_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_home("~/exports/weekly-*.xlsx"),
                home.join("exports/weekly-*.xlsx").to_string_lossy()
            );
            assert_eq!(expand_home("~"), home.join("").to_string_lossy());
        }
        assert_eq!(expand_home("exports/*.xlsx"), "exports/*.xlsx");
        assert_eq!(expand_home("~other/x.csv"), "~other/x.csv");
    }

    #[test]
    fn test_resolve_input_expands_home() {
        let err = resolve_input("~/sales_rank_no_such_dir/*.xlsx").unwrap_err();
        match err {
            IngestError::NoMatchingInput { pattern } => {
                assert_eq!(pattern, "~/sales_rank_no_such_dir/*.xlsx")
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_read_path_unsupported() {
        let err = read_path(Path::new("report.pdf"), None).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_file_label_includes_worksheet() {
        let source = DataSource::File {
            path: PathBuf::from("/tmp/exports/week12.xlsx"),
            worksheet: Some("Summary".to_string()),
        };
        assert_eq!(source.label(), "week12.xlsx [Summary]");
    }
}
