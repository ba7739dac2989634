use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum IngestError {
    #[snafu(display("Error opening workbook {path}"))]
    OpeningWorkbook {
        source: calamine::Error,
        path: String,
    },
    #[snafu(display("Workbook {path} has no worksheets"))]
    EmptyWorkbook { path: String },
    #[snafu(display("Worksheet '{name}' not found in {path} (available: {})", available.join(", ")))]
    MissingWorksheet {
        name: String,
        path: String,
        available: Vec<String>,
    },
    #[snafu(display("Error reading {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading CSV data"))]
    CsvRead { source: csv::Error },
    #[snafu(display("Error parsing sales data JSON in {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Input has no header row"))]
    MissingHeader {},
    #[snafu(display("Unsupported input format '{extension}' (expected xlsx, xls, ods, csv or json)"))]
    UnsupportedFormat { extension: String },
    #[snafu(display("Invalid input pattern '{pattern}'"))]
    InvalidPattern {
        source: glob::PatternError,
        pattern: String,
    },
    #[snafu(display("No file matches '{pattern}'"))]
    NoMatchingInput { pattern: String },
    #[snafu(display("Not a Google Sheets link: {url}"))]
    InvalidSheetUrl { url: String },
    #[snafu(display("Failed to download sheet from {url}"))]
    SheetDownload {
        source: reqwest::Error,
        url: String,
    },
    #[snafu(display(
        "Sheet {url} is not publicly viewable. Share it as 'Anyone with the link can view'"
    ))]
    SheetNotPublic { url: String },
    #[snafu(display("Missing required column(s): {}", missing.join(", ")))]
    MissingColumns { missing: Vec<String> },
    #[snafu(display("No valid sales data found ({rejected} row(s) rejected)"))]
    NoValidData { rejected: usize },
}

impl IngestError {
    /// Errors caused by the network rather than by the data itself
    pub fn is_network(&self) -> bool {
        matches!(self, IngestError::SheetDownload { .. })
    }
}

pub type IngestResult<T> = Result<T, IngestError>;
