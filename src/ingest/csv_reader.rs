use log::debug;
use snafu::ResultExt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::error::*;
use super::{Cell, RawTable};

/// Read a CSV (or tab separated) export from disk
pub fn read_csv_file(path: &Path) -> IngestResult<RawTable> {
    let file = File::open(path).context(OpeningFileSnafu {
        path: path.display().to_string(),
    })?;
    let is_tsv = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("tsv"));
    read_delimited(file, if is_tsv { b'\t' } else { b',' })
}

/// Read comma separated data from any reader
pub fn read_csv<R: Read>(reader: R) -> IngestResult<RawTable> {
    read_delimited(reader, b',')
}

fn read_delimited<R: Read>(reader: R, delimiter: u8) -> IngestResult<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let mut grid: Vec<Vec<Cell>> = Vec::new();
    for record in rdr.records() {
        let record = record.context(CsvReadSnafu {})?;
        grid.push(record.iter().map(Cell::from_text).collect());
    }
    // Exports written by spreadsheet tools start with a UTF-8 BOM
    if let Some(Cell::Text(first)) = grid.first_mut().and_then(|r| r.first_mut()) {
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
        }
    }
    debug!("read_csv: {} line(s)", grid.len());
    RawTable::from_grid(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv_basic() {
        let data = "Sales Rep,Issued Appts,Overall Close %\nJane Smith,30,42%\nBob,,\n";
        let table = read_csv(data.as_bytes()).unwrap();
        assert_eq!(
            table.headers,
            vec!["Sales Rep", "Issued Appts", "Overall Close %"]
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.cell(0, 2), &Cell::Text("42%".to_string()));
        assert_eq!(table.cell(1, 1), &Cell::Empty);
    }

    #[test]
    fn test_read_csv_ragged_rows() {
        let data = "Sales Rep,Issued Appts\nJane\nBob,4,extra\n";
        let table = read_csv(data.as_bytes()).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.cell(0, 1), &Cell::Empty);
        assert_eq!(table.cell(1, 2), &Cell::Text("extra".to_string()));
    }

    #[test]
    fn test_read_csv_strips_bom() {
        let data = "\u{feff}Sales Rep,Issued Appts\nJane,1\n";
        let table = read_csv(data.as_bytes()).unwrap();
        assert_eq!(table.headers[0], "Sales Rep");
    }

    #[test]
    fn test_read_csv_empty_input() {
        assert!(matches!(
            read_csv("".as_bytes()),
            Err(IngestError::MissingHeader {})
        ));
    }

    #[test]
    fn test_read_csv_file_missing() {
        let err = read_csv_file(Path::new("/no/such/file.csv")).unwrap_err();
        assert!(matches!(err, IngestError::OpeningFile { .. }));
    }
}
