use calamine::{open_workbook_auto, Data, Reader};
use log::{debug, warn};
use snafu::{OptionExt, ResultExt};
use std::path::Path;

use super::error::*;
use super::{Cell, RawTable};

/// Read one worksheet of a workbook (xlsx, xls, xlsb or ods).
///
/// Without an explicit worksheet name the first sheet is used.
pub fn read_excel_file(path: &Path, worksheet: Option<&str>) -> IngestResult<RawTable> {
    let path_str = path.display().to_string();
    let mut workbook = open_workbook_auto(path).context(OpeningWorkbookSnafu {
        path: path_str.clone(),
    })?;

    let range = match worksheet {
        Some(name) => {
            let available = workbook.sheet_names();
            if !available.iter().any(|s| s == name) {
                return MissingWorksheetSnafu {
                    name,
                    path: path_str,
                    available,
                }
                .fail();
            }
            workbook
                .worksheet_range(name)
                .context(OpeningWorkbookSnafu { path: path_str })?
        }
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyWorkbookSnafu {
                path: path_str.clone(),
            })?
            .context(OpeningWorkbookSnafu { path: path_str })?,
    };

    debug!(
        "read_excel_file: {} worksheet {:?}: {:?}",
        path.display(),
        worksheet,
        range.get_size()
    );

    let grid: Vec<Vec<Cell>> = range
        .rows()
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();
    RawTable::from_grid(grid)
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::from_text(s),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::Empty => Cell::Empty,
        // Formula errors like #DIV/0! carry no value
        Data::Error(e) => {
            warn!("Ignoring spreadsheet error cell {:?}", e);
            Cell::Empty
        }
        other => Cell::from_text(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;

    #[test]
    fn test_convert_cell() {
        assert_eq!(convert_cell(&Data::Int(25)), Cell::Number(25.0));
        assert_eq!(convert_cell(&Data::Float(0.42)), Cell::Number(0.42));
        assert_eq!(
            convert_cell(&Data::String(" Jane Smith ".to_string())),
            Cell::Text("Jane Smith".to_string())
        );
        assert_eq!(convert_cell(&Data::Empty), Cell::Empty);
        assert_eq!(convert_cell(&Data::Error(CellErrorType::Div0)), Cell::Empty);
    }

    #[test]
    fn test_missing_workbook() {
        let err = read_excel_file(Path::new("/no/such/book.xlsx"), None).unwrap_err();
        assert!(matches!(err, IngestError::OpeningWorkbook { .. }));
    }
}
