//! Raw Table Loader Module
//! Reads lab exports (.xlsx/.xls) and datalogger files (.csv/.dat) into an
//! untyped row grid; the cleanup modules coerce types afterwards, since the
//! exports mix headers, unit rows and data in one sheet.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File type is not of the expected type: {0} (expected xlsx, xls, csv or dat)")]
    UnsupportedExtension(String),
    #[error("Failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("Worksheet not found: {0}")]
    MissingSheet(String),
    #[error("Failed to read delimited file: {0}")]
    Delimited(#[from] csv::Error),
}

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Excel,
    Delimited,
}

/// Rows of string cells, exactly as they appear in the file.
pub type RawGrid = Vec<Vec<String>>;

/// Classify a path by extension.
pub fn detect_kind(path: &Path) -> Result<FileKind, LoaderError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "xlsx" | "xls" => Ok(FileKind::Excel),
        "csv" | "dat" => Ok(FileKind::Delimited),
        _ => Err(LoaderError::UnsupportedExtension(
            path.display().to_string(),
        )),
    }
}

/// Load a named worksheet from an Excel workbook.
pub fn load_sheet(path: &Path, sheet: &str) -> Result<RawGrid, LoaderError> {
    expect_kind(path, FileKind::Excel)?;
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|_| LoaderError::MissingSheet(sheet.to_string()))?;
    Ok(range_to_grid(range.rows()))
}

/// Load a delimited (.csv/.dat) file. Rows may be ragged; logger exports
/// carry a vendor preamble line that the redox cleanup skips by content.
pub fn load_delimited(path: &Path) -> Result<RawGrid, LoaderError> {
    expect_kind(path, FileKind::Delimited)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut grid = RawGrid::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(|cell| cell.to_string()).collect());
    }
    Ok(grid)
}

/// Require the given file kind; the cleanup modules call this before
/// touching a path so a mismatched file fails with a typed error.
pub fn expect_kind(path: &Path, kind: FileKind) -> Result<(), LoaderError> {
    if detect_kind(path)? == kind {
        Ok(())
    } else {
        Err(LoaderError::UnsupportedExtension(
            path.display().to_string(),
        ))
    }
}

fn range_to_grid<'a>(rows: impl Iterator<Item = &'a [Data]>) -> RawGrid {
    rows.map(|row| row.iter().map(cell_to_string).collect())
        .collect()
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => {
            // Integers stored as floats print without a trailing ".0".
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                format!("{f}")
            }
        }
        Data::Int(i) => format!("{i}"),
        Data::Bool(b) => format!("{b}"),
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn detects_kind_from_extension() {
        assert_eq!(
            detect_kind(&PathBuf::from("round_T0.xlsx")).unwrap(),
            FileKind::Excel
        );
        assert_eq!(
            detect_kind(&PathBuf::from("logger.DAT")).unwrap(),
            FileKind::Delimited
        );
        assert_eq!(
            detect_kind(&PathBuf::from("samples.csv")).unwrap(),
            FileKind::Delimited
        );
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = detect_kind(&PathBuf::from("notes.txt")).unwrap_err();
        assert!(matches!(err, LoaderError::UnsupportedExtension(_)));
    }

    #[test]
    fn float_cells_render_like_spreadsheet_values() {
        assert_eq!(cell_to_string(&Data::Float(3.0)), "3");
        assert_eq!(cell_to_string(&Data::Float(0.25)), "0.25");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }
}
