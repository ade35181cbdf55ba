//! Data module - spreadsheet ingestion and cleanup

mod lab;
mod loader;
mod redox;

pub use lab::{extract_contaminants, write_dataframe_csv, LabError, LabRound};
pub use loader::{detect_kind, load_delimited, load_sheet, FileKind, LoaderError, RawGrid};
pub use redox::{clean_logger_export, clean_logger_grid, RedoxData, RedoxError, TimeTable};
