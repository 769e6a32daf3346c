use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions that stop a load before anything is rendered.
///
/// An empty filter result is not listed here: it is a valid state that the
/// dashboard renders as "no rows".
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Required column '{0}' is missing from the spreadsheet")]
    MissingColumn(String),

    #[error("No value in column '{0}' could be read as a date")]
    DateCoercion(String),

    #[error("Unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Spreadsheet has no header row: {}", .0.display())]
    EmptySheet(PathBuf),

    #[error("Workbook read error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
