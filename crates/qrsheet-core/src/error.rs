//! Error types for qrsheet core.

use thiserror::Error;

/// Errors that abort a qrsheet run.
#[derive(Error, Debug)]
pub enum QrSheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Spreadsheet error: {0}")]
    Xlsx(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Sheet has no header row")]
    EmptySheet,

    #[error("No columns selected")]
    NoColumnsSelected,

    #[error("Image error: {0}")]
    Image(String),
}

impl From<rust_xlsxwriter::XlsxError> for QrSheetError {
    fn from(e: rust_xlsxwriter::XlsxError) -> QrSheetError {
        QrSheetError::Xlsx(e.to_string())
    }
}

impl From<image::ImageError> for QrSheetError {
    fn from(e: image::ImageError) -> QrSheetError {
        QrSheetError::Image(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QrSheetError>;
