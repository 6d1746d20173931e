//! Storage adapters for spreadsheet input and QR output.

mod csv;
mod images;
mod writer;
mod xlsx;

pub use csv::{parse_csv_content, read_csv, write_csv};
pub use images::{image_file_name, write_images};
pub use writer::{EmbedOptions, pixels_for_mm, write_xlsx};
pub use xlsx::read_xlsx;

use crate::document::Sheet;
use crate::error::{QrSheetError, Result};
use std::path::Path;

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// True for paths ending in `.csv`.
pub fn is_csv(path: &Path) -> bool {
    extension(path) == "csv"
}

/// Read a sheet, choosing the reader by file extension.
pub fn read_sheet(path: &Path, sheet_name: Option<&str>) -> Result<Sheet> {
    match extension(path).as_str() {
        "csv" => {
            if let Some(name) = sheet_name {
                log::warn!("ignoring sheet '{}' for CSV input {}", name, path.display());
            }
            read_csv(path)
        }
        "xlsx" | "xlsm" => read_xlsx(path, sheet_name),
        other => Err(QrSheetError::Xlsx(format!(
            "unsupported input format '{}' for {} (expected .xlsx, .xlsm or .csv)",
            other,
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_csv() {
        assert!(is_csv(Path::new("out.CSV")));
        assert!(!is_csv(Path::new("out.xlsx")));
        assert!(!is_csv(Path::new("out")));
    }

    #[test]
    fn test_read_sheet_rejects_unknown_extension() {
        let result = read_sheet(Path::new("input.ods"), None);
        assert!(matches!(result, Err(QrSheetError::Xlsx(msg)) if msg.contains(".ods") || msg.contains("'ods'")));
    }

    #[test]
    fn test_read_sheet_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.csv");
        std::fs::write(&path, "Name,Age\nAlice,30\n").unwrap();
        let sheet = read_sheet(&path, None).unwrap();
        assert_eq!(sheet.name, "people");
        assert_eq!(sheet.row_count(), 1);
    }

    #[test]
    fn test_read_sheet_missing_csv_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_sheet(&dir.path().join("missing.csv"), None);
        assert!(matches!(result, Err(QrSheetError::Io(_))));
    }
}
