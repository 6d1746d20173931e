use super::Sheet;
use crate::batch::BatchOutcome;
use crate::error::Result;
use crate::storage::{self, EmbedOptions};
use std::path::{Path, PathBuf};

impl Sheet {
    /// Load a sheet from an `.xlsx`/`.xlsm` or `.csv` file.
    /// For workbooks, `sheet_name` picks the sheet; the first sheet otherwise.
    pub fn open(path: &Path, sheet_name: Option<&str>) -> Result<Sheet> {
        let sheet = storage::read_sheet(path, sheet_name)?;
        log::info!(
            "loaded sheet '{}' from {}: {} rows, {} columns",
            sheet.name,
            path.display(),
            sheet.row_count(),
            sheet.column_count()
        );
        Ok(sheet)
    }

    /// Write this sheet plus the QR columns. The format follows the output
    /// extension (`.csv` or `.xlsx`). Returns the path written.
    pub fn save_with_qr(
        &self,
        path: &Path,
        outcome: &BatchOutcome,
        images: &[(usize, PathBuf)],
        options: &EmbedOptions,
    ) -> Result<PathBuf> {
        if storage::is_csv(path) {
            storage::write_csv(path, self, outcome, images, options)?;
        } else {
            storage::write_xlsx(path, self, outcome, images, options)?;
        }
        log::info!("wrote {}", path.display());
        Ok(path.to_path_buf())
    }
}
