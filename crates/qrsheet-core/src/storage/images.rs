//! PNG export of encoded rows

use crate::batch::BatchOutcome;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// File name used for a row's image.
pub fn image_file_name(row_index: usize) -> String {
    format!("qr_{}.png", row_index)
}

/// Write one PNG per encoded row into `dir` (created if missing).
/// Returns `(row_index, path)` pairs in row order.
pub fn write_images(dir: &Path, outcome: &BatchOutcome, box_size: u32) -> Result<Vec<(usize, PathBuf)>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(outcome.records.len());
    for record in &outcome.records {
        let path = dir.join(image_file_name(record.row_index));
        std::fs::write(&path, record.image.to_png(box_size)?)?;
        log::debug!("row {}: wrote {}", record.row_index, path.display());
        written.push((record.row_index, path));
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{QrRecord, RowWarning};
    use crate::qr::{EncodeError, ErrorCorrection, QrBitmap};

    #[test]
    fn test_write_images_skips_failed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("qr");
        let bitmap = QrBitmap::from_modules(2, vec![true, false, false, true]).unwrap();
        let outcome = BatchOutcome {
            records: vec![
                QrRecord {
                    row_index: 1,
                    payload: "a".to_string(),
                    image: bitmap.clone(),
                },
                QrRecord {
                    row_index: 3,
                    payload: "c".to_string(),
                    image: bitmap,
                },
            ],
            warnings: vec![RowWarning {
                row_index: 2,
                payload: "b".to_string(),
                error: EncodeError::PayloadTooLarge {
                    len: 1,
                    level: ErrorCorrection::M,
                },
            }],
        };

        let written = write_images(&target, &outcome, 4).unwrap();
        assert_eq!(
            written,
            vec![(1, target.join("qr_1.png")), (3, target.join("qr_3.png"))]
        );
        assert!(!target.join("qr_2.png").exists());
        let decoded = image::open(target.join("qr_3.png")).unwrap();
        assert_eq!(decoded.width(), 8);
    }
}
