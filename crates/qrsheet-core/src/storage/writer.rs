//! XLSX export with embedded QR images

use crate::batch::BatchOutcome;
use crate::document::Sheet;
use crate::error::{QrSheetError, Result};
use qrsheet_engine::engine::Cell;
use rust_xlsxwriter::{ColNum, Format, FormatAlign, Image, RowNum, Workbook, Worksheet};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const MAX_COLUMNS: usize = 16_384;
const MAX_ROWS: usize = 1_048_576;
const MAX_SHEET_NAME_CHARS: usize = 31;
/// Longest string a worksheet cell can hold.
const MAX_CELL_CHARS: usize = 32_767;
const MM_PER_INCH: f64 = 25.4;

/// Layout of the appended QR columns.
#[derive(Clone, Debug, PartialEq)]
pub struct EmbedOptions {
    /// Displayed image side in pixels.
    pub image_size_px: u32,
    /// Pixels per module in the embedded PNG (scaled down to `image_size_px`).
    pub box_size: u32,
    /// Height of rows holding an image, in points.
    pub row_height: f64,
    /// Image column width, in character units.
    pub image_column_width: f64,
    /// Path column width, in character units.
    pub path_column_width: f64,
    pub path_header: String,
    pub image_header: String,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        EmbedOptions {
            image_size_px: pixels_for_mm(9.0, 96.0),
            box_size: 10,
            row_height: 30.0,
            image_column_width: 18.0,
            path_column_width: 95.0,
            path_header: "QR_Image_Path".to_string(),
            image_header: "QR".to_string(),
        }
    }
}

impl EmbedOptions {
    /// Offsets that center the image in its cell.
    fn image_offsets(&self) -> (u32, u32) {
        let cell_width = column_width_pixels(self.image_column_width);
        let cell_height = (self.row_height * 96.0 / 72.0).round() as u32;
        (
            cell_width.saturating_sub(self.image_size_px) / 2,
            cell_height.saturating_sub(self.image_size_px) / 2,
        )
    }
}

/// Pixel size of a physical length at the given resolution (9 mm at 96 DPI -> 34).
pub fn pixels_for_mm(mm: f64, dpi: f64) -> u32 {
    (mm * dpi / MM_PER_INCH).floor().max(1.0) as u32
}

/// Pixel width of a column given in character units (default font).
fn column_width_pixels(width: f64) -> u32 {
    if width < 1.0 {
        (width * 12.0).round() as u32
    } else {
        (width * 7.0 + 5.0).round() as u32
    }
}

/// Write the sheet plus a path column and an image column.
///
/// The image column cell holds the payload text; when the row was encoded
/// the QR image is placed over it, centered. Rows that failed to encode keep
/// the text only.
pub fn write_xlsx(
    path: &Path,
    sheet: &Sheet,
    outcome: &BatchOutcome,
    images: &[(usize, PathBuf)],
    options: &EmbedOptions,
) -> Result<()> {
    if sheet.row_count() >= MAX_ROWS {
        return Err(QrSheetError::Xlsx(format!(
            "too many rows for xlsx output: {}",
            sheet.row_count()
        )));
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_title(&sheet.name))?;

    let columns = sheet.column_count();
    let path_col = to_col(columns)?;
    let image_col = to_col(columns + 1)?;

    let header_format = Format::new().set_bold();
    for (col, header) in sheet.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, to_col(col)?, header, &header_format)?;
    }
    worksheet.write_string_with_format(0, path_col, &options.path_header, &header_format)?;
    worksheet.write_string_with_format(0, image_col, &options.image_header, &header_format)?;

    let image_cell_format = Format::new()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap();
    let image_paths: HashMap<usize, &PathBuf> = images.iter().map(|(row, p)| (*row, p)).collect();
    let (x_offset, y_offset) = options.image_offsets();

    for (idx, row) in sheet.rows.iter().enumerate() {
        let row_index = idx + 1;
        let xl_row = row_index as RowNum;

        for (col, cell) in row.iter().enumerate() {
            write_cell(worksheet, row_index, col, cell)?;
        }
        if let Some(image_path) = image_paths.get(&row_index) {
            worksheet.write_string(xl_row, path_col, image_path.display().to_string())?;
        }
        if let Some(payload) = outcome.payload_for(row_index) {
            let text = fit_cell_text(payload, row_index, columns + 1);
            worksheet.write_string_with_format(xl_row, image_col, text, &image_cell_format)?;
        }

        if let Some(record) = outcome.record(row_index) {
            let png = record.image.to_png(options.box_size)?;
            let image = Image::new_from_buffer(&png)?;
            let scale = f64::from(options.image_size_px) / image.width();
            let image = image.set_scale_width(scale).set_scale_height(scale);
            worksheet.insert_image_with_offset(xl_row, image_col, &image, x_offset, y_offset)?;
            worksheet.set_row_height(xl_row, options.row_height)?;
        }
    }

    worksheet.set_column_width(path_col, options.path_column_width)?;
    worksheet.set_column_width(image_col, options.image_column_width)?;

    workbook.save(path)?;
    Ok(())
}

/// Copy one input cell; numbers and dates keep their number format.
fn write_cell(worksheet: &mut Worksheet, row_index: usize, col: usize, cell: &Cell) -> Result<()> {
    let xl_row = row_index as RowNum;
    let xl_col = to_col(col)?;
    match cell {
        Cell::Empty => {}
        Cell::Text(text) => {
            worksheet.write_string(xl_row, xl_col, fit_cell_text(text, row_index, col))?;
        }
        Cell::Number { value, .. } | Cell::Date { value, .. } => {
            let code = match cell {
                Cell::Date { .. } => Some(cell.format().unwrap_or("yyyy-mm-dd")),
                _ => cell.format(),
            };
            match code {
                Some(code) => {
                    let format = Format::new().set_num_format(code);
                    worksheet.write_number_with_format(xl_row, xl_col, *value, &format)?;
                }
                None => {
                    worksheet.write_number(xl_row, xl_col, *value)?;
                }
            }
        }
    }
    Ok(())
}

/// Cut text to what a cell can hold, warning when something is dropped.
fn fit_cell_text(text: &str, row_index: usize, col: usize) -> Cow<'_, str> {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        None => Cow::Borrowed(text),
        Some((end, _)) => {
            log::warn!(
                "cell {}: text of {} characters truncated to {}",
                Sheet::cell_ref(row_index, col),
                text.chars().count(),
                MAX_CELL_CHARS
            );
            Cow::Borrowed(&text[..end])
        }
    }
}

fn to_col(col: usize) -> Result<ColNum> {
    if col >= MAX_COLUMNS {
        return Err(QrSheetError::Xlsx(format!(
            "too many columns for xlsx output: {}",
            col + 1
        )));
    }
    Ok(col as ColNum)
}

/// A valid worksheet name: no `[]:*?/\`, at most 31 characters.
fn sheet_title(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\') { '_' } else { c })
        .take(MAX_SHEET_NAME_CHARS)
        .collect();
    let cleaned = cleaned.trim_matches('\'').trim().to_string();
    if cleaned.is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{QrOptions, QrBatchProducer};
    use crate::qr::{EncodeError, ErrorCorrection, QrCodeEncoder};
    use crate::storage::read_xlsx;
    use qrsheet_engine::engine::resolve;

    #[test]
    fn test_pixels_for_mm() {
        assert_eq!(pixels_for_mm(9.0, 96.0), 34);
        assert_eq!(pixels_for_mm(25.4, 300.0), 300);
        assert_eq!(pixels_for_mm(0.0, 96.0), 1);
    }

    #[test]
    fn test_image_is_centered() {
        let options = EmbedOptions::default();
        // 18 chars -> 131 px wide, 30 pt -> 40 px tall, image 34 px.
        assert_eq!(options.image_offsets(), (48, 3));
    }

    #[test]
    fn test_sheet_title() {
        assert_eq!(sheet_title("Q1/Q2 [draft]"), "Q1_Q2 _draft_");
        assert_eq!(sheet_title(""), "Sheet1");
        assert_eq!(sheet_title(&"x".repeat(40)).len(), 31);
    }

    #[test]
    fn test_fit_cell_text() {
        assert_eq!(fit_cell_text("short", 1, 0), "short");
        let long = "é".repeat(MAX_CELL_CHARS + 10);
        let fitted = fit_cell_text(&long, 1, 0);
        assert_eq!(fitted.chars().count(), MAX_CELL_CHARS);
    }

    #[test]
    fn test_write_xlsx_keeps_going_past_cell_text_limit() {
        let dir = tempfile::tempdir().unwrap();
        let output_path = dir.path().join("out.xlsx");
        let note = "N".repeat(20_000);
        let sheet = Sheet::new(
            "Notes",
            vec!["ID".to_string(), "Notes".to_string()],
            vec![
                vec![Cell::new_text("A1"), Cell::new_text("short")],
                vec![Cell::new_text("A2"), Cell::new_text(&note)],
                vec![Cell::new_text("A3"), Cell::new_text(&"M".repeat(40_000))],
            ],
        );
        let outcome = QrBatchProducer::new(QrCodeEncoder, QrOptions::default())
            .run(&sheet, &["Notes", "Notes", "ID"]);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.warnings.len(), 2);
        assert!(outcome.payload_for(2).unwrap().chars().count() > MAX_CELL_CHARS);

        write_xlsx(&output_path, &sheet, &outcome, &[], &EmbedOptions::default()).unwrap();

        let written = read_xlsx(&output_path, None).unwrap();
        assert_eq!(resolve(written.cell(1, 3)), "short short A1");
        assert_eq!(resolve(written.cell(2, 1)), note);
        let fallback = resolve(written.cell(2, 3));
        assert_eq!(fallback.chars().count(), MAX_CELL_CHARS);
        assert!(fallback.starts_with(&note));
        assert_eq!(resolve(written.cell(3, 1)).chars().count(), MAX_CELL_CHARS);
    }

    #[test]
    fn test_write_xlsx_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let output_path = dir.path().join("out.xlsx");
        let sheet = Sheet::new(
            "Invoices",
            vec!["ID".to_string(), "Amount".to_string(), "Due".to_string()],
            vec![
                vec![
                    Cell::new_text("A100"),
                    Cell::new_formatted_number(1500.5, "#,##0.000"),
                    Cell::new_date(45292.0, Some("yyyy-mm-dd")),
                ],
                vec![Cell::new_text("X".repeat(4000).as_str())],
            ],
        );
        let outcome = QrBatchProducer::new(QrCodeEncoder, QrOptions::default())
            .run(&sheet, &["ID", "Amount"]);
        assert_eq!(outcome.records.len(), 1);
        assert!(matches!(
            outcome.warnings[0].error,
            EncodeError::PayloadTooLarge {
                level: ErrorCorrection::M,
                ..
            }
        ));

        let images = vec![(1, PathBuf::from("qr_1.png"))];
        write_xlsx(&output_path, &sheet, &outcome, &images, &EmbedOptions::default()).unwrap();

        let written = read_xlsx(&output_path, Some("Invoices")).unwrap();
        assert_eq!(written.headers, vec!["ID", "Amount", "Due", "QR_Image_Path", "QR"]);
        assert_eq!(resolve(written.cell(1, 1)), "1,500.500");
        assert_eq!(resolve(written.cell(1, 2)), "2024-01-01");
        assert_eq!(resolve(written.cell(1, 3)), "qr_1.png");
        assert_eq!(resolve(written.cell(1, 4)), "A100 1,500.500");
        // The failed row keeps its payload as text and has no path.
        assert!(written.cell(2, 3).is_empty());
        assert_eq!(resolve(written.cell(2, 4)), format!("{} |", "X".repeat(4000)));
    }
}
