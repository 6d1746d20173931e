//! XLSX import

use crate::document::Sheet;
use crate::error::{QrSheetError, Result};
use qrsheet_engine::engine::{Cell, CellRef, is_date_format};
use std::path::Path;
use umya_spreadsheet::{CellRawValue, Worksheet};

/// Read one worksheet of an `.xlsx`/`.xlsm` workbook.
///
/// Row 1 is the header row. Number cells keep their number-format code;
/// those whose code renders a date become date cells.
pub fn read_xlsx(path: &Path, sheet_name: Option<&str>) -> Result<Sheet> {
    let book = umya_spreadsheet::reader::xlsx::read(path)
        .map_err(|e| QrSheetError::Xlsx(format!("{}: {}", path.display(), e)))?;

    let worksheet = match sheet_name {
        Some(name) => book
            .get_sheet_by_name(name)
            .ok_or_else(|| QrSheetError::SheetNotFound(name.to_string()))?,
        None => book.get_sheet(&0).ok_or(QrSheetError::EmptySheet)?,
    };

    sheet_from_worksheet(worksheet)
}

fn sheet_from_worksheet(worksheet: &Worksheet) -> Result<Sheet> {
    let (max_col, max_row) = worksheet.get_highest_column_and_row();
    if max_row == 0 || max_col == 0 {
        return Err(QrSheetError::EmptySheet);
    }

    let headers: Vec<String> = (1..=max_col)
        .map(|col| {
            worksheet
                .get_cell((col, 1))
                .map(|cell| cell.get_value().into_owned())
                .unwrap_or_default()
        })
        .collect();

    let mut rows = Vec::with_capacity(max_row.saturating_sub(1) as usize);
    for row in 2..=max_row {
        let cells = (1..=max_col)
            .map(|col| {
                worksheet
                    .get_cell((col, row))
                    .map(convert_cell)
                    .unwrap_or_default()
            })
            .collect();
        rows.push(cells);
    }

    let sheet = Sheet::new(worksheet.get_name(), headers, rows);
    log::debug!(
        "sheet '{}' spans A1:{}",
        sheet.name,
        CellRef::new(max_col as usize - 1, max_row as usize - 1)
    );
    Ok(sheet)
}

fn convert_cell(cell: &umya_spreadsheet::Cell) -> Cell {
    match cell.get_raw_value() {
        CellRawValue::Empty => Cell::new_empty(),
        CellRawValue::Numeric(value) => {
            let format = cell
                .get_style()
                .get_number_format()
                .map(|nf| nf.get_format_code())
                .filter(|code| !code.is_empty() && !code.eq_ignore_ascii_case("general"));
            match format {
                Some(code) if is_date_format(code) => Cell::new_date(*value, Some(code)),
                Some(code) => Cell::new_formatted_number(*value, code),
                None => Cell::new_number(*value),
            }
        }
        CellRawValue::Bool(value) => Cell::new_text(if *value { "TRUE" } else { "FALSE" }),
        _ => {
            let text = cell.get_value();
            if text.is_empty() {
                Cell::new_empty()
            } else {
                Cell::Text(text.into_owned())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrsheet_engine::engine::resolve;

    fn write_fixture(path: &Path) {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();
        sheet.get_cell_mut("A1").set_value("ID");
        sheet.get_cell_mut("B1").set_value("Amount");
        sheet.get_cell_mut("C1").set_value("Due");
        sheet.get_cell_mut("D1").set_value("Paid");

        sheet.get_cell_mut("A2").set_value("A100");
        sheet.get_cell_mut("B2").set_value_number(1500.5);
        sheet
            .get_style_mut("B2")
            .get_number_format_mut()
            .set_format_code("#,##0.000");
        sheet.get_cell_mut("C2").set_value_number(45292);
        sheet
            .get_style_mut("C2")
            .get_number_format_mut()
            .set_format_code("yyyy-mm-dd");
        sheet.get_cell_mut("D2").set_value_bool(true);

        sheet.get_cell_mut("A3").set_value("A101");
        sheet.get_cell_mut("B3").set_value_number(42);

        umya_spreadsheet::writer::xlsx::write(&book, path).unwrap();
    }

    #[test]
    fn test_read_xlsx_headers_and_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.xlsx");
        write_fixture(&path);

        let sheet = read_xlsx(&path, None).unwrap();
        assert_eq!(sheet.headers, vec!["ID", "Amount", "Due", "Paid"]);
        assert_eq!(sheet.row_count(), 2);
        assert_eq!(resolve(sheet.cell(1, 0)), "A100");
        assert_eq!(resolve(sheet.cell(1, 1)), "1,500.500");
        assert!(matches!(sheet.cell(1, 2), Cell::Date { .. }));
        assert_eq!(resolve(sheet.cell(1, 2)), "2024-01-01");
        assert_eq!(resolve(sheet.cell(1, 3)), "TRUE");
        assert_eq!(resolve(sheet.cell(2, 1)), "42");
        assert!(sheet.cell(2, 2).is_empty());
    }

    #[test]
    fn test_read_xlsx_by_sheet_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.xlsx");
        write_fixture(&path);

        assert!(read_xlsx(&path, Some("Sheet1")).is_ok());
        assert!(matches!(
            read_xlsx(&path, Some("Missing")),
            Err(QrSheetError::SheetNotFound(name)) if name == "Missing"
        ));
    }

    #[test]
    fn test_read_xlsx_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_xlsx(&dir.path().join("nope.xlsx"), None);
        assert!(matches!(result, Err(QrSheetError::Xlsx(_))));
    }
}
