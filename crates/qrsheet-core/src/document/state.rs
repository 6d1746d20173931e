use qrsheet_engine::engine::{Cell, CellRef, HeaderMapping, Row};

/// A single sheet: a header row followed by data rows.
///
/// Row indices used by accessors are 1-based data-row numbers: row 1 is the
/// first row after the header.
#[derive(Clone, Debug, Default)]
pub struct Sheet {
    /// Sheet name (file stem for CSV input)
    pub name: String,
    /// Header names in column order
    pub headers: Vec<String>,
    /// Data rows in sheet order
    pub rows: Vec<Row>,
}

impl Sheet {
    pub fn new(name: &str, headers: Vec<String>, rows: Vec<Row>) -> Sheet {
        Sheet {
            name: name.to_string(),
            headers,
            rows,
        }
    }

    /// Build the normalized header lookup for this sheet.
    pub fn header_mapping(&self) -> HeaderMapping {
        HeaderMapping::from_headers(&self.headers)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest of the header row and every data row.
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    /// The data row with the given 1-based index.
    pub fn row(&self, row_index: usize) -> Option<&Row> {
        row_index.checked_sub(1).and_then(|idx| self.rows.get(idx))
    }

    /// Cell at a 1-based data row and 0-based column. Missing cells are empty.
    pub fn cell(&self, row_index: usize, col: usize) -> &Cell {
        const EMPTY: &Cell = &Cell::Empty;
        self.row(row_index)
            .and_then(|row| row.get(col))
            .unwrap_or(EMPTY)
    }

    /// Cell at a 1-based data row, looked up by (normalized) column name.
    pub fn cell_by_name(&self, row_index: usize, name: &str) -> Option<&Cell> {
        let col = self.header_mapping().position(name)?;
        Some(self.cell(row_index, col))
    }

    /// Worksheet position of a data cell, for messages ("B3").
    pub fn cell_ref(row_index: usize, col: usize) -> CellRef {
        // Data row 1 sits on worksheet row 2 under the header.
        CellRef::new(col, row_index)
    }
}
