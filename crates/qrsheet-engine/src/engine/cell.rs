//! Cell data structures for a read-only sheet.
//!
//! - [`Cell`] - The content of a single cell (empty, text, number or date)
//! - [`Row`] - One data row, indexed by column position

/// The content of a cell as read from the input document.
///
/// Number and date cells always carry the raw stored value. The optional
/// `format` is the number-format code attached to the cell and only affects
/// how the value is rendered.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number { value: f64, format: Option<String> },
    /// Spreadsheet date serial (days since the 1900 epoch, fraction = time of day).
    Date { value: f64, format: Option<String> },
}

impl Cell {
    pub fn new_empty() -> Cell {
        Cell::Empty
    }

    pub fn new_text(text: &str) -> Cell {
        Cell::Text(text.to_string())
    }

    pub fn new_number(value: f64) -> Cell {
        Cell::Number {
            value,
            format: None,
        }
    }

    pub fn new_formatted_number(value: f64, format: &str) -> Cell {
        Cell::Number {
            value,
            format: Some(format.to_string()),
        }
    }

    pub fn new_date(serial: f64, format: Option<&str>) -> Cell {
        Cell::Date {
            value: serial,
            format: format.map(str::to_string),
        }
    }

    /// True when the cell holds no value at all.
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// The number-format code, if any.
    pub fn format(&self) -> Option<&str> {
        match self {
            Cell::Number { format, .. } | Cell::Date { format, .. } => format.as_deref(),
            _ => None,
        }
    }
}

/// One data row. Cells past the end of the vector are treated as empty.
pub type Row = Vec<Cell>;
