//! Display values: the text a viewer sees for a cell.

use super::cell::Cell;
use super::date::format_iso_date;
use super::format::{format_canonical, format_number};

/// Resolve a cell to its display text.
///
/// - Empty -> `""`
/// - Text -> trimmed text, inner whitespace untouched
/// - Number -> rendered through its number format, canonical when the
///   format is missing or unrecognized
/// - Date -> `YYYY-MM-DD` regardless of its format; serials that are not
///   valid dates render as plain numbers
pub fn resolve(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Text(text) => text.trim().to_string(),
        Cell::Number { value, format } => format_number(*value, format.as_deref()),
        Cell::Date { value, .. } => {
            format_iso_date(*value).unwrap_or_else(|| format_canonical(*value))
        }
    }
}
