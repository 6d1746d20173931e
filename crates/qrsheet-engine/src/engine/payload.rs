//! QR payload assembly for one row.

use super::cell::Cell;
use super::header::HeaderMapping;
use super::resolve::resolve;

/// Token emitted for a column that is missing from the header or empty.
pub const SENTINEL: &str = "|";

/// Separator between tokens.
pub const SEPARATOR: &str = " ";

/// Resolve one requested column to its payload token.
pub fn payload_token(column: &str, mapping: &HeaderMapping, row: &[Cell]) -> String {
    let Some(cell) = mapping.position(column).and_then(|idx| row.get(idx)) else {
        return SENTINEL.to_string();
    };
    if cell.is_empty() {
        return SENTINEL.to_string();
    }
    let value = resolve(cell);
    if value.trim().is_empty() {
        SENTINEL.to_string()
    } else {
        value
    }
}

/// Build the payload for a row: one token per requested column, in request
/// order, joined by [`SEPARATOR`].
pub fn build_payload<S: AsRef<str>>(selected: &[S], mapping: &HeaderMapping, row: &[Cell]) -> String {
    selected
        .iter()
        .map(|column| payload_token(column.as_ref(), mapping, row))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}
