//! Row-to-payload engine.
//!
//! This module turns spreadsheet cells into the text encoded in QR codes:
//!
//! - [`Cell`], [`Row`] - Typed cell contents as read from the input document
//! - [`CellRef`] - A1-style labels for cell positions
//! - [`HeaderMapping`], [`normalize_header`] - Column lookup by name
//! - [`resolve`] - Display value of a cell
//! - [`format_number`], [`parse_number_format`] - Number-format rendering
//! - [`build_payload`] - Payload assembly with sentinels for missing values

mod cell;
mod cell_ref;
mod date;
mod format;
mod header;
mod payload;
mod resolve;

pub use cell::{Cell, Row};
pub use cell_ref::CellRef;
pub use date::format_iso_date;
pub use format::{NumberFormat, format_canonical, format_number, is_date_format, parse_number_format};
pub use header::{HeaderMapping, normalize_header};
pub use payload::{SENTINEL, SEPARATOR, build_payload, payload_token};
pub use resolve::resolve;
