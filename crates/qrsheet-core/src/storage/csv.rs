//! CSV import/export functionality

use crate::batch::BatchOutcome;
use crate::document::Sheet;
use crate::error::{QrSheetError, Result};
use crate::storage::EmbedOptions;
use qrsheet_engine::engine::{Cell, resolve};
use regex::Regex;
use std::collections::HashMap;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static NUMBER_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?(\d+)(?:\.(\d+))?$").unwrap());

/// Digits an f64 holds exactly; longer numeric literals stay text.
const MAX_EXACT_DIGITS: usize = 15;

/// Read a CSV file. The first non-blank line is the header row.
pub fn read_csv(path: &Path) -> Result<Sheet> {
    let content = std::fs::read_to_string(path)?;
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("Sheet1");
    parse_csv_content(&content, name)
}

/// Parse CSV text into a sheet.
pub fn parse_csv_content(content: &str, name: &str) -> Result<Sheet> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut records = split_records(content)?.into_iter();

    let Some((header_line, header_record)) = records.next() else {
        return Err(QrSheetError::EmptySheet);
    };
    let headers = parse_record(&header_record, header_line)?;

    let mut rows = Vec::new();
    for (line_num, record) in records {
        let fields = parse_record(&record, line_num)?;
        rows.push(fields.iter().map(|field| parse_csv_field(field)).collect());
    }

    Ok(Sheet::new(name, headers, rows))
}

/// Group lines into records, keeping line breaks inside quoted fields.
/// Each record comes with the line number it starts on. Blank lines
/// between records are skipped.
fn split_records(content: &str) -> Result<Vec<(usize, String)>> {
    let mut records = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, line) in content.lines().enumerate() {
        let (start, mut record) = match pending.take() {
            Some((start, mut record)) => {
                record.push('\n');
                record.push_str(line);
                (start, record)
            }
            None if line.trim().is_empty() => continue,
            None => (idx + 1, line.to_string()),
        };
        // An odd number of quote characters leaves a quoted field open.
        if record.matches('"').count() % 2 == 1 {
            pending = Some((start, std::mem::take(&mut record)));
        } else {
            records.push((start, record));
        }
    }

    if let Some((start, _)) = pending {
        return Err(QrSheetError::Parse {
            line: start,
            message: "Unterminated quoted field".to_string(),
        });
    }
    Ok(records)
}

fn parse_record(line: &str, line_num: usize) -> Result<Vec<String>> {
    parse_csv_line(line).ok_or_else(|| QrSheetError::Parse {
        line: line_num,
        message: "Unterminated quoted field".to_string(),
    })
}

/// Parse a single CSV record, handling quoted fields (which may span
/// lines). Returns `None` when a quoted field is not closed.
pub(crate) fn parse_csv_line(line: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut field_was_quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                // Check for escaped quote
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else {
            match c {
                '"' => {
                    in_quotes = true;
                    field_was_quoted = true;
                }
                ',' => {
                    if field_was_quoted {
                        fields.push(std::mem::take(&mut current));
                    } else {
                        fields.push(current.trim().to_string());
                        current.clear();
                    }
                    field_was_quoted = false;
                }
                _ => current.push(c),
            }
        }
    }
    if in_quotes {
        return None;
    }
    if field_was_quoted {
        fields.push(current);
    } else {
        fields.push(current.trim().to_string());
    }
    Some(fields)
}

/// Parse a CSV field into a cell.
/// - Empty string -> Empty
/// - Plain decimal literal -> Number, keeping the literal's decimal places
///   as its display format ("1500.50" shows as "1500.50")
/// - Leading zeros ("007") or more than 15 digits -> Text
/// - Otherwise -> Text
pub(crate) fn parse_csv_field(field: &str) -> Cell {
    if field.is_empty() {
        return Cell::new_empty();
    }

    // Keep explicit surrounding whitespace (typically from quoted CSV fields).
    let trimmed = field.trim();
    if field != trimmed {
        return Cell::new_text(field);
    }

    let Some(caps) = NUMBER_LITERAL.captures(trimmed) else {
        return Cell::new_text(trimmed);
    };
    let int_digits = caps.get(1).map_or("", |m| m.as_str());
    let frac_digits = caps.get(2).map_or("", |m| m.as_str());

    // Preserve identifiers like "007" or "00123"
    if int_digits.len() > 1 && int_digits.starts_with('0') {
        return Cell::new_text(trimmed);
    }
    if int_digits.len() + frac_digits.len() > MAX_EXACT_DIGITS {
        return Cell::new_text(trimmed);
    }

    match trimmed.parse::<f64>() {
        Ok(n) if frac_digits.is_empty() => Cell::new_number(n),
        Ok(n) => Cell::new_formatted_number(n, &format!("0.{}", "0".repeat(frac_digits.len()))),
        Err(_) => Cell::new_text(trimmed),
    }
}

/// Export the sheet's display values plus the QR path and payload columns.
pub fn write_csv(
    path: &Path,
    sheet: &Sheet,
    outcome: &BatchOutcome,
    images: &[(usize, PathBuf)],
    options: &EmbedOptions,
) -> Result<()> {
    let columns = sheet.column_count();
    let image_paths: HashMap<usize, &PathBuf> = images.iter().map(|(row, p)| (*row, p)).collect();
    let mut file = BufWriter::new(std::fs::File::create(path)?);

    let mut header_fields: Vec<String> = (0..columns)
        .map(|col| escape_csv_field(sheet.headers.get(col).map_or("", String::as_str)))
        .collect();
    header_fields.push(escape_csv_field(&options.path_header));
    header_fields.push(escape_csv_field(&options.image_header));
    writeln!(file, "{}", header_fields.join(","))?;

    for row_index in 1..=sheet.row_count() {
        let mut row_fields: Vec<String> = (0..columns)
            .map(|col| escape_csv_field(&resolve(sheet.cell(row_index, col))))
            .collect();
        let image_path = image_paths
            .get(&row_index)
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        row_fields.push(escape_csv_field(&image_path));
        row_fields.push(escape_csv_field(outcome.payload_for(row_index).unwrap_or("")));
        writeln!(file, "{}", row_fields.join(","))?;
    }

    file.flush()?;
    Ok(())
}

/// Escape a field for CSV output
fn escape_csv_field(field: &str) -> String {
    // Guard against CSV formula injection in spreadsheet apps.
    let first_non_space = field.trim_start_matches([' ', '\t']).chars().next();
    let is_number = field.parse::<f64>().is_ok();
    let safe_field = if !is_number && matches!(first_non_space, Some('=' | '+' | '-' | '@')) {
        format!("'{}", field)
    } else {
        field.to_string()
    };

    if safe_field.contains(',')
        || safe_field.contains('"')
        || safe_field.contains('\n')
        || safe_field.contains('\r')
    {
        format!("\"{}\"", safe_field.replace('"', "\"\""))
    } else {
        safe_field
    }
}
