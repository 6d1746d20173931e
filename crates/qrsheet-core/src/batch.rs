//! Per-row QR production for a whole sheet.

use crate::document::Sheet;
use crate::qr::{EncodeError, ErrorCorrection, QrBitmap, QrEncoder};
use qrsheet_engine::engine::build_payload;

/// Encoder settings used for every row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QrOptions {
    pub error_correction: ErrorCorrection,
    /// Light modules around the symbol.
    pub border: u32,
}

impl Default for QrOptions {
    fn default() -> Self {
        QrOptions {
            error_correction: ErrorCorrection::M,
            border: 1,
        }
    }
}

/// One encoded row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrRecord {
    /// 1-based data-row index (row 1 is the first row after the header)
    pub row_index: usize,
    pub payload: String,
    pub image: QrBitmap,
}

/// A row whose payload could not be encoded. The payload is kept so the
/// output can still show it as text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowWarning {
    pub row_index: usize,
    pub payload: String,
    pub error: EncodeError,
}

impl std::fmt::Display for RowWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}: {}", self.row_index, self.error)
    }
}

/// Result of a batch: encoded records and per-row warnings, both in row order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub records: Vec<QrRecord>,
    pub warnings: Vec<RowWarning>,
}

impl BatchOutcome {
    /// The encoded record for a row, if encoding succeeded.
    pub fn record(&self, row_index: usize) -> Option<&QrRecord> {
        self.records
            .binary_search_by_key(&row_index, |r| r.row_index)
            .ok()
            .map(|idx| &self.records[idx])
    }

    /// Payload text for a row, whether or not it was encoded.
    pub fn payload_for(&self, row_index: usize) -> Option<&str> {
        if let Some(record) = self.record(row_index) {
            return Some(&record.payload);
        }
        self.warnings
            .iter()
            .find(|w| w.row_index == row_index)
            .map(|w| w.payload.as_str())
    }

    /// Rows processed (encoded or not).
    pub fn len(&self) -> usize {
        self.records.len() + self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.warnings.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Drives payload building and QR encoding across all rows of a sheet.
pub struct QrBatchProducer<E: QrEncoder> {
    encoder: E,
    options: QrOptions,
}

impl<E: QrEncoder> QrBatchProducer<E> {
    pub fn new(encoder: E, options: QrOptions) -> Self {
        QrBatchProducer { encoder, options }
    }

    /// Encode every data row of `sheet` using the selected columns.
    ///
    /// Rows are processed in order; a row that fails to encode becomes a
    /// [`RowWarning`] and the batch continues.
    pub fn run<S: AsRef<str>>(&self, sheet: &Sheet, selected: &[S]) -> BatchOutcome {
        let mapping = sheet.header_mapping();
        for duplicate in mapping.duplicates() {
            log::warn!("duplicate column '{}' in sheet '{}'; using the first one", duplicate, sheet.name);
        }
        for column in selected {
            if !mapping.contains(column.as_ref()) {
                log::warn!(
                    "column '{}' not found in sheet '{}'; encoding it as empty",
                    column.as_ref(),
                    sheet.name
                );
            }
        }

        let mut outcome = BatchOutcome::default();
        for (idx, row) in sheet.rows.iter().enumerate() {
            let row_index = idx + 1;
            let payload = build_payload(selected, &mapping, row);
            log::debug!("row {}: {:?}", row_index, payload);

            match self
                .encoder
                .encode(&payload, self.options.error_correction, self.options.border)
            {
                Ok(image) => outcome.records.push(QrRecord {
                    row_index,
                    payload,
                    image,
                }),
                Err(error) => {
                    let warning = RowWarning {
                        row_index,
                        payload,
                        error,
                    };
                    log::warn!("{}", warning);
                    outcome.warnings.push(warning);
                }
            }
        }
        outcome
    }
}
