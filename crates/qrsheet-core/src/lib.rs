//! qrsheet-core - sheet model, storage adapters and QR batch production.

pub mod batch;
pub mod document;
pub mod error;
pub mod qr;
pub mod storage;

pub use batch::{BatchOutcome, QrBatchProducer, QrOptions, QrRecord, RowWarning};
pub use document::Sheet;
pub use error::{QrSheetError, Result};
pub use qr::{EncodeError, ErrorCorrection, QrBitmap, QrCodeEncoder, QrEncoder};
pub use storage::EmbedOptions;

pub use qrsheet_engine::engine::{Cell, HeaderMapping};
