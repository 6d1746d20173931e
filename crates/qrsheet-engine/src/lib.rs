//! qrsheet_engine - cell display values and QR payload assembly.

pub mod engine;
