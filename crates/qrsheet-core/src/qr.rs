//! QR encoding collaborator.
//!
//! [`QrEncoder`] is the seam between batch production and the symbol
//! encoder. [`QrCodeEncoder`] is the default implementation backed by the
//! `qrcode` crate; it picks the smallest version that fits the payload.

use crate::error::Result;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::types::{Color, QrError};
use qrcode::{EcLevel, QrCode};
use serde::Deserialize;
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;
use thiserror::Error;

/// QR error-correction level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum ErrorCorrection {
    /// ~7% recovery
    L,
    /// ~15% recovery
    #[default]
    M,
    /// ~25% recovery
    Q,
    /// ~30% recovery
    H,
}

impl ErrorCorrection {
    fn ec_level(self) -> EcLevel {
        match self {
            ErrorCorrection::L => EcLevel::L,
            ErrorCorrection::M => EcLevel::M,
            ErrorCorrection::Q => EcLevel::Q,
            ErrorCorrection::H => EcLevel::H,
        }
    }
}

impl FromStr for ErrorCorrection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "low" => Ok(ErrorCorrection::L),
            "m" | "medium" => Ok(ErrorCorrection::M),
            "q" | "quartile" => Ok(ErrorCorrection::Q),
            "h" | "high" => Ok(ErrorCorrection::H),
            _ => Err(format!("Invalid error correction level: {} (expected L, M, Q or H)", s)),
        }
    }
}

impl TryFrom<String> for ErrorCorrection {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCorrection::L => "L",
            ErrorCorrection::M => "M",
            ErrorCorrection::Q => "Q",
            ErrorCorrection::H => "H",
        };
        f.write_str(name)
    }
}

/// Per-row encoding failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("payload of {len} bytes exceeds QR capacity at error correction {level}")]
    PayloadTooLarge { len: usize, level: ErrorCorrection },

    #[error("QR encoder error: {0}")]
    Encoder(String),
}

/// A square QR module matrix, quiet-zone border included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrBitmap {
    width: usize,
    modules: Vec<bool>,
}

impl QrBitmap {
    /// Build from row-major modules (`true` = dark). Returns `None` unless
    /// `modules.len() == width * width`.
    pub fn from_modules(width: usize, modules: Vec<bool>) -> Option<QrBitmap> {
        (modules.len() == width * width).then_some(QrBitmap { width, modules })
    }

    /// Modules per side.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.modules[y * self.width + x]
    }

    /// Render black on white with `box_size` pixels per module.
    pub fn to_image(&self, box_size: u32) -> GrayImage {
        let box_size = box_size.max(1);
        let side = self.width as u32 * box_size;
        GrayImage::from_fn(side, side, |x, y| {
            let dark = self.is_dark((x / box_size) as usize, (y / box_size) as usize);
            if dark { Luma([0]) } else { Luma([255]) }
        })
    }

    /// PNG bytes of [`QrBitmap::to_image`].
    pub fn to_png(&self, box_size: u32) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(self.to_image(box_size))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

/// Encodes text into a QR symbol.
pub trait QrEncoder {
    /// Encode `text` at the given level, surrounded by `border` light modules.
    fn encode(
        &self,
        text: &str,
        level: ErrorCorrection,
        border: u32,
    ) -> std::result::Result<QrBitmap, EncodeError>;
}

impl<T: QrEncoder + ?Sized> QrEncoder for &T {
    fn encode(
        &self,
        text: &str,
        level: ErrorCorrection,
        border: u32,
    ) -> std::result::Result<QrBitmap, EncodeError> {
        (**self).encode(text, level, border)
    }
}

/// [`QrEncoder`] backed by the `qrcode` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct QrCodeEncoder;

impl QrEncoder for QrCodeEncoder {
    fn encode(
        &self,
        text: &str,
        level: ErrorCorrection,
        border: u32,
    ) -> std::result::Result<QrBitmap, EncodeError> {
        let code = QrCode::with_error_correction_level(text.as_bytes(), level.ec_level()).map_err(
            |err| match err {
                QrError::DataTooLong => EncodeError::PayloadTooLarge {
                    len: text.len(),
                    level,
                },
                other => EncodeError::Encoder(other.to_string()),
            },
        )?;

        let inner = code.width();
        let colors = code.to_colors();
        let border = border as usize;
        let width = inner + 2 * border;
        let mut modules = vec![false; width * width];
        for y in 0..inner {
            for x in 0..inner {
                modules[(y + border) * width + x + border] = colors[y * inner + x] == Color::Dark;
            }
        }
        Ok(QrBitmap { width, modules })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_correction() {
        assert_eq!("m".parse::<ErrorCorrection>(), Ok(ErrorCorrection::M));
        assert_eq!(" H ".parse::<ErrorCorrection>(), Ok(ErrorCorrection::H));
        assert_eq!("quartile".parse::<ErrorCorrection>(), Ok(ErrorCorrection::Q));
        assert!("x".parse::<ErrorCorrection>().is_err());
        assert_eq!(ErrorCorrection::default(), ErrorCorrection::M);
    }

    #[test]
    fn test_encode_adds_border() {
        let bitmap = QrCodeEncoder.encode("hello", ErrorCorrection::M, 1).unwrap();
        // Version 1 is 21 modules wide.
        assert_eq!(bitmap.width(), 23);
        assert!(!bitmap.is_dark(0, 0));
        assert!(!bitmap.is_dark(22, 22));
        // Top-left finder pattern starts right inside the border.
        assert!(bitmap.is_dark(1, 1));
    }

    #[test]
    fn test_encode_without_border() {
        let bitmap = QrCodeEncoder.encode("hello", ErrorCorrection::M, 0).unwrap();
        assert_eq!(bitmap.width(), 21);
        assert!(bitmap.is_dark(0, 0));
    }

    #[test]
    fn test_encode_grows_version_for_longer_text() {
        let short = QrCodeEncoder.encode("A100", ErrorCorrection::M, 1).unwrap();
        let long = QrCodeEncoder
            .encode(&"Acme Ltd 1,500.50 ".repeat(10), ErrorCorrection::M, 1)
            .unwrap();
        assert!(long.width() > short.width());
    }

    #[test]
    fn test_encode_too_long() {
        let text = "x".repeat(5000);
        let err = QrCodeEncoder.encode(&text, ErrorCorrection::M, 1).unwrap_err();
        assert_eq!(
            err,
            EncodeError::PayloadTooLarge {
                len: 5000,
                level: ErrorCorrection::M
            }
        );
    }

    #[test]
    fn test_to_png_dimensions() {
        let bitmap = QrCodeEncoder.encode("hello", ErrorCorrection::M, 1).unwrap();
        let png = bitmap.to_png(10).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), 230);
        assert_eq!(decoded.height(), 230);
    }

    #[test]
    fn test_to_image_colors() {
        let bitmap = QrBitmap::from_modules(2, vec![true, false, false, true]).unwrap();
        let img = bitmap.to_image(3);
        assert_eq!(img.dimensions(), (6, 6));
        assert_eq!(img.get_pixel(0, 0), &Luma([0]));
        assert_eq!(img.get_pixel(3, 0), &Luma([255]));
        assert_eq!(img.get_pixel(5, 5), &Luma([0]));
    }

    #[test]
    fn test_from_modules_checks_size() {
        assert!(QrBitmap::from_modules(3, vec![false; 8]).is_none());
    }
}
