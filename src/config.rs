//! User configuration (config.toml).

use directories::ProjectDirs;
use qrsheet_core::storage::pixels_for_mm;
use qrsheet_core::{EmbedOptions, ErrorCorrection, QrOptions};
use serde::Deserialize;
use std::path::PathBuf;

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

const DEFAULT_SIZE_MM: f64 = 9.0;
const DEFAULT_DPI: f64 = 96.0;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    qr: Option<QrSection>,
    layout: Option<LayoutSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct QrSection {
    error_correction: Option<ErrorCorrection>,
    border: Option<u32>,
    size_mm: Option<f64>,
    dpi: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutSection {
    row_height: Option<f64>,
    image_column_width: Option<f64>,
    path_column_width: Option<f64>,
    path_header: Option<String>,
    image_header: Option<String>,
}

/// Effective settings for a run.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub qr: QrOptions,
    pub size_mm: f64,
    pub dpi: f64,
    pub embed: EmbedOptions,
}

impl Default for Settings {
    fn default() -> Self {
        let mut embed = EmbedOptions::default();
        embed.image_size_px = pixels_for_mm(DEFAULT_SIZE_MM, DEFAULT_DPI);
        Settings {
            qr: QrOptions::default(),
            size_mm: DEFAULT_SIZE_MM,
            dpi: DEFAULT_DPI,
            embed,
        }
    }
}

impl Settings {
    /// Change the printed QR size, keeping the pixel size in sync.
    pub fn set_size_mm(&mut self, size_mm: f64) {
        self.size_mm = size_mm;
        self.embed.image_size_px = pixels_for_mm(self.size_mm, self.dpi);
    }

    fn set_dpi(&mut self, dpi: f64) {
        self.dpi = dpi;
        self.embed.image_size_px = pixels_for_mm(self.size_mm, self.dpi);
    }
}

/// Load settings from `config_file`, or from the user config dir when not
/// given. Problems are returned as warnings and defaults are kept.
pub fn load_settings(config_file: Option<&PathBuf>) -> (Settings, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let Some(path) = config_file.cloned().or_else(user_config_path) else {
        return (Settings::default(), warnings);
    };

    if !path.exists() {
        if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (Settings::default(), warnings);
    }

    let content = match std::fs::metadata(&path) {
        Ok(meta) if meta.len() > MAX_CONFIG_FILE_BYTES => {
            warnings.push(format!(
                "Refusing to read {}: file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_CONFIG_FILE_BYTES
            ));
            return (Settings::default(), warnings);
        }
        Ok(_) => match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                warnings.push(format!("Failed to read {}: {}", path.display(), err));
                return (Settings::default(), warnings);
            }
        },
        Err(err) => {
            warnings.push(format!(
                "Failed to read metadata for {}: {}",
                path.display(),
                err
            ));
            return (Settings::default(), warnings);
        }
    };

    match parse_settings(&content) {
        Ok((settings, mut parse_warnings)) => {
            warnings.append(&mut parse_warnings);
            log::info!("loaded config from {}", path.display());
            (settings, warnings)
        }
        Err(err) => {
            warnings.push(format!("Failed to parse {}: {}", path.display(), err));
            (Settings::default(), warnings)
        }
    }
}

/// Parse config.toml content. Out-of-range values are skipped with a warning.
pub fn parse_settings(content: &str) -> Result<(Settings, Vec<String>), String> {
    let file: ConfigFile = toml::from_str(content).map_err(|e| e.to_string())?;
    let mut settings = Settings::default();
    let mut warnings = Vec::new();

    if let Some(qr) = file.qr {
        if let Some(level) = qr.error_correction {
            settings.qr.error_correction = level;
        }
        if let Some(border) = qr.border {
            settings.qr.border = border;
        }
        if let Some(dpi) = qr.dpi {
            match positive("qr.dpi", dpi) {
                Ok(dpi) => settings.set_dpi(dpi),
                Err(err) => warnings.push(err),
            }
        }
        if let Some(size_mm) = qr.size_mm {
            match positive("qr.size_mm", size_mm) {
                Ok(size_mm) => settings.set_size_mm(size_mm),
                Err(err) => warnings.push(err),
            }
        }
    }

    if let Some(layout) = file.layout {
        let embed = &mut settings.embed;
        for (key, value, target) in [
            ("layout.row_height", layout.row_height, &mut embed.row_height),
            (
                "layout.image_column_width",
                layout.image_column_width,
                &mut embed.image_column_width,
            ),
            (
                "layout.path_column_width",
                layout.path_column_width,
                &mut embed.path_column_width,
            ),
        ] {
            if let Some(value) = value {
                match positive(key, value) {
                    Ok(value) => *target = value,
                    Err(err) => warnings.push(err),
                }
            }
        }
        if let Some(header) = layout.path_header.filter(|h| !h.trim().is_empty()) {
            embed.path_header = header;
        }
        if let Some(header) = layout.image_header.filter(|h| !h.trim().is_empty()) {
            embed.image_header = header;
        }
    }

    Ok((settings, warnings))
}

fn positive(key: &str, value: f64) -> Result<f64, String> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("Ignoring {} = {}: must be a positive number", key, value))
    }
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "qrsheet")?;
    Some(proj.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.qr.error_correction, ErrorCorrection::M);
        assert_eq!(settings.qr.border, 1);
        assert_eq!(settings.embed.image_size_px, 34);
        assert_eq!(settings.embed.path_header, "QR_Image_Path");
    }

    #[test]
    fn test_parse_full_config() {
        let content = r#"
[qr]
error_correction = "h"
border = 2
size_mm = 20.0
dpi = 127.0

[layout]
row_height = 60.0
image_column_width = 30.0
path_column_width = 50.0
path_header = "Image"
image_header = "Code"
"#;
        let (settings, warnings) = parse_settings(content).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(settings.qr.error_correction, ErrorCorrection::H);
        assert_eq!(settings.qr.border, 2);
        assert_eq!(settings.embed.image_size_px, 100);
        assert_eq!(settings.embed.row_height, 60.0);
        assert_eq!(settings.embed.image_column_width, 30.0);
        assert_eq!(settings.embed.path_column_width, 50.0);
        assert_eq!(settings.embed.path_header, "Image");
        assert_eq!(settings.embed.image_header, "Code");
    }

    #[test]
    fn test_invalid_values_warn_and_keep_defaults() {
        let content = r#"
[qr]
size_mm = -1.0
dpi = 0.0

[layout]
row_height = 0.0
"#;
        let (settings, warnings) = parse_settings(content).unwrap();
        assert_eq!(warnings.len(), 3);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_invalid_error_correction_is_rejected() {
        let err = parse_settings("[qr]\nerror_correction = \"Z\"\n").unwrap_err();
        assert!(err.contains("Invalid error correction level"));
    }

    #[test]
    fn test_invalid_error_correction_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[qr]\nerror_correction = \"Z\"\nborder = 3\n").unwrap();
        let (settings, warnings) = load_settings(Some(&path));
        assert_eq!(settings, Settings::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Failed to parse"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(parse_settings("[qr]\ncolour = \"red\"\n").is_err());
    }

    #[test]
    fn test_missing_explicit_file_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let (settings, warnings) = load_settings(Some(&path));
        assert_eq!(settings, Settings::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("not found"));
    }

    #[test]
    fn test_unparsable_file_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[qr\n").unwrap();
        let (settings, warnings) = load_settings(Some(&path));
        assert_eq!(settings, Settings::default());
        assert!(warnings[0].starts_with("Failed to parse"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[qr]\nerror_correction = \"Q\"\n").unwrap();
        let (settings, warnings) = load_settings(Some(&path));
        assert!(warnings.is_empty());
        assert_eq!(settings.qr.error_correction, ErrorCorrection::Q);
    }
}
