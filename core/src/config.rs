use crate::compose::is_valid_scale;
use crate::error::{ReportError, Result};
use crate::ingest::DEFAULT_MAX_UPLOAD_BYTES;
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadConfig {
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// `#rrggbb`
    #[serde(default = "default_background")]
    pub background: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DownloadMode {
    /// Save into the downloads folder.
    #[default]
    Direct,
    /// Save, then show the file in the system file manager.
    Reveal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DownloadConfig {
    #[serde(default)]
    pub mode: DownloadMode,
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

// Default value functions
fn default_max_bytes() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_scale() -> f32 {
    2.0
}

fn default_background() -> String {
    "#ffffff".to_string()
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            background: default_background(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upload: UploadConfig::default(),
            export: ExportConfig::default(),
            download: DownloadConfig::default(),
        }
    }
}

impl AppConfig {
    /// Replaces out-of-range values with their defaults.
    pub fn sanitized(mut self) -> Self {
        if !is_valid_scale(self.export.scale) {
            log::warn!(
                "Export scale {} is out of range. Using {}.",
                self.export.scale,
                default_scale()
            );
            self.export.scale = default_scale();
        }
        self
    }
}

impl ExportConfig {
    /// Parses `background`; falls back to white when malformed.
    pub fn background_rgba(&self) -> Rgba<u8> {
        parse_hex_color(&self.background).unwrap_or(Rgba([255, 255, 255, 255]))
    }
}

impl DownloadConfig {
    /// Configured folder, else the user's downloads folder, else home.
    pub fn resolve_directory(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.directory {
            return Ok(dir.clone());
        }
        dirs::download_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| ReportError::Config("Could not determine downloads directory".to_string()))
    }
}

pub fn parse_hex_color(value: &str) -> Option<Rgba<u8>> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgba([channel(0)?, channel(2)?, channel(4)?, 255]))
}

/// Get the path to the config file
pub fn config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ReportError::Config("Could not determine config directory".to_string()))?;
    Ok(config_dir.join("qa-report-builder").join("config.json"))
}

/// Load configuration from `path`, or defaults if it is missing or unreadable
pub fn load_config_from(path: &Path) -> AppConfig {
    if !path.exists() {
        return AppConfig::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config.sanitized(),
            Err(e) => {
                log::warn!("Failed to parse config file: {}. Using defaults.", e);
                AppConfig::default()
            }
        },
        Err(e) => {
            log::warn!("Failed to read config file: {}. Using defaults.", e);
            AppConfig::default()
        }
    }
}

pub fn load_config() -> AppConfig {
    match config_path() {
        Ok(path) => load_config_from(&path),
        Err(e) => {
            log::warn!("{}. Using defaults.", e);
            AppConfig::default()
        }
    }
}

pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ReportError::Config(format!("Failed to create config directory: {}", e)))?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| ReportError::Config(format!("Failed to serialize config: {}", e)))?;

    std::fs::write(path, json)
        .map_err(|e| ReportError::Config(format!("Failed to write config file: {}", e)))?;

    Ok(())
}

pub fn save_config(config: &AppConfig) -> Result<()> {
    save_config_to(&config_path()?, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_upload_and_export_policy() {
        let config = AppConfig::default();
        assert_eq!(config.upload.max_bytes, 10 * 1024 * 1024);
        assert_eq!(config.export.scale, 2.0);
        assert_eq!(config.download.mode, DownloadMode::Direct);
        assert_eq!(config.export.background_rgba(), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"download": {"mode": "reveal"}}"#).unwrap();
        assert_eq!(config.download.mode, DownloadMode::Reveal);
        assert_eq!(config.upload.max_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert_eq!(load_config_from(&path), AppConfig::default());
        assert_eq!(load_config_from(&dir.path().join("missing.json")), AppConfig::default());
    }

    #[test]
    fn out_of_range_scale_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        std::fs::write(&path, r##"{"export": {"scale": 60.0, "background": "#000000"}}"##).unwrap();
        let config = load_config_from(&path);
        assert_eq!(config.export.scale, 2.0);
        assert_eq!(config.export.background, "#000000");

        std::fs::write(&path, r#"{"export": {"scale": -1.0}}"#).unwrap();
        assert_eq!(load_config_from(&path).export.scale, 2.0);

        std::fs::write(&path, r#"{"export": {"scale": 4.0}}"#).unwrap();
        assert_eq!(load_config_from(&path).export.scale, 4.0);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = AppConfig::default();
        config.export.scale = 3.0;
        config.download.directory = Some(dir.path().to_path_buf());

        save_config_to(&path, &config).unwrap();
        assert_eq!(load_config_from(&path), config);
        assert_eq!(config.download.resolve_directory().unwrap(), dir.path());
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#0f172a"), Some(Rgba([15, 23, 42, 255])));
        assert_eq!(parse_hex_color("0f172a"), None);
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gggggg"), None);
    }
}
