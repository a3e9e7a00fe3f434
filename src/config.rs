//! Configuration persistence for regionlens settings

use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Report accent color, stored as 0-1 channels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccentColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for AccentColor {
    fn default() -> Self {
        // #10B981
        Self {
            r: 16.0 / 255.0,
            g: 185.0 / 255.0,
            b: 129.0 / 255.0,
        }
    }
}

impl AccentColor {
    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            255,
        ]
    }
}

/// Common install locations of fonts with Devanagari coverage
const DEVANAGARI_FONTS: [&str; 6] = [
    "/usr/share/fonts/truetype/noto/NotoSansDevanagari-Regular.ttf",
    "/usr/share/fonts/noto/NotoSansDevanagari-Regular.ttf",
    "/usr/share/fonts/google-noto/NotoSansDevanagari-Regular.ttf",
    "/usr/share/fonts/opentype/noto/NotoSansDevanagari-Regular.otf",
    "/usr/share/fonts/truetype/lohit-devanagari/Lohit-Devanagari.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
];

/// Folder that receives reports when no output directory is given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SaveLocation {
    #[default]
    Pictures,
    Documents,
}

impl SaveLocation {
    pub fn dir(self) -> Option<PathBuf> {
        match self {
            SaveLocation::Pictures => {
                dirs::picture_dir().or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))
            }
            SaveLocation::Documents => {
                dirs::document_dir().or_else(|| dirs::home_dir().map(|h| h.join("Documents")))
            }
        }
    }
}

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionLensConfig {
    /// Base URL of the generative language API
    pub api_base_url: String,
    /// Model that writes the region caption
    pub caption_model: String,
    /// Image model that returns the segmented cutout
    pub segmentation_model: String,
    /// Model used to translate captions
    pub translation_model: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Smallest drag, in screen pixels, that counts as a selection
    pub min_selection_px: f32,
    /// Where reports are saved by default
    pub save_location: SaveLocation,
    /// Selection outline and title color in reports
    pub accent_color: AccentColor,
    /// Text-to-speech command
    pub speech_command: String,
    /// Fonts tried, in order, for characters the bundled Noto Sans lacks
    pub report_fonts: Vec<PathBuf>,
}

impl Default for RegionLensConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            caption_model: "gemini-2.5-flash".to_string(),
            segmentation_model: "gemini-2.5-flash-image-preview".to_string(),
            translation_model: "gemini-2.5-flash".to_string(),
            request_timeout_secs: 60,
            min_selection_px: crate::domain::MIN_SELECTION_PX,
            save_location: SaveLocation::Pictures,
            accent_color: AccentColor::default(),
            speech_command: "spd-say".to_string(),
            report_fonts: DEVANAGARI_FONTS.iter().map(PathBuf::from).collect(),
        }
    }
}

impl RegionLensConfig {
    /// Configuration directory name
    pub const ID: &'static str = "regionlens";

    /// Environment variables checked for the API key, in order
    pub const API_KEY_VARS: [&'static str; 2] = ["GEMINI_API_KEY", "API_KEY"];

    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            log::warn!("No config directory available, using defaults");
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::read(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {err:#}");
                Self::default()
            }
        }
    }

    fn read(path: &std::path::Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Save configuration to disk
    pub fn save(&self) {
        let Some(path) = Self::path() else {
            log::error!("No config directory available for saving");
            return;
        };
        if let Err(err) = self.write(&path) {
            log::error!("Failed to save config: {err:#}");
        }
    }

    fn write(&self, path: &std::path::Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw).with_context(|| format!("failed to write {}", path.display()))
    }

    /// API key from the environment; never stored in the config file
    pub fn api_key() -> Option<String> {
        Self::API_KEY_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|key| !key.trim().is_empty())
    }

    /// Directory for reports: the configured save location, else the working directory
    pub fn report_dir(&self) -> PathBuf {
        self.save_location
            .dir()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_accent_is_emerald() {
        assert_eq!(AccentColor::default().to_rgba_u8(), [16, 185, 129, 255]);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: RegionLensConfig =
            serde_json::from_str(r#"{ "caption_model": "custom-model" }"#).unwrap();
        assert_eq!(config.caption_model, "custom-model");
        assert_eq!(config.segmentation_model, "gemini-2.5-flash-image-preview");
        assert_eq!(config.min_selection_px, 5.0);
        assert!(
            config
                .report_fonts
                .iter()
                .any(|p| p.ends_with("NotoSansDevanagari-Regular.ttf"))
        );
    }

    #[test]
    fn config_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = RegionLensConfig {
            request_timeout_secs: 5,
            save_location: SaveLocation::Documents,
            ..Default::default()
        };
        config.write(&path).unwrap();
        assert_eq!(RegionLensConfig::read(&path).unwrap(), config);
    }

    #[test]
    fn corrupt_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(RegionLensConfig::read(&path).is_err());
    }
}
