// Application settings
// Loaded from ~/.config/wildlens/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_EDIT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_CREATE_MODEL: &str = "gemini-3-pro-image-preview";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Service
    #[serde(rename = "api.base")]
    pub api_base: String,

    #[serde(rename = "api.timeoutSecs")]
    pub timeout_secs: u64,  // 0 = no timeout

    // Models
    #[serde(rename = "model.text")]
    pub text_model: String,

    #[serde(rename = "model.edit")]
    pub edit_model: String,

    #[serde(rename = "model.create")]
    pub create_model: String,

    // Sampling for species lookups
    #[serde(rename = "species.temperature")]
    pub temperature: f32,

    // Image generation
    #[serde(rename = "image.aspectRatio")]
    pub image_aspect_ratio: String,

    #[serde(rename = "image.size")]
    pub image_size: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: 120,
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            edit_model: DEFAULT_EDIT_MODEL.to_string(),
            create_model: DEFAULT_CREATE_MODEL.to_string(),
            temperature: 0.3,
            image_aspect_ratio: "4:3".to_string(),
            image_size: "1K".to_string(),
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wildlens");
        config_dir.join("settings.json")
    }

    /// Load settings from the default path, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`. A missing file is not an error.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No settings at {}, using defaults", path.display());
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                log::error!("Error parsing {}: {}", path.display(), e);
                log::error!("Using default settings");
                Self::default()
            }),
            Err(e) => {
                log::error!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON, ignoring lines that start with `//`.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned)
    }

    /// Save current settings to the default path
    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Request timeout, `None` when disabled.
    pub fn timeout(&self) -> Option<std::time::Duration> {
        (self.timeout_secs > 0).then(|| std::time::Duration::from_secs(self.timeout_secs))
    }

    /// Get the config file path for display
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}
