// API credentials and resolved configuration
//
// The API key is looked up in:
// 1. System keychain (with the `keychain` feature)
// 2. WILDLENS_GEMINI_KEY
// 3. API_KEY (legacy name)
//
// Keys are NEVER stored in settings.json

use std::env;

use thiserror::Error;

use crate::settings::Settings;

/// Preferred environment variable for the API key
pub const API_KEY_ENV: &str = "WILDLENS_GEMINI_KEY";

/// Legacy environment variable, still honoured
pub const LEGACY_API_KEY_ENV: &str = "API_KEY";

/// Service name for keychain storage
#[cfg(feature = "keychain")]
const KEYCHAIN_SERVICE: &str = "wildlens";

/// Keychain account holding the key
#[cfg(feature = "keychain")]
const KEYCHAIN_ACCOUNT: &str = "ai/gemini";

/// Source of an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Keychain,
    /// WILDLENS_GEMINI_KEY or API_KEY
    Environment,
    None,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Keychain => "keychain",
            KeySource::Environment => "environment",
            KeySource::None => "none",
        }
    }
}

/// Result of key lookup
#[derive(Debug, Clone)]
pub struct KeyLookup {
    pub key: Option<String>,
    pub source: KeySource,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("no API key found; set WILDLENS_GEMINI_KEY (or API_KEY)")]
    MissingKey,
    #[error("keychain error: {0}")]
    Keychain(String),
}

/// Get the API key from keychain or environment
pub fn get_api_key() -> KeyLookup {
    #[cfg(feature = "keychain")]
    {
        if let Ok(entry) = keyring::Entry::new(KEYCHAIN_SERVICE, KEYCHAIN_ACCOUNT) {
            if let Ok(key) = entry.get_password() {
                if !key.trim().is_empty() {
                    return KeyLookup {
                        key: Some(key),
                        source: KeySource::Keychain,
                    };
                }
            }
        }
    }

    lookup_env_key(|name| env::var(name).ok())
}

/// Environment half of the lookup, with the reader injected for tests.
fn lookup_env_key(read: impl Fn(&str) -> Option<String>) -> KeyLookup {
    for name in [API_KEY_ENV, LEGACY_API_KEY_ENV] {
        if let Some(key) = read(name) {
            let key = key.trim();
            if !key.is_empty() {
                return KeyLookup {
                    key: Some(key.to_string()),
                    source: KeySource::Environment,
                };
            }
        }
    }

    KeyLookup {
        key: None,
        source: KeySource::None,
    }
}

/// Store the API key in the system keychain
#[cfg(feature = "keychain")]
pub fn set_api_key(key: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYCHAIN_SERVICE, KEYCHAIN_ACCOUNT)
        .map_err(|e| ConfigError::Keychain(format!("Failed to create keychain entry: {}", e)))?;

    entry
        .set_password(key)
        .map_err(|e| ConfigError::Keychain(format!("Failed to store key in keychain: {}", e)))
}

#[cfg(not(feature = "keychain"))]
pub fn set_api_key(_key: &str) -> Result<(), ConfigError> {
    Err(ConfigError::Keychain(format!(
        "Keychain support not enabled. Set {} instead.",
        API_KEY_ENV
    )))
}

/// Check if keychain support is available
pub fn keychain_available() -> bool {
    #[cfg(feature = "keychain")]
    {
        keyring::Entry::new(KEYCHAIN_SERVICE, "test").is_ok()
    }
    #[cfg(not(feature = "keychain"))]
    {
        false
    }
}

// ============================================================================
// Resolved configuration (single source of truth)
// ============================================================================

/// Status of the resolved configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigStatus {
    Ready,
    MissingKey,
}

impl ConfigStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::MissingKey => "missing_key",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// The effective configuration, resolved from settings and credentials.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub settings: Settings,
    pub api_key: Option<String>,
    pub key_source: KeySource,
    pub status: ConfigStatus,
    /// Human-readable reason if not ready
    pub blocking_reason: Option<String>,
}

impl ResolvedConfig {
    /// Resolve against the real key lookup.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_key_lookup(settings, get_api_key())
    }

    /// Resolve with an already performed key lookup.
    pub fn with_key_lookup(settings: &Settings, lookup: KeyLookup) -> Self {
        match lookup.key {
            Some(key) => Self {
                settings: settings.clone(),
                api_key: Some(key),
                key_source: lookup.source,
                status: ConfigStatus::Ready,
                blocking_reason: None,
            },
            None => {
                log::debug!("API key not found (checked keychain, {}, {})", API_KEY_ENV, LEGACY_API_KEY_ENV);
                Self {
                    settings: settings.clone(),
                    api_key: None,
                    key_source: KeySource::None,
                    status: ConfigStatus::MissingKey,
                    blocking_reason: Some(ConfigError::MissingKey.to_string()),
                }
            }
        }
    }

    /// Load settings and resolve in one call
    pub fn load() -> Self {
        Self::from_settings(&Settings::load())
    }

    /// The API key, or `MissingKey` so callers can stop at startup.
    /// Logs the missing key at `error`.
    pub fn require_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or_else(|| {
            log::error!("API key not found (checked keychain, {}, {})", API_KEY_ENV, LEGACY_API_KEY_ENV);
            ConfigError::MissingKey
        })
    }
}

// ============================================================================
// Diagnostics (for `wildlens doctor`)
// ============================================================================

#[derive(Debug)]
pub struct Diagnostics {
    pub status: ConfigStatus,
    pub key_present: bool,
    pub key_source: KeySource,
    pub keychain_available: bool,
    pub settings_path: String,
    pub settings: Settings,
}

impl Diagnostics {
    pub fn from_resolved(config: &ResolvedConfig) -> Self {
        Self {
            status: config.status,
            key_present: config.api_key.is_some(),
            key_source: config.key_source,
            keychain_available: keychain_available(),
            settings_path: Settings::config_path_display(),
            settings: config.settings.clone(),
        }
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = &self.settings;
        writeln!(f, "WildLens Configuration")?;
        writeln!(f, "──────────────────────────────")?;
        writeln!(f, "Status:            {}", self.status.as_str())?;
        writeln!(f, "Key present:       {}", if self.key_present { "yes" } else { "no" })?;
        writeln!(f, "Key source:        {}", self.key_source.as_str())?;
        writeln!(f, "Keychain available:{}", if self.keychain_available { "yes" } else { "no" })?;
        writeln!(f, "Settings file:     {}", self.settings_path)?;
        writeln!(f, "API base:          {}", s.api_base)?;
        match s.timeout() {
            Some(t) => writeln!(f, "Timeout:           {}s", t.as_secs())?,
            None => writeln!(f, "Timeout:           none")?,
        }
        writeln!(f, "Models:")?;
        writeln!(f, "  Text:            {}", s.text_model)?;
        writeln!(f, "  Image edit:      {}", s.edit_model)?;
        writeln!(f, "  Image create:    {}", s.create_model)?;
        Ok(())
    }
}
