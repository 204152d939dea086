// Configuration loading

pub mod credentials;
pub mod settings;

pub use credentials::{
    get_api_key, keychain_available, set_api_key, ConfigError, ConfigStatus, Diagnostics, KeyLookup,
    KeySource, ResolvedConfig, API_KEY_ENV, LEGACY_API_KEY_ENV,
};
pub use settings::Settings;
