// Configuration module for bookbot
// This module handles loading and parsing configuration from ~/.config/bookbot/config.toml

pub mod chat_types;
pub mod types;

pub use types::{BackendConfig, Config};

use std::fs;
use std::path::{Path, PathBuf};

/// Result of loading configuration
pub struct ConfigResult {
    pub config: Config,
    pub warning: Option<String>,
}

/// Loads configuration from ~/.config/bookbot/config.toml
/// Returns default configuration if file doesn't exist or on parse errors
pub fn load_config() -> ConfigResult {
    load_config_from(&get_config_path())
}

/// Loads configuration from an explicit path
pub fn load_config_from(config_path: &Path) -> ConfigResult {
    #[cfg(debug_assertions)]
    log::debug!("Loading config from {:?}", config_path);

    // If file doesn't exist, return defaults silently
    if !config_path.exists() {
        #[cfg(debug_assertions)]
        log::debug!("Config file does not exist, using defaults");
        return ConfigResult {
            config: Config::default(),
            warning: None,
        };
    }

    let contents = match fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            #[cfg(debug_assertions)]
            log::error!("Failed to read config file {:?}: {}", config_path, e);
            return ConfigResult {
                config: Config::default(),
                warning: Some(format!("Failed to read config: {}", e)),
            };
        }
    };

    match toml::from_str::<Config>(&contents) {
        Ok(config) => {
            #[cfg(debug_assertions)]
            log::debug!("Config parsed successfully: backend={:?}", config.backend.url);
            ConfigResult {
                config,
                warning: None,
            }
        }
        Err(e) => {
            #[cfg(debug_assertions)]
            log::error!("Failed to parse config file {:?}: {}", config_path, e);
            ConfigResult {
                config: Config::default(),
                warning: Some(format!("Invalid config: {}", e)),
            }
        }
    }
}

/// Directory holding bookbot's config and stored auth token
///
/// Always uses ~/.config/bookbot on all platforms for consistency.
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("bookbot")
}

/// Returns the path to the configuration file
fn get_config_path() -> PathBuf {
    config_dir().join("config.toml")
}
