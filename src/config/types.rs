// Configuration type definitions

use serde::Deserialize;

use super::chat_types::{ChatConfig, ProfileConfig};

/// Environment variable overriding the backend base path
pub const BACKEND_URL_ENV: &str = "BOOKBOT_BACKEND_URL";

/// Backend base path used when nothing is configured
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000/api";

/// Backend configuration section
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BackendConfig {
    /// Base path of the backend API (e.g. `https://book.example.org/api`)
    #[serde(default)]
    pub url: Option<String>,
}

impl BackendConfig {
    /// Resolve the backend base path: environment, then file, then default
    pub fn resolve_url(&self) -> String {
        resolve_url_with(std::env::var(BACKEND_URL_ENV).ok(), self.url.as_deref())
    }
}

fn resolve_url_with(env_url: Option<String>, file_url: Option<&str>) -> String {
    env_url
        .as_deref()
        .or(file_url)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .unwrap_or(DEFAULT_BACKEND_URL)
        .trim_end_matches('/')
        .to_string()
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
}
