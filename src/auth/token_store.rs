//! Persistent key/value storage for the auth token
//!
//! A small JSON object on disk, read and rewritten on every access. Only
//! the `auth_token` key is used today.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::AUTH_TOKEN_KEY;

const STORAGE_FILE: &str = "storage.json";

#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the bookbot config directory
    pub fn default_location() -> Self {
        Self::new(crate::config::config_dir().join(STORAGE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> io::Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => serde_json::from_str(&contents).map_err(io::Error::other),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e),
        }
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(items).map_err(io::Error::other)?;
        fs::write(&self.path, json)
    }

    /// Missing or unreadable storage reads as empty
    pub fn get_item(&self, key: &str) -> Option<String> {
        match self.read_all() {
            Ok(mut items) => items.remove(key),
            Err(e) => {
                log::debug!("Token storage {:?} unreadable: {}", self.path, e);
                None
            }
        }
    }

    pub fn set_item(&self, key: &str, value: &str) -> io::Result<()> {
        // A corrupt file is replaced rather than blocking login
        let mut items = self.read_all().unwrap_or_default();
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    pub fn remove_item(&self, key: &str) -> io::Result<()> {
        let mut items = self.read_all().unwrap_or_default();
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }

    pub fn load(&self) -> Option<String> {
        self.get_item(AUTH_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn save(&self, token: &str) -> io::Result<()> {
        self.set_item(AUTH_TOKEN_KEY, token)
    }

    pub fn clear(&self) -> io::Result<()> {
        self.remove_item(AUTH_TOKEN_KEY)
    }
}
