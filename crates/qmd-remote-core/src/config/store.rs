//! Persisted remote configuration
//!
//! The config file is a single JSON document shared with other parts of qmd.
//! The store owns only the `remote` and `qmdDir` keys and preserves everything
//! else through read-merge-write.

use super::EndpointConfig;
use crate::error::Result;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

const REMOTE_KEY: &str = "remote";
const DIR_KEY: &str = "qmdDir";
const CONFIG_FILE_NAME: &str = "config.json";

/// JSON-backed store for remote endpoint settings
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store rooted at `dir`; the document lives at `dir/config.json`
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(CONFIG_FILE_NAME),
        }
    }

    /// Store at the default location (`QMD_CONFIG_DIR` or the user config dir)
    pub fn open_default() -> Self {
        Self::new(Self::default_dir())
    }

    /// Get default config directory
    pub fn default_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("QMD_CONFIG_DIR") {
            if !dir.trim().is_empty() {
                return PathBuf::from(dir);
            }
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the remote endpoint config. Missing or malformed state yields an empty config.
    pub fn load(&self) -> EndpointConfig {
        let mut doc = self.read_document();
        match doc.remove(REMOTE_KEY) {
            Some(value) => match serde_json::from_value::<EndpointConfig>(value) {
                Ok(config) => config.normalized(),
                Err(e) => {
                    tracing::debug!("Ignoring malformed remote config: {}", e);
                    EndpointConfig::default()
                }
            },
            None => EndpointConfig::default(),
        }
    }

    /// Replace the `remote` key, leaving other keys untouched
    pub fn save(&self, config: &EndpointConfig) -> Result<()> {
        let mut doc = self.read_document();
        doc.insert(
            REMOTE_KEY.to_string(),
            serde_json::to_value(config.clone().normalized())?,
        );
        self.write_document(&doc)
    }

    /// Remove the `remote` key
    pub fn clear(&self) -> Result<()> {
        self.remove_key(REMOTE_KEY)
    }

    /// Load the persisted qmd directory path
    pub fn load_dir(&self) -> Option<PathBuf> {
        self.read_document()
            .get(DIR_KEY)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    }

    /// Persist the qmd directory path
    pub fn save_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        let mut doc = self.read_document();
        doc.insert(
            DIR_KEY.to_string(),
            Value::String(dir.as_ref().to_string_lossy().into_owned()),
        );
        self.write_document(&doc)
    }

    /// Remove the persisted qmd directory path
    pub fn clear_dir(&self) -> Result<()> {
        self.remove_key(DIR_KEY)
    }

    fn remove_key(&self, key: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut doc = self.read_document();
        if doc.remove(key).is_some() {
            self.write_document(&doc)?;
        }
        Ok(())
    }

    /// Read the whole document, treating a missing or corrupt file as empty
    fn read_document(&self) -> Map<String, Value> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return Map::new(),
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                tracing::debug!("Config at {} is not a JSON object", self.path.display());
                Map::new()
            }
            Err(e) => {
                tracing::debug!("Config at {} is malformed: {}", self.path.display(), e);
                Map::new()
            }
        }
    }

    fn write_document(&self, doc: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(doc)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}
