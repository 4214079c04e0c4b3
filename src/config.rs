use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::fallback::Catalog;
use crate::pagination::DEFAULT_PAGE_SIZE;

pub const API_KEY_VAR: &str = "SERPAPI_KEY";
pub const ENDPOINT_VAR: &str = "SCOUT_ENDPOINT";

/// Settings loaded from `config.json`, then overridden by the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SerpAPI key. Without one every search falls back to sample listings.
    pub api_key: Option<String>,

    /// Search endpoint (SerpAPI-compatible)
    pub endpoint: String,

    /// Provider engine name
    pub engine: String,

    /// Result language (`hl` parameter)
    pub language: String,

    /// Listings per displayed page
    pub page_size: usize,

    /// Upstream request timeout
    pub timeout_secs: u64,

    /// Optional JSON file replacing parts of the built-in fallback catalog
    pub catalog_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://serpapi.com/search.json".to_string(),
            engine: "google_jobs".to_string(),
            language: "en".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: 20,
            catalog_path: None,
        }
    }
}

impl Config {
    /// Loads `path` if given (it must exist), else the platform config file
    /// if present, else defaults. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(p) => Self::from_file(&p)?,
                None => Self::default(),
            },
        };
        config.apply_overrides(|name| env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "scout").map(|dirs| dirs.config_dir().join("config.json"))
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_VAR).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key.trim().to_string());
        }
        if let Some(endpoint) = lookup(ENDPOINT_VAR).filter(|e| !e.trim().is_empty()) {
            self.endpoint = endpoint.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(anyhow!("Search endpoint must not be empty"));
        }
        if self.page_size == 0 {
            return Err(anyhow!("page_size must be at least 1"));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("timeout_secs must be at least 1"));
        }
        Ok(())
    }

    /// Built-in catalog, or the configured file layered over it.
    pub fn load_catalog(&self) -> Result<Catalog> {
        let Some(path) = &self.catalog_path else {
            return Ok(Catalog::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse catalog file: {}", path.display()))
    }
}
