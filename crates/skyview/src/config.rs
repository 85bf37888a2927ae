//! Configuration

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{cache::DEFAULT_MAX_ENTRIES, dataset::WeatherKind};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    dataset: Option<PathBuf>,
    default_weather: Vec<WeatherKind>,
    cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    max_entries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset: None,
            default_weather: WeatherKind::ALL.to_vec(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl Config {
    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(Error::Toml)
    }

    #[must_use]
    pub fn to_toml(&self) -> String {
        toml::to_string(self).expect("Cannot serialize configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    #[must_use]
    pub fn dataset(&self) -> Option<&Path> {
        self.dataset.as_deref()
    }

    #[must_use]
    pub fn with_dataset(mut self, path: impl Into<PathBuf>) -> Self {
        self.dataset = Some(path.into());
        self
    }

    #[must_use]
    pub fn default_weather(&self) -> &[WeatherKind] {
        &self.default_weather
    }

    #[must_use]
    pub const fn cache_max_entries(&self) -> usize {
        self.cache.max_entries
    }
}
