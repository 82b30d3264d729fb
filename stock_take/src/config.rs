//! Configuration
//!
//! Settings come from an optional TOML file; command-line flags override
//! individual values. Everything has a default except the Firestore project.

use crate::error::{Result, StockError};
use crate::lookup::{OpenFoodFacts, OPEN_FOOD_FACTS_URL};
use crate::mirror::{LocalMirror, MIRROR_FILE};
use crate::store::{FirestoreStore, ItemStore, SqliteStore, FIRESTORE_BASE_URL};
use clap::ValueEnum;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stock_common::CategorySet;

const APP_DIR: &str = "stock_take";
const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "items.db";

/// Which item store to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Hosted Firestore collection
    #[default]
    Firestore,
    /// Local SQLite database
    Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub collection: String,
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            collection: "items".to_string(),
            api_key: None,
            base_url: FIRESTORE_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub enabled: bool,
    pub base_url: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: OPEN_FOOD_FACTS_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub category_set: CategorySet,
    pub backend: Backend,
    /// Directory for the local mirror and the SQLite database
    pub data_dir: Option<PathBuf>,
    /// Explicit SQLite database path (defaults to `items.db` in the data dir)
    pub database: Option<PathBuf>,
    pub firestore: FirestoreConfig,
    pub lookup: LookupConfig,
}

/// Returns the default config path: ~/.config/stock_take/config.toml
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(CONFIG_FILE)
}

/// Returns the default data directory: ~/.local/share/stock_take
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

impl Config {
    /// Parse a config from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load the config file.
    ///
    /// An explicitly given file must exist; a missing default file just
    /// means default settings.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_config_path(), false),
        };

        match std::fs::read_to_string(&path) {
            Ok(text) => {
                log::info!("Using config file: {}", path.display());
                Self::from_toml(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !explicit => {
                log::debug!("No config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(StockError::Config(format!("{}: {}", path.display(), e))),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn database_path(&self) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| self.data_dir().join(DATABASE_FILE))
    }

    pub fn mirror_path(&self) -> PathBuf {
        self.data_dir().join(MIRROR_FILE)
    }

    pub fn mirror(&self) -> LocalMirror {
        LocalMirror::new(self.mirror_path())
    }

    /// Open the configured item store
    pub fn open_store(&self) -> Result<Arc<dyn ItemStore>> {
        match self.backend {
            Backend::Firestore => {
                let fs = &self.firestore;
                if fs.project_id.trim().is_empty() {
                    return Err(StockError::Config(
                        "firestore.project_id is not set".to_string(),
                    ));
                }
                log::info!(
                    "Using Firestore collection '{}' in project '{}'",
                    fs.collection,
                    fs.project_id
                );
                Ok(Arc::new(
                    FirestoreStore::new(&fs.project_id, &fs.collection)
                        .with_base_url(&fs.base_url)
                        .with_api_key(fs.api_key.clone()),
                ))
            }
            Backend::Sqlite => Ok(Arc::new(SqliteStore::open(&self.database_path())?)),
        }
    }

    /// Product lookup client, unless lookups are switched off
    pub fn product_lookup(&self) -> Option<OpenFoodFacts> {
        self.lookup
            .enabled
            .then(|| OpenFoodFacts::new(&self.lookup.base_url))
    }
}
