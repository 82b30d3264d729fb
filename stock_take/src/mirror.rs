//! Local mirror of the item list
//!
//! A single JSON file holding the last item list read from the remote store.
//! It is only a fallback for display when the store cannot be reached; it is
//! refreshed after a successful load or an explicit sync, never per mutation.

use crate::error::Result;
use std::path::{Path, PathBuf};
use stock_common::Item;

/// File name used inside the data directory
pub const MIRROR_FILE: &str = "items.json";

pub struct LocalMirror {
    path: PathBuf,
}

impl LocalMirror {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Mirror stored under the default data directory
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(MIRROR_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the mirrored list.
    ///
    /// Returns `None` when there is no mirror yet or it cannot be read; a
    /// corrupt mirror is treated like a missing one.
    pub fn load(&self) -> Option<Vec<Item>> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No local mirror at {}", self.path.display());
                return None;
            }
            Err(e) => {
                log::warn!("Failed to read local mirror {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<Vec<Item>>(&json) {
            Ok(items) => {
                log::info!("Loaded {} items from local mirror", items.len());
                Some(items)
            }
            Err(e) => {
                log::warn!("Failed to parse local mirror, ignoring it: {}", e);
                None
            }
        }
    }

    /// Replace the mirrored list
    pub fn save(&self, items: &[Item]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(items)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        log::debug!(
            "Wrote {} items to local mirror {}",
            items.len(),
            self.path.display()
        );
        Ok(())
    }
}
