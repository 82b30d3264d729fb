//! SQLite-backed item store
//!
//! Same contract as the hosted collection, for self-hosted setups and tests.
//! Uses parameterized queries exclusively (no SQL string concatenation).

use super::ItemStore;
use crate::error::{Result, StockError};
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use stock_common::{Item, ItemFields, ItemId};

/// Item store in a local SQLite database file
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

/// Initialize the database schema
///
/// Items are listed in insertion order (rowid), which keeps edits in place.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS items (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            quantity TEXT NOT NULL,
            threshold TEXT NOT NULL,
            category TEXT NOT NULL,
            expiry TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_items_category ON items(category);
        ",
    )?;

    log::debug!("Item schema initialized");
    Ok(())
}

impl SqliteStore {
    /// Open (or create) the database file and initialize the schema
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                log::info!("Created directory: {}", parent.display());
            }
        }
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        log::info!("Opened item database: {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Fresh in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of stored items
    pub fn count(&self) -> Result<i64> {
        let conn = self.lock();
        Ok(conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?)
    }

    /// Look up a single item
    pub fn get(&self, id: &ItemId) -> Result<Option<Item>> {
        let conn = self.lock();
        let item = conn
            .query_row(
                "SELECT id, name, quantity, threshold, category, expiry
                 FROM items WHERE id = ?1",
                params![id.as_str()],
                item_from_row,
            )
            .optional()?;
        Ok(item)
    }
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    let id: String = row.get(0)?;
    let expiry: Option<String> = row.get(5)?;
    let expiry = expiry.and_then(|text| match NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            log::warn!("Ignoring unreadable expiry '{}' on item {}", text, id);
            None
        }
    });

    Ok(Item::new(
        ItemId::new(id),
        ItemFields {
            name: row.get(1)?,
            quantity: row.get(2)?,
            threshold: row.get(3)?,
            category: row.get(4)?,
            expiry,
        },
    ))
}

fn expiry_text(fields: &ItemFields) -> Option<String> {
    fields.expiry.map(|d| d.format("%Y-%m-%d").to_string())
}

#[async_trait]
impl ItemStore for SqliteStore {
    async fn list(&self) -> Result<Vec<Item>> {
        let conn = self.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, name, quantity, threshold, category, expiry
             FROM items ORDER BY rowid",
        )?;
        let items = stmt
            .query_map([], item_from_row)?
            .collect::<rusqlite::Result<Vec<Item>>>()?;

        log::debug!("Loaded {} items from database", items.len());
        Ok(items)
    }

    async fn create(&self, fields: &ItemFields) -> Result<ItemId> {
        let id = ItemId::new(uuid::Uuid::new_v4().simple().to_string());
        let conn = self.lock();
        conn.execute(
            "INSERT INTO items (id, name, quantity, threshold, category, expiry)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id.as_str(),
                &fields.name,
                &fields.quantity,
                &fields.threshold,
                &fields.category,
                expiry_text(fields),
            ],
        )?;

        log::info!("Created item {} ('{}')", id, fields.name);
        Ok(id)
    }

    async fn update(&self, id: &ItemId, fields: &ItemFields) -> Result<()> {
        let conn = self.lock();
        let changed = conn.execute(
            "UPDATE items
             SET name = ?2, quantity = ?3, threshold = ?4, category = ?5, expiry = ?6,
                 updated_at = datetime('now')
             WHERE id = ?1",
            params![
                id.as_str(),
                &fields.name,
                &fields.quantity,
                &fields.threshold,
                &fields.category,
                expiry_text(fields),
            ],
        )?;

        if changed == 0 {
            return Err(StockError::ItemNotFound(id.clone()));
        }
        log::info!("Updated item {}", id);
        Ok(())
    }

    async fn delete(&self, id: &ItemId) -> Result<()> {
        let conn = self.lock();
        let changed = conn.execute("DELETE FROM items WHERE id = ?1", params![id.as_str()])?;

        if changed == 0 {
            return Err(StockError::ItemNotFound(id.clone()));
        }
        log::info!("Deleted item {}", id);
        Ok(())
    }
}
