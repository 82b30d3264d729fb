//! Remote item store
//!
//! The store is the authoritative copy of the item list. It assigns ids on
//! create; everything after that addresses items by id.

mod firestore;
mod sqlite;

pub use firestore::{FirestoreStore, DEFAULT_BASE_URL as FIRESTORE_BASE_URL};
pub use sqlite::SqliteStore;

use crate::error::Result;
use async_trait::async_trait;
use stock_common::{Item, ItemFields, ItemId};

/// CRUD access to the item collection
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// All items, in the store's natural order
    async fn list(&self) -> Result<Vec<Item>>;

    /// Store a new item and return the id the store assigned
    async fn create(&self, fields: &ItemFields) -> Result<ItemId>;

    /// Overwrite every field of an existing item
    async fn update(&self, id: &ItemId, fields: &ItemFields) -> Result<()>;

    /// Remove an item
    async fn delete(&self, id: &ItemId) -> Result<()>;
}
