//! Error types for stock_take

use stock_common::{FormError, ItemId};
use thiserror::Error;

/// Unified error type for stock_take operations
#[derive(Debug, Error)]
pub enum StockError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Failed to parse or encode JSON
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// HTTP error status code
    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// File I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Config file could not be parsed
    #[error("Config error: {0}")]
    Config(String),
    /// Submitted form is incomplete or malformed
    #[error("Invalid item: {0}")]
    Form(#[from] FormError),
    /// No item with this id in the store or the local list
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),
    /// Remote store returned a document we could not map to an item
    #[error("Malformed document: {0}")]
    MalformedDocument(String),
    /// Barcode not known to the product catalog
    #[error("Product not found for barcode: {0}")]
    ProductNotFound(String),
}

impl From<toml::de::Error> for StockError {
    fn from(err: toml::de::Error) -> Self {
        StockError::Config(err.to_string())
    }
}

/// Result alias for stock_take operations
pub type Result<T> = std::result::Result<T, StockError>;
