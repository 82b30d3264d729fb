//! Stock Take - pantry and bar stock tracker
//!
//! Keeps a list of consumables (quantity, reorder threshold, category and
//! expiry) in a remote item store, mirrors it locally as a fallback, and
//! derives the shopping list and the expiring-soon list from it. Barcodes can
//! be scanned and resolved to product names to speed up data entry.

pub mod config;
pub mod controller;
pub mod error;
pub mod lookup;
pub mod mirror;
pub mod scanner;
pub mod store;

pub use config::{Backend, Config};
pub use controller::{today, Confirm, LoadSource, ScanReport, StockController, Submitted, Tab};
pub use error::{Result, StockError};
pub use lookup::{OpenFoodFacts, ProductLookup};
pub use mirror::LocalMirror;
pub use scanner::{CaptureSource, Detection, LineSource, ScanOutcome, ScanSession, Symbology};
pub use store::{FirestoreStore, ItemStore, SqliteStore};
