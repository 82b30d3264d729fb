//! Shared types for stock tracking
//!
//! Items, category sets, the in-progress item form and the derived views
//! (full stock, shopping list, expiring soon). Nothing in here does I/O.

pub mod category;
pub mod error;
pub mod form;
pub mod item;
pub mod views;

pub use category::CategorySet;
pub use error::{Field, FormError};
pub use form::ItemDraft;
pub use item::{parse_loose, Item, ItemFields, ItemId};
pub use views::{expiry_view, group_by_category, search, shopping_view, stock_view, CategoryGroup};
