//! Derived views over the item list
//!
//! All views are recomputed from the full list on demand and return
//! references, so each row still carries its [`ItemId`](crate::ItemId).

use crate::category::CategorySet;
use crate::item::Item;
use chrono::NaiveDate;

/// Items of one category, in list order
pub fn stock_view<'a>(items: &'a [Item], category: &str) -> Vec<&'a Item> {
    items.iter().filter(|i| i.category() == category).collect()
}

/// Items at or below their reorder threshold
pub fn shopping_view(items: &[Item]) -> Vec<&Item> {
    items.iter().filter(|i| i.fields.is_low_stock()).collect()
}

/// Items expiring today or tomorrow
pub fn expiry_view(items: &[Item], today: NaiveDate) -> Vec<&Item> {
    items
        .iter()
        .filter(|i| i.fields.expires_within_a_day(today))
        .collect()
}

/// Case-insensitive substring search on name within a category.
///
/// An empty (or whitespace) term matches every item of the category.
pub fn search<'a>(items: &'a [Item], category: &str, term: &str) -> Vec<&'a Item> {
    let needle = term.trim().to_lowercase();
    stock_view(items, category)
        .into_iter()
        .filter(|i| needle.is_empty() || i.name().to_lowercase().contains(&needle))
        .collect()
}

/// Items of one category within a view
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup<'a> {
    pub category: &'static str,
    pub items: Vec<&'a Item>,
}

impl CategoryGroup<'_> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Split a view into one group per category of the set, in set order.
///
/// Every category gets a group (possibly empty); items whose category is not
/// part of the set are left out.
pub fn group_by_category<'a>(items: &[&'a Item], set: CategorySet) -> Vec<CategoryGroup<'a>> {
    set.categories()
        .iter()
        .map(|&category| CategoryGroup {
            category,
            items: items
                .iter()
                .copied()
                .filter(|i| i.category() == category)
                .collect(),
        })
        .collect()
}
