//! Category sets
//!
//! Each deployment tracks one kind of stock. The kind fixes the list of
//! categories an item may belong to and whether an expiry date is required.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const PANTRY: &[&str] = &["Dry", "Fresh", "Frozen", "Dessert"];
const BAR: &[&str] = &["spirits", "wines", "bottles", "softs", "barrels", "postmix"];

/// The kind of stock being tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategorySet {
    /// Food stock: every item carries an expiry date
    #[default]
    Pantry,
    /// Bar stock: expiry is optional
    Bar,
}

impl CategorySet {
    /// Categories in display order
    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            CategorySet::Pantry => PANTRY,
            CategorySet::Bar => BAR,
        }
    }

    /// Category preselected in an empty form
    pub fn default_category(&self) -> &'static str {
        self.categories()[0]
    }

    /// Exact, case-sensitive membership check
    pub fn contains(&self, category: &str) -> bool {
        self.categories().contains(&category)
    }

    pub fn expiry_required(&self) -> bool {
        matches!(self, CategorySet::Pantry)
    }
}

impl fmt::Display for CategorySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategorySet::Pantry => f.write_str("pantry"),
            CategorySet::Bar => f.write_str("bar"),
        }
    }
}

impl FromStr for CategorySet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pantry" | "food" => Ok(CategorySet::Pantry),
            "bar" => Ok(CategorySet::Bar),
            other => Err(format!("unknown category set '{}' (expected pantry or bar)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pantry_defaults_to_dry() {
        assert_eq!(CategorySet::Pantry.default_category(), "Dry");
        assert!(CategorySet::Pantry.expiry_required());
    }

    #[test]
    fn test_bar_does_not_require_expiry() {
        assert_eq!(CategorySet::Bar.default_category(), "spirits");
        assert!(!CategorySet::Bar.expiry_required());
        assert_eq!(CategorySet::Bar.categories().len(), 6);
    }

    #[test]
    fn test_membership_is_case_sensitive() {
        assert!(CategorySet::Pantry.contains("Fresh"));
        assert!(!CategorySet::Pantry.contains("fresh"));
        assert!(!CategorySet::Pantry.contains("wines"));
    }

    #[test]
    fn test_parses_from_config_text() {
        assert_eq!("Bar".parse::<CategorySet>(), Ok(CategorySet::Bar));
        assert_eq!(" pantry ".parse::<CategorySet>(), Ok(CategorySet::Pantry));
        assert!("garage".parse::<CategorySet>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for set in [CategorySet::Pantry, CategorySet::Bar] {
            assert_eq!(set.to_string().parse::<CategorySet>(), Ok(set));
        }
    }
}
