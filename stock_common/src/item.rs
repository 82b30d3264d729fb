//! Item records
//!
//! Quantity and threshold are kept as the text the user typed; numeric
//! comparisons go through [`parse_loose`] at the point of use.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned by the remote store when an item is created
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Everything about an item except its identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemFields {
    pub name: String,
    pub quantity: String,
    pub threshold: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<NaiveDate>,
}

impl ItemFields {
    /// Quantity as a number (NaN when it does not start with one)
    pub fn quantity_value(&self) -> f64 {
        parse_loose(&self.quantity)
    }

    /// Threshold as a number (NaN when it does not start with one)
    pub fn threshold_value(&self) -> f64 {
        parse_loose(&self.threshold)
    }

    /// Stock is at or below the reorder threshold.
    ///
    /// Any NaN side makes the comparison false, so items with non-numeric
    /// quantity or threshold never show up on the shopping list.
    pub fn is_low_stock(&self) -> bool {
        self.quantity_value() <= self.threshold_value()
    }

    /// Expiry falls on `today` or the day after
    pub fn expires_within_a_day(&self, today: NaiveDate) -> bool {
        match self.expiry {
            Some(expiry) => {
                expiry == today || today.checked_add_days(Days::new(1)) == Some(expiry)
            }
            None => false,
        }
    }
}

/// A persisted item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(flatten)]
    pub fields: ItemFields,
}

impl Item {
    pub fn new(id: ItemId, fields: ItemFields) -> Self {
        Self { id, fields }
    }

    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn category(&self) -> &str {
        &self.fields.category
    }
}

/// Lenient number parsing for quantity/threshold text.
///
/// Reads the longest numeric prefix after leading whitespace (optional sign,
/// digits with an optional fraction, optional exponent, or `Infinity`) and
/// ignores whatever follows. Returns NaN when there is no numeric prefix.
pub fn parse_loose(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let len = bytes.len();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let mut saw_digit = false;
    while end < len && bytes[end].is_ascii_digit() {
        end += 1;
        saw_digit = true;
    }
    if end < len && bytes[end] == b'.' {
        end += 1;
        while end < len && bytes[end].is_ascii_digit() {
            end += 1;
            saw_digit = true;
        }
    }
    if !saw_digit {
        return f64::NAN;
    }

    if end < len && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp = end + 1;
        if exp < len && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        let exp_digits = exp;
        while exp < len && bytes[exp].is_ascii_digit() {
            exp += 1;
        }
        if exp > exp_digits {
            end = exp;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}
