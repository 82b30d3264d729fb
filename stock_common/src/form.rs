//! The in-progress item form
//!
//! Holds exactly what the user has typed so far. Validation turns it into
//! [`ItemFields`] or reports the first field that is missing or malformed.

use crate::category::CategorySet;
use crate::error::{Field, FormError};
use crate::item::ItemFields;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used for expiry text (what a date input produces)
pub const EXPIRY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub quantity: String,
    pub threshold: String,
    pub expiry: String,
    pub category: String,
}

impl ItemDraft {
    /// Empty form with the set's default category selected
    pub fn new(set: CategorySet) -> Self {
        Self {
            category: set.default_category().to_string(),
            ..Self::default()
        }
    }

    /// Load an existing record for editing
    pub fn from_fields(fields: &ItemFields) -> Self {
        Self {
            name: fields.name.clone(),
            quantity: fields.quantity.clone(),
            threshold: fields.threshold.clone(),
            expiry: fields
                .expiry
                .map(|d| d.format(EXPIRY_FORMAT).to_string())
                .unwrap_or_default(),
            category: fields.category.clone(),
        }
    }

    /// Nothing typed yet (category is ignored, it always has a value)
    pub fn is_blank(&self) -> bool {
        [&self.name, &self.quantity, &self.threshold, &self.expiry]
            .iter()
            .all(|s| s.trim().is_empty())
    }

    /// Check required fields and build the record to store
    pub fn validate(&self, set: CategorySet) -> Result<ItemFields, FormError> {
        require(&self.name, Field::Name)?;
        require(&self.quantity, Field::Quantity)?;
        require(&self.threshold, Field::Threshold)?;

        let expiry = match self.expiry.trim() {
            "" if set.expiry_required() => return Err(FormError::Missing(Field::Expiry)),
            "" => None,
            text => Some(
                NaiveDate::parse_from_str(text, EXPIRY_FORMAT)
                    .map_err(|_| FormError::InvalidExpiry(text.to_string()))?,
            ),
        };

        if !set.contains(&self.category) {
            return Err(FormError::UnknownCategory(self.category.clone()));
        }

        Ok(ItemFields {
            name: self.name.trim().to_string(),
            quantity: self.quantity.trim().to_string(),
            threshold: self.threshold.trim().to_string(),
            category: self.category.clone(),
            expiry,
        })
    }
}

fn require(value: &str, field: Field) -> Result<(), FormError> {
    if value.trim().is_empty() {
        Err(FormError::Missing(field))
    } else {
        Ok(())
    }
}
