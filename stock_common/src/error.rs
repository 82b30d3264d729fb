//! Validation errors for the item form

use std::fmt;
use thiserror::Error;

/// A field of the item form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Quantity,
    Threshold,
    Category,
    Expiry,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Name => "name",
            Field::Quantity => "quantity",
            Field::Threshold => "threshold",
            Field::Category => "category",
            Field::Expiry => "expiry",
        };
        f.write_str(name)
    }
}

/// Why a submitted item form was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("missing required field: {0}")]
    Missing(Field),
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error("invalid expiry date (expected YYYY-MM-DD): {0}")]
    InvalidExpiry(String),
}

impl FormError {
    /// The field the error refers to
    pub fn field(&self) -> Field {
        match self {
            FormError::Missing(field) => *field,
            FormError::UnknownCategory(_) => Field::Category,
            FormError::InvalidExpiry(_) => Field::Expiry,
        }
    }
}
