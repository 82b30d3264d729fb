//! Product lookup by barcode
//!
//! Queries the Open Food Facts catalog for a product name. One attempt per
//! scan; callers treat any error as "not recognized".

use crate::error::{Result, StockError};
use async_trait::async_trait;
use serde::Deserialize;

/// Public Open Food Facts endpoint
pub const OPEN_FOOD_FACTS_URL: &str = "https://world.openfoodfacts.org";

const USER_AGENT: &str = "stock_take/0.1";

/// Resolve a barcode to a product name
#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn product_name(&self, barcode: &str) -> Result<String>;
}

/// Open Food Facts product response
#[derive(Debug, Deserialize)]
pub struct ProductResponse {
    /// 1 when the product is known, 0 otherwise
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub product: Option<Product>,
}

#[derive(Debug, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub product_name: Option<String>,
    /// Comma-separated brand list
    #[serde(default)]
    pub brands: Option<String>,
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

impl ProductResponse {
    /// Product name, if the catalog recognized the code.
    ///
    /// Falls back to the first brand for products entered without a name.
    pub fn name(&self) -> Option<&str> {
        if self.status != 1 {
            return None;
        }
        let product = self.product.as_ref()?;
        non_blank(product.product_name.as_deref()).or_else(|| {
            product
                .brands
                .as_deref()
                .and_then(|b| non_blank(b.split(',').next()))
        })
    }
}

/// Open Food Facts client
pub struct OpenFoodFacts {
    client: reqwest::Client,
    base_url: String,
}

impl Default for OpenFoodFacts {
    fn default() -> Self {
        Self::new(OPEN_FOOD_FACTS_URL)
    }
}

impl OpenFoodFacts {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ProductLookup for OpenFoodFacts {
    async fn product_name(&self, barcode: &str) -> Result<String> {
        let url = format!(
            "{}/api/v0/product/{}.json",
            self.base_url,
            urlencoding::encode(barcode)
        );

        log::debug!("Looking up barcode {}", barcode);

        let response = self
            .client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        if !response.status().is_success() {
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(StockError::ProductNotFound(barcode.to_string()));
            }
            return Err(StockError::HttpStatus(response.status()));
        }

        let body: ProductResponse = response.json().await?;
        match body.name() {
            Some(name) => {
                log::info!("Barcode {} is '{}'", barcode, name);
                Ok(name.to_string())
            }
            None => Err(StockError::ProductNotFound(barcode.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "lookup_tests.rs"]
mod tests;
