//! Hosted document collection over the Firestore REST API
//!
//! Each item is one document in a collection. Every field is written as a
//! string value; documents written by other clients may carry numbers or
//! timestamps, which are read back as text.

use super::ItemStore;
use crate::error::{Result, StockError};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use stock_common::{Item, ItemFields, ItemId};

/// Public Firestore REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Documents per list request
const PAGE_SIZE: u32 = 300;

/// Fields written on update; a field in the mask but absent from the body is cleared
const FIELD_PATHS: [&str; 5] = ["name", "quantity", "threshold", "category", "expiry"];

/// A typed Firestore value (only the variants we read or write)
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Value {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    integer_value: Option<String>,
    /// A JSON number, or a string for NaN and the infinities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    double_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp_value: Option<String>,
}

impl Value {
    fn string(text: impl Into<String>) -> Self {
        Self {
            string_value: Some(text.into()),
            ..Self::default()
        }
    }

    fn as_text(&self) -> Option<String> {
        if let Some(ref s) = self.string_value {
            return Some(s.clone());
        }
        if let Some(ref i) = self.integer_value {
            return Some(i.clone());
        }
        match self.double_value {
            Some(serde_json::Value::String(ref s)) => return Some(s.clone()),
            Some(serde_json::Value::Number(ref n)) => return Some(n.to_string()),
            _ => {}
        }
        self.timestamp_value.clone()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    fields: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Document>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl Document {
    fn from_fields(fields: &ItemFields) -> Self {
        let mut map = BTreeMap::new();
        map.insert("name".to_string(), Value::string(&fields.name));
        map.insert("quantity".to_string(), Value::string(&fields.quantity));
        map.insert("threshold".to_string(), Value::string(&fields.threshold));
        map.insert("category".to_string(), Value::string(&fields.category));
        if let Some(expiry) = fields.expiry {
            map.insert(
                "expiry".to_string(),
                Value::string(expiry.format("%Y-%m-%d").to_string()),
            );
        }
        Self {
            name: None,
            fields: map,
        }
    }

    /// Last path segment of the document name
    fn id(&self) -> Option<ItemId> {
        self.name
            .as_deref()
            .and_then(|n| n.rsplit('/').next())
            .filter(|id| !id.is_empty())
            .map(ItemId::from)
    }

    fn text(&self, field: &str) -> Option<String> {
        self.fields.get(field).and_then(Value::as_text)
    }

    fn into_item(self) -> Result<Item> {
        let id = self
            .id()
            .ok_or_else(|| StockError::MalformedDocument("document without name".to_string()))?;
        let name = self
            .text("name")
            .ok_or_else(|| StockError::MalformedDocument(format!("{}: missing name", id)))?;

        let expiry = self.text("expiry").and_then(|text| {
            let date = parse_expiry(&text);
            if date.is_none() {
                log::warn!("Ignoring unreadable expiry '{}' on item {}", text, id);
            }
            date
        });

        Ok(Item::new(
            id,
            ItemFields {
                name,
                quantity: self.text("quantity").unwrap_or_default(),
                threshold: self.text("threshold").unwrap_or_default(),
                category: self.text("category").unwrap_or_default(),
                expiry,
            },
        ))
    }
}

/// Read the calendar date from "YYYY-MM-DD" or an RFC 3339 timestamp
fn parse_expiry(text: &str) -> Option<NaiveDate> {
    let date: String = text.trim().chars().take(10).collect();
    NaiveDate::parse_from_str(&date, "%Y-%m-%d").ok()
}

/// Item collection in a Firestore database
pub struct FirestoreStore {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    collection: String,
    api_key: Option<String>,
}

impl FirestoreStore {
    pub fn new(project_id: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            project_id: project_id.into(),
            collection: collection.into(),
            api_key: None,
        }
    }

    /// Point the client at another endpoint (emulator, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            self.base_url, self.project_id, self.collection
        )
    }

    fn document_url(&self, id: &ItemId) -> String {
        format!(
            "{}/{}",
            self.collection_url(),
            urlencoding::encode(id.as_str())
        )
    }

    fn key_param(&self) -> Vec<(&'static str, String)> {
        match self.api_key {
            Some(ref key) => vec![("key", key.clone())],
            None => Vec::new(),
        }
    }
}

/// Map a non-success response to an error; 404 means the item is gone
async fn check_status(
    response: reqwest::Response,
    id: Option<&ItemId>,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        if let Some(id) = id {
            return Err(StockError::ItemNotFound(id.clone()));
        }
    }
    let body = response.text().await.unwrap_or_default();
    log::error!("Firestore request failed ({}): {}", status, body);
    Err(StockError::HttpStatus(status))
}

#[async_trait]
impl ItemStore for FirestoreStore {
    async fn list(&self) -> Result<Vec<Item>> {
        let url = self.collection_url();
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = self.key_param();
            query.push(("pageSize", PAGE_SIZE.to_string()));
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            log::debug!("Listing documents from {}", url);
            let response = self.client.get(&url).query(&query).send().await?;
            let page: ListResponse = check_status(response, None).await?.json().await?;

            for document in page.documents {
                match document.into_item() {
                    Ok(item) => items.push(item),
                    Err(e) => log::warn!("Skipping document: {}", e),
                }
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        log::info!("Loaded {} items from Firestore", items.len());
        Ok(items)
    }

    async fn create(&self, fields: &ItemFields) -> Result<ItemId> {
        log::debug!("Creating document for '{}'", fields.name);
        let response = self
            .client
            .post(self.collection_url())
            .query(&self.key_param())
            .json(&Document::from_fields(fields))
            .send()
            .await?;

        let created: Document = check_status(response, None).await?.json().await?;
        let id = created.id().ok_or_else(|| {
            StockError::MalformedDocument("create response without document name".to_string())
        })?;

        log::info!("Created item {} ('{}')", id, fields.name);
        Ok(id)
    }

    async fn update(&self, id: &ItemId, fields: &ItemFields) -> Result<()> {
        let mut query = self.key_param();
        query.extend(
            FIELD_PATHS
                .iter()
                .map(|path| ("updateMask.fieldPaths", path.to_string())),
        );
        query.push(("currentDocument.exists", "true".to_string()));

        log::debug!("Updating document {}", id);
        let response = self
            .client
            .patch(self.document_url(id))
            .query(&query)
            .json(&Document::from_fields(fields))
            .send()
            .await?;
        check_status(response, Some(id)).await?;

        log::info!("Updated item {}", id);
        Ok(())
    }

    async fn delete(&self, id: &ItemId) -> Result<()> {
        let mut query = self.key_param();
        query.push(("currentDocument.exists", "true".to_string()));

        log::debug!("Deleting document {}", id);
        let response = self
            .client
            .delete(self.document_url(id))
            .query(&query)
            .send()
            .await?;
        check_status(response, Some(id)).await?;

        log::info!("Deleted item {}", id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "firestore_tests.rs"]
mod tests;
