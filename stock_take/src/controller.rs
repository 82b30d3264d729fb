//! View/state controller
//!
//! Owns the in-memory item list, the active tab and category, the item form
//! and the search term. The remote store is authoritative: mutations go to
//! the store first and only touch the local list once the store accepted
//! them. Every item is addressed by its id, never by position in a view.

use crate::error::{Result, StockError};
use crate::lookup::ProductLookup;
use crate::mirror::LocalMirror;
use crate::scanner::{CaptureSource, Detection, ScanOutcome, ScanSession};
use crate::store::ItemStore;
use chrono::NaiveDate;
use std::sync::Arc;
use stock_common::form::EXPIRY_FORMAT;
use stock_common::{views, CategoryGroup, CategorySet, FormError, Item, ItemDraft, ItemId};

/// Top-level view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Stock,
    Shopping,
    Expiry,
}

/// Where the current item list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Nothing loaded yet, or neither store nor mirror had data
    Empty,
    Remote,
    /// Remote store unreachable; showing the last mirrored list
    Mirror,
}

/// Result of a successful form submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    Created(ItemId),
    Updated(ItemId),
}

/// How a scan ended, and whether its product could be resolved
#[derive(Debug)]
pub struct ScanReport {
    pub outcome: ScanOutcome,
    /// Set when a code was detected but the product lookup failed
    pub lookup_error: Option<StockError>,
}

/// Blocking yes/no prompt for destructive actions
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Today's date on the local clock
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub struct StockController {
    store: Arc<dyn ItemStore>,
    mirror: Option<LocalMirror>,
    set: CategorySet,
    items: Vec<Item>,
    source: LoadSource,
    tab: Tab,
    category: &'static str,
    draft: ItemDraft,
    editing: Option<ItemId>,
    search: String,
}

impl StockController {
    pub fn new(store: Arc<dyn ItemStore>, set: CategorySet) -> Self {
        Self {
            store,
            mirror: None,
            set,
            items: Vec::new(),
            source: LoadSource::Empty,
            tab: Tab::default(),
            category: set.default_category(),
            draft: ItemDraft::new(set),
            editing: None,
            search: String::new(),
        }
    }

    /// Keep a local copy of the list as a fallback for when the store is unreachable
    pub fn with_mirror(mut self, mirror: LocalMirror) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn category_set(&self) -> CategorySet {
        self.set
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|i| &i.id == id)
    }

    fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|i| &i.id == id)
    }

    pub fn load_source(&self) -> LoadSource {
        self.source
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn category(&self) -> &'static str {
        self.category
    }

    /// Switch the stock view to another category of the set
    pub fn set_category(&mut self, category: &str) -> Result<()> {
        match self.set.categories().iter().find(|&&c| c == category) {
            Some(&c) => {
                self.category = c;
                Ok(())
            }
            None => Err(FormError::UnknownCategory(category.to_string()).into()),
        }
    }

    pub fn draft(&self) -> &ItemDraft {
        &self.draft
    }

    /// The form, for field-by-field input
    pub fn draft_mut(&mut self) -> &mut ItemDraft {
        &mut self.draft
    }

    /// Id of the item being edited, if the form is in edit mode
    pub fn editing(&self) -> Option<&ItemId> {
        self.editing.as_ref()
    }

    // ── Loading ──────────────────────────────────────────────────────────

    /// Load the list from the store, falling back to the local mirror.
    ///
    /// A successful load refreshes the mirror. Store errors are logged, not
    /// returned; check [`load_source`](Self::load_source) to tell whether the
    /// list is live.
    pub async fn load(&mut self) -> LoadSource {
        match self.store.list().await {
            Ok(items) => {
                self.items = items;
                self.source = LoadSource::Remote;
                self.refresh_mirror();
            }
            Err(e) => {
                log::warn!("Failed to load items from store: {}", e);
                match self.mirror.as_ref().and_then(LocalMirror::load) {
                    Some(items) => {
                        log::warn!("Showing {} items from local mirror", items.len());
                        self.items = items;
                        self.source = LoadSource::Mirror;
                    }
                    None => {
                        self.items.clear();
                        self.source = LoadSource::Empty;
                    }
                }
            }
        }
        self.source
    }

    /// Reload from the store and refresh the mirror; store errors are returned
    pub async fn sync(&mut self) -> Result<usize> {
        let items = self.store.list().await?;
        self.items = items;
        self.source = LoadSource::Remote;
        if let Some(ref mirror) = self.mirror {
            mirror.save(&self.items)?;
        }
        log::info!("Synced {} items", self.items.len());
        Ok(self.items.len())
    }

    fn refresh_mirror(&self) {
        if let Some(ref mirror) = self.mirror {
            if let Err(e) = mirror.save(&self.items) {
                log::warn!("Failed to update local mirror: {}", e);
            }
        }
    }

    // ── Form ─────────────────────────────────────────────────────────────

    /// Store the form: create a new item, or overwrite the one being edited.
    ///
    /// Validation errors and store errors leave both the list and the form
    /// untouched. On success the form is reset and edit mode is left.
    pub async fn submit(&mut self) -> Result<Submitted> {
        let fields = self.draft.validate(self.set)?;

        let outcome = match self.editing.clone() {
            Some(id) => {
                let pos = self
                    .position(&id)
                    .ok_or_else(|| StockError::ItemNotFound(id.clone()))?;
                self.store.update(&id, &fields).await?;
                self.items[pos].fields = fields;
                Submitted::Updated(id)
            }
            None => {
                let id = self.store.create(&fields).await?;
                self.items.push(Item::new(id.clone(), fields));
                Submitted::Created(id)
            }
        };

        self.reset_form();
        Ok(outcome)
    }

    /// Load an item into the form for editing
    pub fn edit(&mut self, id: &ItemId) -> Result<()> {
        let item = self
            .item(id)
            .ok_or_else(|| StockError::ItemNotFound(id.clone()))?;
        self.draft = ItemDraft::from_fields(&item.fields);
        self.editing = Some(id.clone());
        Ok(())
    }

    /// Leave edit mode and clear the form
    pub fn cancel_edit(&mut self) {
        self.reset_form();
    }

    fn reset_form(&mut self) {
        self.draft = ItemDraft::new(self.set);
        self.editing = None;
    }

    /// Delete an item after confirmation.
    ///
    /// Returns `Ok(false)` when the user declined.
    pub async fn delete(&mut self, id: &ItemId, confirm: &dyn Confirm) -> Result<bool> {
        let name = self
            .item(id)
            .map(|i| i.name().to_string())
            .ok_or_else(|| StockError::ItemNotFound(id.clone()))?;

        if !confirm.confirm(&format!("Delete \"{}\"?", name)) {
            log::debug!("Delete of {} declined", id);
            return Ok(false);
        }

        self.store.delete(id).await?;
        self.items.retain(|i| &i.id != id);
        if self.editing.as_ref() == Some(id) {
            self.reset_form();
        }
        Ok(true)
    }

    // ── Views ────────────────────────────────────────────────────────────

    pub fn search_term(&self) -> &str {
        &self.search
    }

    /// Set the search term. Only filters; the form is never touched.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Active category filtered by the search term
    pub fn search_results(&self) -> Vec<&Item> {
        views::search(&self.items, self.category, &self.search)
    }

    pub fn stock_view(&self) -> Vec<&Item> {
        views::stock_view(&self.items, self.category)
    }

    pub fn shopping_view(&self) -> Vec<&Item> {
        views::shopping_view(&self.items)
    }

    pub fn expiry_view(&self, today: NaiveDate) -> Vec<&Item> {
        views::expiry_view(&self.items, today)
    }

    /// What the active tab shows: the searched category for stock, one group
    /// per category for the shopping and expiry lists.
    pub fn current_view(&self, today: NaiveDate) -> Vec<CategoryGroup<'_>> {
        match self.tab {
            Tab::Stock => vec![CategoryGroup {
                category: self.category,
                items: self.search_results(),
            }],
            Tab::Shopping => views::group_by_category(&self.shopping_view(), self.set),
            Tab::Expiry => views::group_by_category(&self.expiry_view(today), self.set),
        }
    }

    // ── Scanning ─────────────────────────────────────────────────────────

    /// Offer the capture date as expiry when none has been entered yet
    pub fn apply_detection(&mut self, detection: &Detection) {
        if self.draft.expiry.trim().is_empty() {
            self.draft.expiry = detection.default_expiry.format(EXPIRY_FORMAT).to_string();
        }
    }

    /// Fill the form from a scanned barcode.
    ///
    /// On a recognized product the name is replaced, an empty quantity
    /// becomes one unit and an empty expiry takes the capture date. On any
    /// lookup failure the form is left as it was and the error is returned.
    pub async fn prefill_from_scan(
        &mut self,
        detection: &Detection,
        lookup: &dyn ProductLookup,
    ) -> Result<()> {
        let name = match lookup.product_name(&detection.barcode).await {
            Ok(name) => name,
            Err(e) => {
                log::warn!("Product lookup failed for {}: {}", detection.barcode, e);
                return Err(e);
            }
        };

        self.draft.name = name;
        if self.draft.quantity.trim().is_empty() {
            self.draft.quantity = "1".to_string();
        }
        self.apply_detection(detection);
        Ok(())
    }

    /// Run a capture session and fill the form from its detection.
    ///
    /// A detected code always leaves its capture date as the default expiry.
    /// The product name is only filled in when a lookup is given and it
    /// recognizes the code; a failed lookup is reported alongside the outcome.
    pub async fn scan<S: CaptureSource>(
        &mut self,
        session: ScanSession<S>,
        lookup: Option<&dyn ProductLookup>,
        today: NaiveDate,
    ) -> ScanReport {
        let outcome = session.run(today).await;
        let mut lookup_error = None;

        if let ScanOutcome::Detected(ref detection) = outcome {
            self.apply_detection(detection);
            if let Some(lookup) = lookup {
                lookup_error = self.prefill_from_scan(detection, lookup).await.err();
            }
        }

        ScanReport {
            outcome,
            lookup_error,
        }
    }
}
