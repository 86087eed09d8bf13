//! Content synchronization state machine.
//!
//! # Responsibility
//! - Own the in-memory category buckets, active category and selection.
//! - Apply create/update/delete/reorder locally first, then replicate the
//!   change to the store.
//! - Turn load and save failures into user notices.
//!
//! # Invariants
//! - Items in the bucket of category C have unique ids, positive orders
//!   and a due date iff C is task-like.
//! - Validation errors return before any state change or dispatch.
//! - A failed dispatch keeps the optimistic local state and raises exactly
//!   one notice; there is no rollback and no retry.
//! - A load never replaces a category with results older than the last
//!   load applied to it.
//! - Local writes made after a load began are re-applied on top of that
//!   load's results.
//!
//! # See also
//! - repo::item_store for the store contract.

use crate::config::ManagerConfig;
use crate::model::category::{Category, CategoryId};
use crate::model::item::{Item, ItemDraft, ItemId, OrderEntry};
use crate::model::mutation::{validate_order_entries, Mutation};
use crate::model::validation::ValidationError;
use crate::notify::{Notice, Notifier};
use crate::repo::item_store::{ItemStore, StoreResult};
use crate::service::reorder;
use log::{debug, error, info, warn};
use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

pub const LOAD_FAILED_TITLE: &str = "Failed to load data";
pub const LOAD_FAILED_DESCRIPTION: &str = "Please check your connection and try again.";
pub const SAVE_FAILED_TITLE: &str = "Failed to save changes";
pub const SAVE_FAILED_DESCRIPTION: &str =
    "Please try again. Your local changes may be out of sync.";

/// Handle for one in-flight load, issued by `begin_load`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    sequence: u64,
    categories: Vec<CategoryId>,
}

impl LoadTicket {
    /// Categories the host must fetch for this load.
    pub fn categories(&self) -> &[CategoryId] {
        &self.categories
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// Per-category outcome of one finished load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Buckets replaced by this load (fetched or fallen back to empty).
    pub applied: Vec<CategoryId>,
    /// Buckets left alone because a newer load was already applied.
    pub stale: Vec<CategoryId>,
    /// Categories whose fetch failed.
    pub failed: Vec<CategoryId>,
}

/// Optimistic content state over an `ItemStore`.
pub struct ContentManager<S: ItemStore, N: Notifier> {
    store: S,
    notifier: N,
    categories: Vec<Category>,
    active_category: CategoryId,
    selected_item_id: Option<ItemId>,
    items: BTreeMap<CategoryId, Vec<Item>>,
    is_loading: bool,
    last_sequence: u64,
    applied_load: BTreeMap<CategoryId, u64>,
    /// Sequence of the last local write per item. A written id missing
    /// from the bucket was deleted locally.
    local_writes: BTreeMap<CategoryId, BTreeMap<ItemId, u64>>,
    latest_load: Option<u64>,
}

impl<S: ItemStore, N: Notifier> ContentManager<S, N> {
    pub fn new(store: S, notifier: N, config: &ManagerConfig) -> Self {
        Self {
            store,
            notifier,
            categories: config.categories.clone(),
            active_category: config.initial_category(),
            selected_item_id: None,
            items: BTreeMap::new(),
            is_loading: true,
            last_sequence: 0,
            applied_load: BTreeMap::new(),
            local_writes: BTreeMap::new(),
            latest_load: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn active_category(&self) -> CategoryId {
        self.active_category
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn selected_item_id(&self) -> Option<&ItemId> {
        self.selected_item_id.as_ref()
    }

    /// Resolves the selection within the active category.
    pub fn selected_item(&self) -> Option<&Item> {
        let id = self.selected_item_id.as_ref()?;
        self.items(self.active_category)
            .iter()
            .find(|item| &item.id == id)
    }

    pub fn items_by_category(&self) -> &BTreeMap<CategoryId, Vec<Item>> {
        &self.items
    }

    /// Bucket contents in local insertion order; empty when never loaded.
    pub fn items(&self, category: CategoryId) -> &[Item] {
        self.items
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Bucket contents in display order (stable by `order`).
    pub fn sorted_items(&self, category: CategoryId) -> Vec<Item> {
        let mut items = self.items(category).to_vec();
        items.sort_by_key(|item| item.order);
        items
    }

    /// Loads every configured category.
    pub fn reload(&mut self) -> LoadReport {
        let categories = self.categories.clone();
        self.load(&categories)
    }

    /// Fetches each category from the store and replaces its bucket.
    ///
    /// A failing category falls back to an empty bucket without aborting
    /// the others; one notice is raised after all fetches settle.
    pub fn load(&mut self, categories: &[Category]) -> LoadReport {
        let ticket = self.begin_load(categories);
        let results = ticket
            .categories()
            .iter()
            .map(|category| (*category, self.store.list_by_category(*category)))
            .collect();
        self.finish_load(ticket, results)
    }

    /// Starts a load whose fetches the host performs itself.
    pub fn begin_load(&mut self, categories: &[Category]) -> LoadTicket {
        let sequence = self.next_sequence();
        self.latest_load = Some(sequence);
        self.is_loading = true;
        info!(
            "event=content_load module=content status=start sequence={} categories={}",
            sequence,
            categories.len()
        );
        LoadTicket {
            sequence,
            categories: categories.iter().map(|category| category.id).collect(),
        }
    }

    /// Applies the fetch results of `ticket`.
    ///
    /// Categories missing from `results` count as failed.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        results: Vec<(CategoryId, StoreResult<Vec<Item>>)>,
    ) -> LoadReport {
        let mut fetched: BTreeMap<CategoryId, StoreResult<Vec<Item>>> =
            results.into_iter().collect();
        let mut report = LoadReport::default();

        for category in &ticket.categories {
            let category = *category;
            let items = match fetched.remove(&category) {
                Some(Ok(items)) => items,
                Some(Err(err)) => {
                    warn!(
                        "event=content_load module=content status=error category={} error={}",
                        category, err
                    );
                    report.failed.push(category);
                    Vec::new()
                }
                None => {
                    warn!(
                        "event=content_load module=content status=error category={} error=missing_result",
                        category
                    );
                    report.failed.push(category);
                    Vec::new()
                }
            };

            let applied = self.applied_load.get(&category).copied().unwrap_or(0);
            if ticket.sequence <= applied {
                debug!(
                    "event=content_load module=content status=stale category={} sequence={} applied={}",
                    category, ticket.sequence, applied
                );
                report.stale.push(category);
                continue;
            }

            let items = self.replay_local_writes(category, ticket.sequence, items);
            self.items.insert(category, prepare_bucket(category, items));
            self.applied_load.insert(category, ticket.sequence);
            report.applied.push(category);
        }

        if !fetched.is_empty() {
            debug!(
                "event=content_load module=content status=ok ignored_results={}",
                fetched.len()
            );
        }
        if !report.failed.is_empty() {
            self.notifier
                .notify(Notice::error(LOAD_FAILED_TITLE, LOAD_FAILED_DESCRIPTION));
        }
        if self.latest_load == Some(ticket.sequence) {
            self.is_loading = false;
        }

        info!(
            "event=content_load module=content status=ok sequence={} applied={} stale={} failed={}",
            ticket.sequence,
            report.applied.len(),
            report.stale.len(),
            report.failed.len()
        );
        report
    }

    /// Sets the selection; `None` clears it.
    pub fn select_item(&mut self, item: Option<&Item>) {
        self.selected_item_id = item.map(|item| item.id.clone());
    }

    pub fn reset_selection(&mut self) {
        self.selected_item_id = None;
    }

    /// Switches tabs and clears the selection.
    pub fn set_active_category(&mut self, category: CategoryId) {
        self.active_category = category;
        self.selected_item_id = None;
    }

    /// Creates an item from `draft`, appends it and replicates it.
    ///
    /// Defaults: generated id, placeholder title, `order = len + 1`, empty
    /// description, empty due date for task-like categories. The new item
    /// becomes the selection when `category` is active.
    pub fn create_item(
        &mut self,
        category: CategoryId,
        draft: ItemDraft,
    ) -> Result<Item, ValidationError> {
        let next_order = u32::try_from(self.items(category).len())
            .unwrap_or(u32::MAX)
            .saturating_add(1);
        let item = draft.into_item(category, next_order)?;
        if self.items(category).iter().any(|existing| existing.id == item.id) {
            return Err(ValidationError::DuplicateId(item.id.to_string()));
        }

        self.mark_local_write(category, [&item.id]);
        self.items.entry(category).or_default().push(item.clone());
        if category == self.active_category {
            self.selected_item_id = Some(item.id.clone());
        }
        info!(
            "event=item_create module=content status=ok category={} item_id={} order={}",
            category, item.id, item.order
        );

        self.dispatch(Mutation::Create {
            category,
            item: item.clone(),
        });
        Ok(item)
    }

    /// Replaces the item with the same id wholesale and replicates it.
    ///
    /// `category` defaults to the active one. The title is normalized and
    /// the shape conformed to the category before anything is stored.
    pub fn update_item(
        &mut self,
        item: Item,
        category: Option<CategoryId>,
    ) -> Result<Item, ValidationError> {
        let category = category.unwrap_or(self.active_category);
        let item = item.with_normalized_title().conform_to(category);
        item.validate()?;

        let slot = self
            .items
            .entry(category)
            .or_default()
            .iter_mut()
            .find(|existing| existing.id == item.id);
        let replaced = match slot {
            Some(slot) => {
                *slot = item.clone();
                true
            }
            None => false,
        };
        if replaced {
            self.mark_local_write(category, [&item.id]);
        } else {
            debug!(
                "event=item_update module=content status=ok category={} item_id={} local=absent",
                category, item.id
            );
        }
        if category == self.active_category {
            self.selected_item_id = Some(item.id.clone());
        }

        self.dispatch(Mutation::Update {
            category,
            item: item.clone(),
        });
        Ok(item)
    }

    /// Removes an item locally and replicates the delete.
    ///
    /// Clears the selection only when the removed id was selected.
    pub fn delete_item(
        &mut self,
        item_id: &ItemId,
        category: Option<CategoryId>,
    ) -> Result<(), ValidationError> {
        if item_id.as_str().trim().is_empty() {
            return Err(ValidationError::EmptyId);
        }
        let category = category.unwrap_or(self.active_category);

        self.mark_local_write(category, [item_id]);
        self.items
            .entry(category)
            .or_default()
            .retain(|existing| &existing.id != item_id);
        if self.selected_item_id.as_ref() == Some(item_id) {
            self.selected_item_id = None;
        }
        info!(
            "event=item_delete module=content status=ok category={} item_id={}",
            category, item_id
        );

        self.dispatch(Mutation::Delete {
            category,
            item_id: item_id.clone(),
        });
        Ok(())
    }

    /// Replaces the bucket with `items` as given and replicates the orders.
    ///
    /// The caller has already assigned the new `order` values; only
    /// `{id, order}` pairs are sent to the store.
    pub fn reorder_items(
        &mut self,
        items: Vec<Item>,
        category: Option<CategoryId>,
    ) -> Result<(), ValidationError> {
        let category = category.unwrap_or(self.active_category);
        let items: Vec<Item> = items
            .into_iter()
            .map(|item| item.with_normalized_title().conform_to(category))
            .collect();
        let entries: Vec<OrderEntry> = items.iter().map(Item::order_entry).collect();
        validate_order_entries(&entries)?;

        self.mark_local_write(category, entries.iter().map(|entry| &entry.id));
        self.items.insert(category, items);
        info!(
            "event=items_reorder module=content status=ok category={} items={}",
            category,
            entries.len()
        );

        self.dispatch(Mutation::Reorder {
            category,
            items: entries,
        });
        Ok(())
    }

    /// Moves one item to a 0-based display position and reorders.
    ///
    /// Returns `false` without dispatching when the id is not in the
    /// bucket or the position does not change.
    pub fn move_item(
        &mut self,
        item_id: &ItemId,
        to_index: usize,
        category: Option<CategoryId>,
    ) -> Result<bool, ValidationError> {
        let category = category.unwrap_or(self.active_category);
        let sorted = self.sorted_items(category);
        let Some(from_index) = sorted.iter().position(|item| &item.id == item_id) else {
            return Ok(false);
        };
        let to_index = to_index.min(sorted.len().saturating_sub(1));
        if from_index == to_index {
            return Ok(false);
        }

        let moved = reorder::move_item(&sorted, from_index, to_index);
        self.reorder_items(moved, Some(category))?;
        Ok(true)
    }

    fn next_sequence(&mut self) -> u64 {
        self.last_sequence += 1;
        self.last_sequence
    }

    fn mark_local_write<'a>(
        &mut self,
        category: CategoryId,
        ids: impl IntoIterator<Item = &'a ItemId>,
    ) {
        let sequence = self.next_sequence();
        let writes = self.local_writes.entry(category).or_default();
        for id in ids {
            writes.insert(id.clone(), sequence);
        }
    }

    /// Overlays local writes newer than `since` onto fetched items.
    ///
    /// Written items present in the bucket replace or join the fetched
    /// list; written items missing from the bucket were deleted locally
    /// and are dropped from it. Older writes are forgotten.
    fn replay_local_writes(
        &mut self,
        category: CategoryId,
        since: u64,
        mut fetched: Vec<Item>,
    ) -> Vec<Item> {
        let Some(writes) = self.local_writes.get_mut(&category) else {
            return fetched;
        };
        writes.retain(|_, sequence| *sequence > since);
        let local = self
            .items
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for id in writes.keys() {
            let slot = fetched.iter().position(|item| &item.id == id);
            match (local.iter().find(|item| &item.id == id), slot) {
                (Some(item), Some(index)) => fetched[index] = item.clone(),
                (Some(item), None) => fetched.push(item.clone()),
                (None, Some(index)) => {
                    fetched.remove(index);
                }
                (None, None) => {}
            }
        }
        if !writes.is_empty() {
            debug!(
                "event=content_load module=content status=ok category={} replayed_writes={}",
                category,
                writes.len()
            );
        }
        fetched
    }

    /// Sends one mutation to the store; failures become a single notice.
    fn dispatch(&self, mutation: Mutation) {
        let started_at = Instant::now();
        match self.store.apply_mutation(&mutation) {
            Ok(()) => {
                debug!(
                    "event=mutation_dispatch module=content status=ok action={} category={} duration_ms={}",
                    mutation.action(),
                    mutation.category(),
                    started_at.elapsed().as_millis()
                );
            }
            Err(err) => {
                error!(
                    "event=mutation_dispatch module=content status=error action={} category={} duration_ms={} error={}",
                    mutation.action(),
                    mutation.category(),
                    started_at.elapsed().as_millis(),
                    err
                );
                self.notifier
                    .notify(Notice::error(SAVE_FAILED_TITLE, SAVE_FAILED_DESCRIPTION));
            }
        }
    }
}

/// Conforms fetched items to the category, drops duplicate ids and sorts
/// stably by order.
fn prepare_bucket(category: CategoryId, items: Vec<Item>) -> Vec<Item> {
    let mut seen = HashSet::with_capacity(items.len());
    let mut bucket: Vec<Item> = items
        .into_iter()
        .filter(|item| {
            let fresh = seen.insert(item.id.clone());
            if !fresh {
                warn!(
                    "event=content_load module=content status=error category={} item_id={} error=duplicate_id",
                    category, item.id
                );
            }
            fresh
        })
        .map(|item| item.conform_to(category))
        .collect();
    bucket.sort_by_key(|item| item.order);
    bucket
}
