//! File-backed item store: one JSON document per category.
//!
//! # Responsibility
//! - Keep `<dir>/<category>.json` as a pretty-printed array of items.
//! - Apply each mutation as read-modify-write of that one file.
//!
//! # Invariants
//! - A missing file reads as an empty category.
//! - Files are replaced by rename, so readers never see a partial write.
//! - A mutation that fails validation or lookup leaves the file untouched.

use crate::model::category::CategoryId;
use crate::model::item::{Item, ItemId, OrderEntry};
use crate::model::mutation::Mutation;
use crate::repo::item_store::{ItemStore, StoreError, StoreResult};
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Item store persisting each category to its own JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileItemStore {
    dir: PathBuf,
}

impl JsonFileItemStore {
    /// Uses `dir` as the content directory, creating it when missing.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document holding `category`.
    pub fn category_path(&self, category: CategoryId) -> PathBuf {
        self.dir.join(format!("{}.json", category.as_str()))
    }

    fn read(&self, category: CategoryId) -> StoreResult<Vec<Item>> {
        let path = self.category_path(category);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut items: Vec<Item> = serde_json::from_str(&text)
            .map_err(|err| StoreError::InvalidData(format!("{}: {err}", path.display())))?;
        items.sort_by_key(|item| item.order);
        Ok(items)
    }

    fn write(&self, category: CategoryId, items: &[Item]) -> StoreResult<()> {
        let path = self.category_path(category);
        let staging = path.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(items)?;
        fs::write(&staging, body)?;
        fs::rename(&staging, &path)?;
        debug!(
            "event=store_write module=store status=ok backend=json category={} items={}",
            category,
            items.len()
        );
        Ok(())
    }
}

impl ItemStore for JsonFileItemStore {
    fn list_by_category(&self, category: CategoryId) -> StoreResult<Vec<Item>> {
        self.read(category)
    }

    fn apply_mutation(&self, mutation: &Mutation) -> StoreResult<()> {
        mutation.validate()?;
        let category = mutation.category();
        let mut items = self.read(category)?;

        match mutation {
            Mutation::Create { item, .. } => {
                if items.iter().any(|existing| existing.id == item.id) {
                    return Err(StoreError::AlreadyExists(item.id.clone()));
                }
                items.push(item.clone());
            }
            Mutation::Update { item, .. } => {
                let slot = find_mut(&mut items, &item.id)?;
                *slot = item.clone();
            }
            Mutation::Delete { item_id, .. } => {
                let before = items.len();
                items.retain(|existing| &existing.id != item_id);
                if items.len() == before {
                    return Ok(());
                }
            }
            Mutation::Reorder { items: entries, .. } => apply_order(&mut items, entries)?,
        }

        self.write(category, &items)
    }
}

fn find_mut<'a>(items: &'a mut [Item], id: &ItemId) -> StoreResult<&'a mut Item> {
    items
        .iter_mut()
        .find(|item| &item.id == id)
        .ok_or_else(|| StoreError::NotFound(id.clone()))
}

fn apply_order(items: &mut [Item], entries: &[OrderEntry]) -> StoreResult<()> {
    if let Some(missing) = entries
        .iter()
        .find(|entry| !items.iter().any(|item| item.id == entry.id))
    {
        return Err(StoreError::NotFound(missing.id.clone()));
    }
    for entry in entries {
        find_mut(items, &entry.id)?.order = entry.order;
    }
    items.sort_by_key(|item| item.order);
    Ok(())
}
