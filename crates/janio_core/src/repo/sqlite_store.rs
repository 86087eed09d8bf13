//! SQLite implementation of the item store.
//!
//! # Responsibility
//! - Persist items in the `items` table partitioned by `category`.
//! - Map store mutations onto single statements or one transaction.
//!
//! # Invariants
//! - Writes are scoped by `(id, category)`; an id is never touched through
//!   another category's partition.
//! - Reorder runs inside one transaction and rolls back on the first
//!   unknown id.
//! - Rows failing `Item::validate()` surface as `InvalidData`.

use crate::db::migrations::latest_version;
use crate::model::category::CategoryId;
use crate::model::item::{Item, ItemId, ItemKind, OrderEntry};
use crate::model::mutation::Mutation;
use crate::repo::item_store::{ItemStore, StoreError, StoreResult};
use log::debug;
use rusqlite::{params, Connection, ErrorCode, Row};

const ITEM_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    item_order,
    due_date
FROM items";

/// Item store over a migrated SQLite connection.
pub struct SqliteItemStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemStore<'conn> {
    /// Wraps a connection returned by `db::open_db*`.
    ///
    /// Rejects connections whose schema is not at the latest version.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if version != latest_version() {
            return Err(StoreError::InvalidData(format!(
                "schema version {version} does not match expected {}",
                latest_version()
            )));
        }
        Ok(Self { conn })
    }

    fn insert(&self, category: CategoryId, item: &Item) -> StoreResult<()> {
        let result = self.conn.execute(
            "INSERT INTO items (id, category, title, description, item_order, due_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                item.id.as_str(),
                category.as_str(),
                item.title.as_str(),
                item.description.as_str(),
                item.order,
                item.due_date(),
            ],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::AlreadyExists(item.id.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn replace(&self, category: CategoryId, item: &Item) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE items
             SET
                title = ?3,
                description = ?4,
                item_order = ?5,
                due_date = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND category = ?2;",
            params![
                item.id.as_str(),
                category.as_str(),
                item.title.as_str(),
                item.description.as_str(),
                item.order,
                item.due_date(),
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(item.id.clone()));
        }
        Ok(())
    }

    fn remove(&self, category: CategoryId, item_id: &ItemId) -> StoreResult<()> {
        let removed = self.conn.execute(
            "DELETE FROM items WHERE id = ?1 AND category = ?2;",
            params![item_id.as_str(), category.as_str()],
        )?;
        debug!(
            "event=store_delete module=store status=ok backend=sqlite category={} removed={}",
            category, removed
        );
        Ok(())
    }

    fn reorder(&self, category: CategoryId, entries: &[OrderEntry]) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "UPDATE items
                 SET
                    item_order = ?3,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1
                   AND category = ?2;",
            )?;
            for entry in entries {
                let changed =
                    stmt.execute(params![entry.id.as_str(), category.as_str(), entry.order])?;
                if changed == 0 {
                    return Err(StoreError::NotFound(entry.id.clone()));
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}

impl ItemStore for SqliteItemStore<'_> {
    fn list_by_category(&self, category: CategoryId) -> StoreResult<Vec<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL}
             WHERE category = ?1
             ORDER BY item_order ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([category.as_str()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }

    fn apply_mutation(&self, mutation: &Mutation) -> StoreResult<()> {
        mutation.validate()?;
        match mutation {
            Mutation::Create { category, item } => self.insert(*category, item),
            Mutation::Update { category, item } => self.replace(*category, item),
            Mutation::Delete { category, item_id } => self.remove(*category, item_id),
            Mutation::Reorder { category, items } => self.reorder(*category, items),
        }
    }
}

fn parse_item_row(row: &Row<'_>) -> StoreResult<Item> {
    let id_text: String = row.get("id")?;
    let id = ItemId::parse(id_text.as_str())
        .map_err(|_| StoreError::InvalidData(format!("blank id `{id_text}` in items.id")))?;

    let raw_order: i64 = row.get("item_order")?;
    let order = u32::try_from(raw_order).map_err(|_| {
        StoreError::InvalidData(format!("order `{raw_order}` out of range for item {id}"))
    })?;

    let kind = match row.get::<_, Option<String>>("due_date")? {
        Some(due_date) => ItemKind::Task { due_date },
        None => ItemKind::Plain,
    };

    let item = Item {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        order,
        kind,
    };
    item.validate()
        .map_err(|err| StoreError::InvalidData(format!("item {}: {err}", item.id)))?;
    Ok(item)
}
