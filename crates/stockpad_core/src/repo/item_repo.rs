//! Item data-access contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the exact set of storage operations available on the `items`
//!   table, with no business logic.
//! - Keep SQL details inside the core persistence boundary.
//! - Re-run watched queries after each committed mutation and push results
//!   through the [`WatchHub`].
//!
//! # Invariants
//! - Write paths must call `Item::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - Zero-row mutations (ignored conflict, absent update/delete target) are
//!   not failures and produce no emissions.

use crate::db::DbError;
use crate::model::item::{Item, ItemId, ItemValidationError};
use crate::watch::{Watch, WatchHub};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

const ITEM_SELECT_SQL: &str = "SELECT id, name, price_cents, quantity FROM items";

const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "name",
    "price_cents",
    "quantity",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for item persistence and query operations.
///
/// Absence of a row is never an error here: single-item reads return
/// `Option` and zero-row mutations succeed.
#[derive(Debug)]
pub enum RepoError {
    Validation(ItemValidationError),
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted item data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ItemValidationError> for RepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Data-access contract for the `items` table.
///
/// Completion of a mutation signals durability. Live queries are returned as
/// [`Watch`] streams seeded with the current result.
pub trait ItemRepository {
    /// Durably adds a new row.
    ///
    /// A primary-key collision is silently dropped: no error, no overwrite,
    /// no emission.
    fn insert(&self, item: &Item) -> RepoResult<()>;

    /// Replaces the stored row matching the item's primary key.
    ///
    /// A no-op when no matching row exists.
    fn update(&self, item: &Item) -> RepoResult<()>;

    /// Removes the row matching the item's primary key. A no-op if absent.
    fn delete(&self, item: &Item) -> RepoResult<()>;

    /// Reads the current row for `id`, if any.
    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>>;

    /// Reads the full table contents ordered by name ascending.
    fn get_all_items(&self) -> RepoResult<Vec<Item>>;

    /// Subscribes to the row matching `id`.
    ///
    /// Emits the current value immediately (absent rows emit `None`), then
    /// re-emits after every committed change affecting that id.
    fn watch_item(&self, id: ItemId) -> RepoResult<Watch<Option<Item>>>;

    /// Subscribes to the ordered full-table query.
    ///
    /// Emits the current list immediately, then the complete re-ordered list
    /// after every committed row insert/update/delete.
    fn watch_all_items(&self) -> RepoResult<Watch<Vec<Item>>>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
    hub: Arc<WatchHub>,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Creates a repository over a bootstrapped connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version does not match
    ///   this binary's latest migration.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the `items`
    ///   schema is absent or incomplete.
    pub fn try_new(conn: &'conn Connection, hub: Arc<WatchHub>) -> RepoResult<Self> {
        let expected_version = crate::db::migrations::latest_version();
        let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let table_exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'items'
            );",
            [],
            |row| row.get(0),
        )?;
        if table_exists == 0 {
            return Err(RepoError::MissingRequiredTable("items"));
        }

        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('items');")?;
        let mut rows = stmt.query([])?;
        let mut columns = Vec::new();
        while let Some(row) = rows.next()? {
            columns.push(row.get::<_, String>(0)?);
        }
        for required in REQUIRED_COLUMNS {
            if !columns.iter().any(|column| column == required) {
                return Err(RepoError::MissingRequiredColumn {
                    table: "items",
                    column: required,
                });
            }
        }

        Ok(Self { conn, hub })
    }

    /// Re-runs watched queries for a committed change to `id`.
    ///
    /// Queries nobody watches are skipped.
    fn notify_change(&self, id: ItemId) -> RepoResult<()> {
        if self.hub.has_item_watchers(id) {
            let row = self.get_item(id)?;
            self.hub.publish_item(id, &row);
        }
        if self.hub.has_list_watchers() {
            let rows = self.get_all_items()?;
            self.hub.publish_all(&rows);
        }
        Ok(())
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn insert(&self, item: &Item) -> RepoResult<()> {
        item.validate()?;

        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO items (id, name, price_cents, quantity)
             VALUES (?1, ?2, ?3, ?4);",
            params![item.id, item.name.as_str(), item.price_cents, item.quantity],
        )?;

        if changed > 0 {
            self.notify_change(item.id)?;
        }
        Ok(())
    }

    fn update(&self, item: &Item) -> RepoResult<()> {
        item.validate()?;

        let changed = self.conn.execute(
            "UPDATE items
             SET
                name = ?1,
                price_cents = ?2,
                quantity = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?4;",
            params![item.name.as_str(), item.price_cents, item.quantity, item.id],
        )?;

        if changed > 0 {
            self.notify_change(item.id)?;
        }
        Ok(())
    }

    fn delete(&self, item: &Item) -> RepoResult<()> {
        // Matched by primary key only; the other fields of `item` do not
        // participate in row selection.
        let changed = self
            .conn
            .execute("DELETE FROM items WHERE id = ?1;", [item.id])?;

        if changed > 0 {
            self.notify_change(item.id)?;
        }
        Ok(())
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_item_row(row)?));
        }

        Ok(None)
    }

    fn get_all_items(&self) -> RepoResult<Vec<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} ORDER BY name ASC, id ASC;"))?;

        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }

        Ok(items)
    }

    fn watch_item(&self, id: ItemId) -> RepoResult<Watch<Option<Item>>> {
        let current = self.get_item(id)?;
        Ok(self.hub.watch_item(id, current))
    }

    fn watch_all_items(&self) -> RepoResult<Watch<Vec<Item>>> {
        let current = self.get_all_items()?;
        Ok(self.hub.watch_all(current))
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let item = Item {
        id: row.get("id")?,
        name: row.get("name")?,
        price_cents: row.get("price_cents")?,
        quantity: row.get("quantity")?,
    };
    item.validate()
        .map_err(|err| RepoError::InvalidData(err.to_string()))?;
    Ok(item)
}
