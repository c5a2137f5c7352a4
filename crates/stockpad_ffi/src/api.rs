//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level inventory functions to Dart via FRB.
//! - Keep error semantics simple for UI integration: envelope structs, no
//!   exceptions.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Responses carry human-readable diagnostic messages.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use stockpad_core::db::open_db;
use stockpad_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Item, ItemService, SqliteItemRepository, WatchHub,
};

const ENTRY_DB_FILE_NAME: &str = "stockpad_entry.sqlite3";
static ENTRY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Exposes the core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on
///   failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Inventory item view returned by FFI read APIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    /// Stable item id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Unit price in minor currency units.
    pub price_cents: i64,
    /// Unit price rendered for display, e.g. `"12.99"`.
    pub display_price: String,
    /// Units currently in stock.
    pub quantity: i64,
}

/// Generic action response envelope for inventory mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemActionResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Id of the affected item, when known.
    pub item_id: Option<i64>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ItemActionResponse {
    fn success(message: impl Into<String>, item_id: i64) -> Self {
        Self {
            ok: true,
            item_id: Some(item_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            item_id: None,
            message: message.into(),
        }
    }
}

/// Response envelope for single-item reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDetailResponse {
    /// The matching item, absent when the id matches no row.
    pub item: Option<ItemView>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Response envelope for full inventory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemListResponse {
    /// All items ordered by name ascending.
    pub items: Vec<ItemView>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Adds a new inventory item.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - A primary-key conflict is reported as success with a distinct message;
///   the existing row is left unchanged.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn inventory_add_item(
    id: i64,
    name: String,
    price_cents: i64,
    quantity: i64,
) -> ItemActionResponse {
    let item = match Item::new(id, name.trim().to_string(), price_cents, quantity) {
        Ok(item) => item,
        Err(err) => return ItemActionResponse::failure(format!("inventory_add_item failed: {err}")),
    };

    match with_item_service(|service| {
        service.insert_item(&item)?;
        service.get_item(item.id)
    }) {
        Ok(Some(stored)) if stored == item => ItemActionResponse::success("Item added.", item.id),
        Ok(_) => ItemActionResponse::success("Item id already in use; nothing changed.", item.id),
        Err(err) => ItemActionResponse::failure(format!("inventory_add_item failed: {err}")),
    }
}

/// Replaces an existing inventory item.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Updating an id with no matching row is a successful no-op.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn inventory_update_item(
    id: i64,
    name: String,
    price_cents: i64,
    quantity: i64,
) -> ItemActionResponse {
    let item = match Item::new(id, name.trim().to_string(), price_cents, quantity) {
        Ok(item) => item,
        Err(err) => {
            return ItemActionResponse::failure(format!("inventory_update_item failed: {err}"))
        }
    };

    match with_item_service(|service| service.update_item(&item)) {
        Ok(()) => ItemActionResponse::success("Item updated.", item.id),
        Err(err) => ItemActionResponse::failure(format!("inventory_update_item failed: {err}")),
    }
}

/// Deletes an inventory item by id.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Deleting an id with no matching row is a successful no-op.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn inventory_delete_item(id: i64) -> ItemActionResponse {
    let deleted = with_item_service(|service| {
        match service.get_item(id)? {
            Some(item) => service.delete_item(&item).map(|()| true),
            None => Ok(false),
        }
    });

    match deleted {
        Ok(true) => ItemActionResponse::success("Item deleted.", id),
        Ok(false) => ItemActionResponse::success("No item with that id; nothing changed.", id),
        Err(err) => ItemActionResponse::failure(format!("inventory_delete_item failed: {err}")),
    }
}

/// Reads one inventory item by id.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - An unknown id is a normal absent result, not an error.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn inventory_get_item(id: i64) -> ItemDetailResponse {
    match with_item_service(|service| service.get_item(id)) {
        Ok(Some(item)) => ItemDetailResponse {
            item: Some(to_item_view(&item)),
            message: "Item found.".to_string(),
        },
        Ok(None) => ItemDetailResponse {
            item: None,
            message: "No item with that id.".to_string(),
        },
        Err(err) => ItemDetailResponse {
            item: None,
            message: format!("inventory_get_item failed: {err}"),
        },
    }
}

/// Lists the full inventory ordered by name.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn inventory_list_items() -> ItemListResponse {
    match with_item_service(|service| service.list_items()) {
        Ok(items) => {
            let message = if items.is_empty() {
                "Inventory is empty.".to_string()
            } else {
                format!("Found {} item(s).", items.len())
            };
            ItemListResponse {
                items: items.iter().map(to_item_view).collect(),
                message,
            }
        }
        Err(err) => ItemListResponse {
            items: Vec::new(),
            message: format!("inventory_list_items failed: {err}"),
        },
    }
}

fn resolve_entry_db_path() -> PathBuf {
    ENTRY_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("STOCKPAD_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(ENTRY_DB_FILE_NAME)
        })
        .clone()
}

fn with_item_service<T>(
    f: impl FnOnce(&ItemService<SqliteItemRepository<'_>>) -> stockpad_core::RepoResult<T>,
) -> Result<T, String> {
    let db_path = resolve_entry_db_path();
    let conn = open_db(&db_path).map_err(|err| {
        log::error!("event=ffi_entry module=ffi status=error stage=db_open error={err}");
        format!("entry DB open failed: {err}")
    })?;
    let repo = SqliteItemRepository::try_new(&conn, Arc::new(WatchHub::new())).map_err(|err| {
        log::error!("event=ffi_entry module=ffi status=error stage=repo_init error={err}");
        format!("entry repo init failed: {err}")
    })?;
    let service = ItemService::new(repo);
    f(&service).map_err(|err| err.to_string())
}

fn to_item_view(item: &Item) -> ItemView {
    ItemView {
        id: item.id,
        name: item.name.clone(),
        price_cents: item.price_cents,
        display_price: item.display_price(),
        quantity: item.quantity,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, inventory_add_item, inventory_delete_item, inventory_get_item,
        inventory_list_items, inventory_update_item, ping,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_id() -> i64 {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after unix epoch")
            .as_nanos();
        // Keep the id positive and well inside i64 range.
        (nanos as i64 & i64::MAX) | 1
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn add_item_rejects_invalid_fields() {
        let response = inventory_add_item(unique_id(), "   ".to_string(), 100, 1);
        assert!(!response.ok);
        assert!(response.message.contains("name"));
    }

    #[test]
    fn add_then_get_roundtrip() {
        let id = unique_id();
        let created = inventory_add_item(id, "Torx screw".to_string(), 15, 400);
        assert!(created.ok, "{}", created.message);
        assert_eq!(created.item_id, Some(id));

        let detail = inventory_get_item(id);
        let item = detail.item.expect("created item should be readable");
        assert_eq!(item.name, "Torx screw");
        assert_eq!(item.price_cents, 15);
        assert_eq!(item.display_price, "0.15");
        assert_eq!(item.quantity, 400);
    }

    #[test]
    fn conflicting_add_reports_noop_and_keeps_existing_row() {
        let id = unique_id();
        let created = inventory_add_item(id, "Original".to_string(), 100, 1);
        assert!(created.ok, "{}", created.message);

        let duplicate = inventory_add_item(id, "Impostor".to_string(), 1, 1);
        assert!(duplicate.ok, "{}", duplicate.message);
        assert!(duplicate.message.contains("already in use"));

        let detail = inventory_get_item(id);
        assert_eq!(detail.item.expect("row should exist").name, "Original");
    }

    #[test]
    fn update_then_delete_roundtrip() {
        let id = unique_id();
        let created = inventory_add_item(id, "Gadget".to_string(), 500, 3);
        assert!(created.ok, "{}", created.message);

        let updated = inventory_update_item(id, "Gadget Pro".to_string(), 750, 2);
        assert!(updated.ok, "{}", updated.message);
        let detail = inventory_get_item(id);
        assert_eq!(detail.item.expect("row should exist").name, "Gadget Pro");

        let deleted = inventory_delete_item(id);
        assert!(deleted.ok, "{}", deleted.message);
        assert!(inventory_get_item(id).item.is_none());
    }

    #[test]
    fn list_contains_added_item() {
        let id = unique_id();
        let created = inventory_add_item(id, "Anchor".to_string(), 30, 12);
        assert!(created.ok, "{}", created.message);

        let listing = inventory_list_items();
        assert!(listing.items.iter().any(|item| item.id == id));
    }
}
