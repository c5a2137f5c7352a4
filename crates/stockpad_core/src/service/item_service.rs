//! Item use-case service.
//!
//! # Responsibility
//! - Republish the data-access operations under caller-facing names so the
//!   backing store stays substitutable.
//!
//! # Invariants
//! - Pure delegation: every method forwards its arguments unchanged and
//!   returns the repository result unchanged.
//! - No state, caching, or validation is introduced at this layer.

use crate::model::item::{Item, ItemId};
use crate::repo::item_repo::{ItemRepository, RepoResult};
use crate::watch::Watch;

/// Caller-facing repository over any [`ItemRepository`] implementation.
pub struct ItemService<R: ItemRepository> {
    repo: R,
}

impl<R: ItemRepository> ItemService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Inserts an item; a primary-key conflict is silently ignored.
    pub fn insert_item(&self, item: &Item) -> RepoResult<()> {
        self.repo.insert(item)
    }

    /// Replaces the stored item matching the given item's id, if present.
    pub fn update_item(&self, item: &Item) -> RepoResult<()> {
        self.repo.update(item)
    }

    /// Deletes the stored item matching the given item's id, if present.
    pub fn delete_item(&self, item: &Item) -> RepoResult<()> {
        self.repo.delete(item)
    }

    /// Live single-item query.
    ///
    /// # Contract
    /// - An id matching no row yields `None` immediately; absence is a
    ///   legitimate emitted value, not an error.
    pub fn item_stream(&self, id: ItemId) -> RepoResult<Watch<Option<Item>>> {
        self.repo.watch_item(id)
    }

    /// Live full-table query, ordered by name ascending.
    pub fn all_items_stream(&self) -> RepoResult<Watch<Vec<Item>>> {
        self.repo.watch_all_items()
    }

    /// One-shot snapshot of the row matching `id`.
    pub fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        self.repo.get_item(id)
    }

    /// One-shot snapshot of the full ordered table contents.
    pub fn list_items(&self) -> RepoResult<Vec<Item>> {
        self.repo.get_all_items()
    }
}
