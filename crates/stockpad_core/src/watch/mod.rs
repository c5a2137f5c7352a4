//! Live query subscription registry.
//!
//! # Responsibility
//! - Track active subscribers for the two supported query shapes: one item
//!   by id, and the whole `items` table ordered by name.
//! - Push re-queried results to subscribers after each committed mutation.
//!
//! # Invariants
//! - A new subscription receives the current query result before any later
//!   change notification.
//! - Each committed row change produces exactly one emission per affected
//!   subscriber.
//! - Dropping a [`Watch`] unsubscribes; stored data is unaffected.

use crate::model::item::{Item, ItemId};
use crossbeam::channel::{unbounded, Receiver, Sender};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Receiving half of a live query.
///
/// A `Watch` is a push-based, potentially infinite stream: the hub sends the
/// current query result at subscription time and a fresh result after every
/// committed mutation that affects the watched shape. Values arrive in
/// commit order and are buffered until received.
#[derive(Debug)]
pub struct Watch<T> {
    rx: Receiver<T>,
}

impl<T> Watch<T> {
    /// Blocks until the next emission.
    ///
    /// Returns `None` once the publishing side has shut down and all
    /// buffered emissions were drained.
    pub fn recv(&self) -> Option<T> {
        self.rx.recv().ok()
    }

    /// Returns the next buffered emission without blocking.
    pub fn try_recv(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Blocks for the next emission up to `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        self.rx.recv_timeout(timeout).ok()
    }
}

struct ItemWatcher {
    id: ItemId,
    tx: Sender<Option<Item>>,
}

struct ListWatcher {
    tx: Sender<Vec<Item>>,
}

/// Subscription registry keyed by query shape.
///
/// Mutation paths re-run the relevant query after commit and hand the result
/// to `publish_item`/`publish_all`; the hub fans it out to live subscribers
/// and prunes those whose receiving half was dropped.
#[derive(Default)]
pub struct WatchHub {
    item_watchers: Mutex<Vec<ItemWatcher>>,
    list_watchers: Mutex<Vec<ListWatcher>>,
}

impl WatchHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a single-item subscriber and seeds it with `current`.
    ///
    /// An absent row (`None`) is a legitimate seeded or emitted value.
    pub fn watch_item(&self, id: ItemId, current: Option<Item>) -> Watch<Option<Item>> {
        let (tx, rx) = unbounded();
        // The receiver is still in scope, so the seed send cannot fail.
        let _ = tx.send(current);
        lock(&self.item_watchers).push(ItemWatcher { id, tx });
        Watch { rx }
    }

    /// Registers a whole-table subscriber and seeds it with `current`.
    pub fn watch_all(&self, current: Vec<Item>) -> Watch<Vec<Item>> {
        let (tx, rx) = unbounded();
        let _ = tx.send(current);
        lock(&self.list_watchers).push(ListWatcher { tx });
        Watch { rx }
    }

    /// Returns whether any subscriber watches the given item id.
    pub fn has_item_watchers(&self, id: ItemId) -> bool {
        lock(&self.item_watchers)
            .iter()
            .any(|watcher| watcher.id == id)
    }

    /// Returns whether any whole-table subscriber is registered.
    pub fn has_list_watchers(&self) -> bool {
        !lock(&self.list_watchers).is_empty()
    }

    /// Pushes the current row state for `id` to its subscribers.
    pub fn publish_item(&self, id: ItemId, value: &Option<Item>) {
        lock(&self.item_watchers)
            .retain(|watcher| watcher.id != id || watcher.tx.send(value.clone()).is_ok());
    }

    /// Pushes the current ordered table contents to whole-table subscribers.
    pub fn publish_all(&self, items: &[Item]) {
        lock(&self.list_watchers).retain(|watcher| watcher.tx.send(items.to_vec()).is_ok());
    }
}

// Registry locks are never held across panicking code; a poisoned lock is
// recovered, not propagated to unrelated subscribers.
fn lock<T>(mutex: &Mutex<Vec<T>>) -> MutexGuard<'_, Vec<T>> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::WatchHub;
    use crate::model::item::Item;

    fn item(id: i64, name: &str) -> Item {
        Item::new(id, name, 100, 1).expect("test item should be valid")
    }

    #[test]
    fn watch_item_seeds_current_value() {
        let hub = WatchHub::new();

        let watch = hub.watch_item(7, Some(item(7, "bolt")));
        assert_eq!(watch.try_recv(), Some(Some(item(7, "bolt"))));
        assert_eq!(watch.try_recv(), None);
    }

    #[test]
    fn watch_item_seeds_absent_value_for_unknown_id() {
        let hub = WatchHub::new();

        let watch = hub.watch_item(404, None);
        assert_eq!(watch.try_recv(), Some(None));
    }

    #[test]
    fn publish_item_reaches_only_matching_subscribers() {
        let hub = WatchHub::new();
        let first = hub.watch_item(1, None);
        let second = hub.watch_item(2, None);
        assert_eq!(first.try_recv(), Some(None));
        assert_eq!(second.try_recv(), Some(None));

        hub.publish_item(1, &Some(item(1, "washer")));

        assert_eq!(first.try_recv(), Some(Some(item(1, "washer"))));
        assert_eq!(second.try_recv(), None);
    }

    #[test]
    fn dropped_subscribers_are_pruned_on_publish() {
        let hub = WatchHub::new();
        let kept = hub.watch_all(Vec::new());
        let dropped = hub.watch_all(Vec::new());
        drop(dropped);

        hub.publish_all(&[item(1, "washer")]);
        hub.publish_all(&[item(1, "washer"), item(2, "bolt")]);

        assert_eq!(kept.recv().map(|items| items.len()), Some(0));
        assert_eq!(kept.recv().map(|items| items.len()), Some(1));
        assert_eq!(kept.recv().map(|items| items.len()), Some(2));
        assert_eq!(lock_len(&hub), 1);
    }

    #[test]
    fn has_watchers_reflects_registrations() {
        let hub = WatchHub::new();
        assert!(!hub.has_item_watchers(5));
        assert!(!hub.has_list_watchers());

        let _item_watch = hub.watch_item(5, None);
        let _list_watch = hub.watch_all(Vec::new());

        assert!(hub.has_item_watchers(5));
        assert!(!hub.has_item_watchers(6));
        assert!(hub.has_list_watchers());
    }

    fn lock_len(hub: &WatchHub) -> usize {
        super::lock(&hub.list_watchers).len()
    }
}
