//! Volatile, process-lifetime item store.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::{
    Clock, Item, ItemId, ItemRepository, NewItem, StoreError, SystemClock, ValidationError,
};

use super::seed::seed_items;

/// Ids are issued in increasing order, so iterating the map by key yields
/// insertion order. `last_issued` is kept apart from the map so that deleting
/// the newest item never frees its id for reuse.
#[derive(Debug, Default)]
struct ItemTable {
    items: BTreeMap<ItemId, Item>,
    last_issued: ItemId,
}

impl ItemTable {
    fn insert(&mut self, fields: NewItem, now: DateTime<Utc>) -> Item {
        self.last_issued += 1;
        let item = Item::new(self.last_issued, fields, now);
        self.items.insert(item.id, item.clone());
        item
    }
}

/// In-memory [`ItemRepository`] guarded by a single read/write lock.
pub struct InMemoryItemRepository {
    table: RwLock<ItemTable>,
    clock: Arc<dyn Clock>,
}

impl InMemoryItemRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: RwLock::new(ItemTable::default()),
            clock,
        }
    }

    /// Create a store holding the five demo records under ids 1–5.
    pub fn with_seed_data(clock: Arc<dyn Clock>) -> Result<Self, ValidationError> {
        let mut table = ItemTable::default();
        for fields in seed_items()? {
            let now = clock.now().trunc_subsecs(6);
            table.insert(fields, now);
        }
        info!(count = table.items.len(), "Seeded item store");

        Ok(Self {
            table: RwLock::new(table),
            clock,
        })
    }

    /// Seeded store on the system clock.
    pub fn with_defaults() -> Result<Self, ValidationError> {
        Self::with_seed_data(Arc::new(SystemClock))
    }

    /// Timestamps are kept at the precision they are serialized with, so an
    /// item read back over the wire compares equal to the stored one.
    fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(6)
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn list_items(&self) -> Vec<Item> {
        let table = self.table.read().await;
        table.items.values().cloned().collect()
    }

    async fn get_item(&self, id: ItemId) -> Result<Item, StoreError> {
        let table = self.table.read().await;
        table.items.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn create_item(&self, fields: NewItem) -> Item {
        let mut table = self.table.write().await;
        let item = table.insert(fields, self.now());
        debug!(item_id = item.id, "Inserted item");
        item
    }

    async fn update_item(&self, id: ItemId, fields: NewItem) -> Result<Item, StoreError> {
        let now = self.now();
        let mut table = self.table.write().await;
        let existing = table.items.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        // updated_at must move forward even when the clock has not
        let now = now.max(existing.updated_at + TimeDelta::microseconds(1));
        existing.replace(fields, now);
        debug!(item_id = id, "Replaced item");
        Ok(existing.clone())
    }

    async fn delete_item(&self, id: ItemId) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        table.items.remove(&id).ok_or(StoreError::NotFound(id))?;
        debug!(item_id = id, "Removed item");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ItemRequest;
    use crate::test_utils::MockClock;

    fn fields(name: &str, price: f64, quantity: i64) -> NewItem {
        NewItem::try_from(ItemRequest::new(name, price, quantity)).unwrap()
    }

    fn seeded() -> (Arc<MockClock>, InMemoryItemRepository) {
        let clock = Arc::new(MockClock::new());
        let repo = InMemoryItemRepository::with_seed_data(clock.clone()).unwrap();
        (clock, repo)
    }

    #[tokio::test]
    async fn test_fresh_store_lists_seed_items_in_order() {
        let (_, repo) = seeded();

        let items = repo.list_items().await;
        let ids: Vec<ItemId> = items.iter().map(|i| i.id).collect();

        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(items[0].name, "Wireless Mouse");
        assert_eq!(items[0].price, 29.99);
        assert_eq!(items[0].quantity, 150);
        assert_eq!(items[4].name, "Webcam HD");
        assert!(items.iter().all(|i| i.created_at == i.updated_at));
    }

    #[tokio::test]
    async fn test_empty_store() {
        let repo = InMemoryItemRepository::new(Arc::new(MockClock::new()));
        assert!(repo.list_items().await.is_empty());

        let item = repo.create_item(fields("First", 1.0, 1)).await;
        assert_eq!(item.id, 1);
    }

    #[tokio::test]
    async fn test_create_assigns_next_id_and_equal_timestamps() {
        let (_, repo) = seeded();

        let item = repo.create_item(fields("Pen", 1.5, 10)).await;

        assert_eq!(item.id, 6);
        assert_eq!(item.created_at, item.updated_at);
        assert_eq!(item.price, 1.5);
        assert_eq!(item.quantity, 10);
        assert_eq!(repo.get_item(6).await.unwrap(), item);
    }

    #[tokio::test]
    async fn test_get_missing_item() {
        let (_, repo) = seeded();
        assert_eq!(repo.get_item(999).await, Err(StoreError::NotFound(999)));
    }

    #[tokio::test]
    async fn test_update_replaces_fields_and_advances_updated_at() {
        let (clock, repo) = seeded();
        let before = repo.get_item(1).await.unwrap();

        clock.advance(TimeDelta::seconds(2));
        let replacement =
            NewItem::try_from(ItemRequest::new("Mouse X", 19.99, 100).with_description(""))
                .unwrap();
        let updated = repo.update_item(1, replacement).await.unwrap();

        assert_eq!(updated.id, 1);
        assert_eq!(updated.name, "Mouse X");
        assert_eq!(updated.description.as_deref(), Some(""));
        assert_eq!(updated.price, 19.99);
        assert_eq!(updated.quantity, 100);
        assert_eq!(updated.created_at, before.created_at);
        assert!(updated.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn test_update_is_whole_record_replacement() {
        let (_, repo) = seeded();

        let updated = repo.update_item(2, fields("Keyboard", 99.0, 1)).await.unwrap();

        // description was not supplied, so it is cleared
        assert!(updated.description.is_none());
    }

    #[tokio::test]
    async fn test_update_advances_updated_at_when_clock_is_frozen() {
        let (_, repo) = seeded();
        let before = repo.get_item(3).await.unwrap();

        let first = repo.update_item(3, fields("Hub", 10.0, 1)).await.unwrap();
        let second = repo.update_item(3, fields("Hub", 11.0, 1)).await.unwrap();

        assert!(first.updated_at > before.updated_at);
        assert!(second.updated_at > first.updated_at);
        assert_eq!(second.created_at, before.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_item_leaves_store_unchanged() {
        let (_, repo) = seeded();
        let before = repo.list_items().await;

        let result = repo.update_item(42, fields("Ghost", 1.0, 1)).await;

        assert_eq!(result, Err(StoreError::NotFound(42)));
        assert_eq!(repo.list_items().await, before);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let (_, repo) = seeded();

        repo.delete_item(3).await.unwrap();

        assert_eq!(repo.get_item(3).await, Err(StoreError::NotFound(3)));
        let items = repo.list_items().await;
        assert_eq!(items.len(), 4);
        assert!(items.iter().all(|i| i.id != 3));
    }

    #[tokio::test]
    async fn test_delete_missing_item_leaves_store_unchanged() {
        let (_, repo) = seeded();
        let before = repo.list_items().await;

        assert_eq!(repo.delete_item(77).await, Err(StoreError::NotFound(77)));
        assert_eq!(repo.list_items().await, before);
    }

    #[tokio::test]
    async fn test_ids_are_never_reused() {
        let (_, repo) = seeded();

        repo.delete_item(3).await.unwrap();
        let created = repo.create_item(fields("Pen", 1.0, 1)).await;
        assert_eq!(created.id, 6);

        // Deleting the newest item must not hand its id out again
        repo.delete_item(6).await.unwrap();
        let next = repo.create_item(fields("Pencil", 1.0, 1)).await;
        assert_eq!(next.id, 7);
    }

    #[tokio::test]
    async fn test_list_preserves_creation_order() {
        let (_, repo) = seeded();
        repo.create_item(fields("B", 1.0, 1)).await;
        repo.create_item(fields("A", 1.0, 1)).await;

        let names: Vec<String> = repo
            .list_items()
            .await
            .into_iter()
            .skip(5)
            .map(|i| i.name)
            .collect();

        assert_eq!(names, vec!["B".to_string(), "A".to_string()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_get_distinct_ids() {
        let (_, repo) = seeded();
        let repo = Arc::new(repo);

        let handles: Vec<_> = (0..50)
            .map(|n| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move {
                    repo.create_item(fields(&format!("Item {n}"), 1.0, n)).await
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().id);
        }
        ids.sort_unstable();

        assert_eq!(ids, (6..=55).collect::<Vec<ItemId>>());
        assert_eq!(repo.list_items().await.len(), 55);
    }
}
