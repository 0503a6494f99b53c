//! Domain traits defining contracts for the item store and its time source.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::StoreError;
use super::types::{Item, ItemId, NewItem};

/// Owner of the id → item mapping.
///
/// Implementations must serialize mutations against each other and against
/// reads, and must never hand out an id twice, deleted ids included.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// All items in insertion order.
    async fn list_items(&self) -> Vec<Item>;

    /// Get a single item by ID
    async fn get_item(&self, id: ItemId) -> Result<Item, StoreError>;

    /// Store a new item under a fresh id.
    async fn create_item(&self, fields: NewItem) -> Item;

    /// Replace every mutable field of an existing item.
    async fn update_item(&self, id: ItemId, fields: NewItem) -> Result<Item, StoreError>;

    /// Remove an item permanently.
    async fn delete_item(&self, id: ItemId) -> Result<(), StoreError>;
}

/// Source of the current time for item timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
