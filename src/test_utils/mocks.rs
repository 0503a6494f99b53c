//! Mock implementations for testing.
//!
//! These mocks make time deterministic and let tests observe how the
//! service layer drives the store.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::{Clock, Item, ItemId, ItemRepository, NewItem, StoreError};
use crate::infra::InMemoryItemRepository;

/// Manually driven clock. Starts at 2024-01-15T10:30:00Z and only moves
/// when [`MockClock::advance`] is called.
pub struct MockClock {
    now: Mutex<DateTime<Utc>>,
}

impl MockClock {
    #[must_use]
    pub fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2024, 1, 15, 10, 30, 0)
            .single()
            .unwrap_or_default();
        Self::starting_at(start)
    }

    #[must_use]
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Repository wrapper that counts calls before delegating to a real
/// in-memory store.
///
/// # Example
///
/// ```ignore
/// use api_sut::test_utils::MockItemRepository;
///
/// let repository = MockItemRepository::seeded();
/// assert_eq!(repository.call_count(), 0);
/// ```
pub struct MockItemRepository {
    inner: InMemoryItemRepository,
    clock: Arc<MockClock>,
    call_count: AtomicU64,
}

impl MockItemRepository {
    /// An empty store on a [`MockClock`].
    #[must_use]
    pub fn new() -> Self {
        let clock = Arc::new(MockClock::new());
        Self {
            inner: InMemoryItemRepository::new(clock.clone()),
            clock,
            call_count: AtomicU64::new(0),
        }
    }

    /// A store holding the demo records on a [`MockClock`].
    #[must_use]
    pub fn seeded() -> Self {
        let clock = Arc::new(MockClock::new());
        let inner = InMemoryItemRepository::with_seed_data(clock.clone())
            .unwrap_or_else(|_| InMemoryItemRepository::new(clock.clone()));
        Self {
            inner,
            clock,
            call_count: AtomicU64::new(0),
        }
    }

    /// The clock the wrapped store stamps items with.
    pub fn clock(&self) -> &MockClock {
        &self.clock
    }

    /// Gets the number of times any repository method was called.
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    fn increment_call_count(&self) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for MockItemRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemRepository for MockItemRepository {
    async fn list_items(&self) -> Vec<Item> {
        self.increment_call_count();
        self.inner.list_items().await
    }

    async fn get_item(&self, id: ItemId) -> Result<Item, StoreError> {
        self.increment_call_count();
        self.inner.get_item(id).await
    }

    async fn create_item(&self, fields: NewItem) -> Item {
        self.increment_call_count();
        self.inner.create_item(fields).await
    }

    async fn update_item(&self, id: ItemId, fields: NewItem) -> Result<Item, StoreError> {
        self.increment_call_count();
        self.inner.update_item(id, fields).await
    }

    async fn delete_item(&self, id: ItemId) -> Result<(), StoreError> {
        self.increment_call_count();
        self.inner.delete_item(id).await
    }
}
