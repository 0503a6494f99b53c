//! Application service layer.
//!
//! This module contains the item use cases: it validates input, calls the
//! store through the `ItemRepository` abstraction, and records the outcome.

use std::sync::Arc;

use metrics::counter;
use tracing::{info, instrument, warn};

use crate::domain::{
    AppError, CreateItemRequest, Item, ItemId, ItemRepository, NewItem, UpdateItemRequest,
};

const OPERATIONS_METRIC: &str = "api_sut_item_operations_total";

/// Application service containing the item use cases.
///
/// Validation happens here, before the repository is touched, so a rejected
/// request never changes the store.
///
/// # Example
///
/// ```ignore
/// let repository = Arc::new(InMemoryItemRepository::with_defaults()?);
/// let service = AppService::new(repository);
///
/// let item = service.create_item(&request).await?;
/// ```
pub struct AppService {
    repository: Arc<dyn ItemRepository>,
}

impl AppService {
    #[must_use]
    pub fn new(repository: Arc<dyn ItemRepository>) -> Self {
        Self { repository }
    }

    /// Lists every item in insertion order.
    #[instrument(skip(self))]
    pub async fn list_items(&self) -> Vec<Item> {
        let items = self.repository.list_items().await;
        record("list", "ok");
        items
    }

    /// Gets an item by ID.
    #[instrument(skip(self))]
    pub async fn get_item(&self, id: ItemId) -> Result<Item, AppError> {
        let result = self.repository.get_item(id).await;
        if result.is_err() {
            warn!(item_id = id, "Item not found");
        }
        finish("get", result.map_err(AppError::from))
    }

    /// Validates the request and stores a new item.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if any field violates its constraints.
    #[instrument(skip(self, request), fields(item_name = %request.name))]
    pub async fn create_item(&self, request: &CreateItemRequest) -> Result<Item, AppError> {
        let fields = validate("create", request)?;
        let item = self.repository.create_item(fields).await;
        info!(item_id = item.id, "Item created");
        finish("create", Ok(item))
    }

    /// Validates the request and replaces every mutable field of an item.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for invalid fields (checked first) and
    /// `AppError::Store` if the item does not exist.
    #[instrument(skip(self, request), fields(item_name = %request.name))]
    pub async fn update_item(
        &self,
        id: ItemId,
        request: &UpdateItemRequest,
    ) -> Result<Item, AppError> {
        let fields = validate("update", request)?;
        let result = self.repository.update_item(id, fields).await;
        match &result {
            Ok(item) => info!(item_id = item.id, "Item updated"),
            Err(e) => warn!(item_id = id, error = %e, "Update rejected"),
        }
        finish("update", result.map_err(AppError::from))
    }

    /// Deletes an item permanently.
    #[instrument(skip(self))]
    pub async fn delete_item(&self, id: ItemId) -> Result<(), AppError> {
        let result = self.repository.delete_item(id).await;
        match &result {
            Ok(()) => info!(item_id = id, "Item deleted"),
            Err(e) => warn!(item_id = id, error = %e, "Delete rejected"),
        }
        finish("delete", result.map_err(AppError::from))
    }
}

fn validate(operation: &'static str, request: &CreateItemRequest) -> Result<NewItem, AppError> {
    NewItem::try_from(request.clone()).map_err(|e| {
        warn!(error = %e, "Validation failed for {operation} request");
        record(operation, "invalid");
        AppError::Validation(e)
    })
}

fn finish<T>(operation: &'static str, result: Result<T, AppError>) -> Result<T, AppError> {
    let outcome = match &result {
        Ok(_) => "ok",
        Err(AppError::Store(_)) => "not_found",
        Err(_) => "error",
    };
    record(operation, outcome);
    result
}

fn record(operation: &'static str, outcome: &'static str) {
    counter!(OPERATIONS_METRIC, "operation" => operation, "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItemRequest, StoreError, ValidationError};
    use crate::test_utils::MockItemRepository;

    fn service_with_mock() -> (Arc<MockItemRepository>, AppService) {
        let repository = Arc::new(MockItemRepository::seeded());
        let service = AppService::new(repository.clone());
        (repository, service)
    }

    #[tokio::test]
    async fn test_list_items_returns_seed_data() {
        let (_, service) = service_with_mock();

        let items = service.list_items().await;

        assert_eq!(items.len(), 5);
        assert_eq!(items[2].name, "USB-C Hub");
    }

    #[tokio::test]
    async fn test_create_item_success() {
        let (repository, service) = service_with_mock();

        let item = service
            .create_item(&ItemRequest::new("Pen", 1.5, 10))
            .await
            .unwrap();

        assert_eq!(item.id, 6);
        assert_eq!(item.name, "Pen");
        assert_eq!(item.created_at, item.updated_at);
        assert_eq!(repository.call_count(), 1);
    }

    #[tokio::test]
    async fn test_create_item_validation_failure_never_reaches_store() {
        let (repository, service) = service_with_mock();

        let result = service.create_item(&ItemRequest::new("", 5.0, 1)).await;

        match result {
            Err(AppError::Validation(ValidationError::InvalidField { field, .. })) => {
                assert_eq!(field, "name")
            }
            other => panic!("expected a name violation, got {other:?}"),
        }
        assert_eq!(repository.call_count(), 0);
        assert_eq!(service.list_items().await.len(), 5);
    }

    #[tokio::test]
    async fn test_update_item_success() {
        let (_, service) = service_with_mock();
        let before = service.get_item(1).await.unwrap();

        let request = ItemRequest::new("Mouse X", 19.99, 100).with_description("");
        let updated = service.update_item(1, &request).await.unwrap();

        assert_eq!(updated.id, 1);
        assert_eq!(updated.name, "Mouse X");
        assert_eq!(updated.created_at, before.created_at);
        assert!(updated.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn test_update_validates_before_existence_check() {
        let (repository, service) = service_with_mock();

        let result = service
            .update_item(999, &ItemRequest::new("Ghost", 0.0, 1))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(repository.call_count(), 0);
    }

    #[tokio::test]
    async fn test_update_missing_item() {
        let (_, service) = service_with_mock();

        let result = service
            .update_item(999, &ItemRequest::new("Ghost", 1.0, 1))
            .await;

        assert!(matches!(
            result,
            Err(AppError::Store(StoreError::NotFound(999)))
        ));
    }

    #[tokio::test]
    async fn test_get_item() {
        let (_, service) = service_with_mock();

        let item = service.get_item(4).await.unwrap();
        assert_eq!(item.name, "Monitor Stand");

        let missing = service.get_item(999).await;
        assert!(matches!(
            missing,
            Err(AppError::Store(StoreError::NotFound(999)))
        ));
    }

    #[tokio::test]
    async fn test_delete_item() {
        let (_, service) = service_with_mock();

        service.delete_item(3).await.unwrap();

        assert!(matches!(
            service.delete_item(3).await,
            Err(AppError::Store(StoreError::NotFound(3)))
        ));
        let next = service
            .create_item(&ItemRequest::new("Pen", 1.0, 1))
            .await
            .unwrap();
        assert!(next.id >= 6);
        assert_ne!(next.id, 3);
    }
}
