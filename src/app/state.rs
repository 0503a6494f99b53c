//! Application state management.
//!
//! This module provides the shared application state that is
//! accessible to all request handlers via Axum's State extractor.

use std::sync::Arc;

use crate::domain::ItemRepository;
use crate::infra::PrometheusHandle;

use super::service::AppService;

/// Shared application state for the Axum web server.
///
/// Handlers reach the store only through `service`; they never see the
/// concrete repository type.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
///
/// let repository = Arc::new(InMemoryItemRepository::with_defaults()?);
/// let state = AppState::new(repository);
///
/// let router = create_router(Arc::new(state));
/// ```
#[derive(Clone)]
pub struct AppState {
    /// The application service containing business logic.
    pub service: Arc<AppService>,

    /// Prometheus scrape handle, when a recorder is installed.
    pub metrics: Option<Arc<PrometheusHandle>>,
}

impl AppState {
    /// Creates a new `AppState` wired to the given repository.
    #[must_use]
    pub fn new(repository: Arc<dyn ItemRepository>) -> Self {
        Self {
            service: Arc::new(AppService::new(repository)),
            metrics: None,
        }
    }

    /// Attaches a Prometheus handle so `GET /metrics` can render it.
    #[must_use]
    pub fn with_metrics(mut self, handle: Arc<PrometheusHandle>) -> Self {
        self.metrics = Some(handle);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockItemRepository;

    #[test]
    fn test_app_state_creation() {
        let state = AppState::new(Arc::new(MockItemRepository::new()));

        assert!(Arc::strong_count(&state.service) >= 1);
        assert!(state.metrics.is_none());
    }

    #[test]
    fn test_app_state_is_clone() {
        let state = AppState::new(Arc::new(MockItemRepository::new()));
        let cloned = state.clone();

        // Both should point to the same service
        assert!(Arc::ptr_eq(&state.service, &cloned.service));
    }
}
