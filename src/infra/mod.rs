//! Infrastructure layer implementations.

pub mod observability;
pub mod store;

pub use observability::{PrometheusHandle, init_metrics_handle, init_tracing};
pub use store::InMemoryItemRepository;
