//! API-SUT
//!
//! A small CRUD service over a single resource, the item, backed by a
//! volatile in-memory store pre-loaded with five demo records. Status codes,
//! validation rules and data are deterministic so the service can serve as a
//! stable target for API testing practice.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   API Layer                  │
//! │  Handlers, extractors, routing, rate limits  │
//! ├─────────────────────────────────────────────┤
//! │               Application Layer              │
//! │   Validation, item use cases, config, state  │
//! ├─────────────────────────────────────────────┤
//! │                 Domain Layer                 │
//! │        Item types, store trait, errors       │
//! ├─────────────────────────────────────────────┤
//! │             Infrastructure Layer             │
//! │     In-memory item store, logs, metrics      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Routes
//!
//! | Method | Path          | Success | Failure              |
//! |--------|---------------|---------|----------------------|
//! | GET    | `/`           | 200     |                      |
//! | GET    | `/health`     | 200     |                      |
//! | GET    | `/items`      | 200     |                      |
//! | GET    | `/items/{id}` | 200     | 404, 422 (bad id)    |
//! | POST   | `/items`      | 201     | 422                  |
//! | PUT    | `/items/{id}` | 200     | 404, 422             |
//! | DELETE | `/items/{id}` | 204     | 404, 422 (bad id)    |
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use api_sut::api::create_router;
//! use api_sut::app::AppState;
//! use api_sut::infra::InMemoryItemRepository;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let repository = Arc::new(InMemoryItemRepository::with_defaults()?);
//!     let state = Arc::new(AppState::new(repository));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//!     axum::serve(listener, create_router(state)).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod app;
pub mod domain;
pub mod infra;

// Test utilities are available in tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
