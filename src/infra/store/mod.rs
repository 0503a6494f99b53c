//! Concrete item store implementations.
//!
//! This module contains the adapters that implement the `ItemRepository`
//! trait defined in the domain layer.

pub mod memory;
pub mod seed;

pub use memory::InMemoryItemRepository;
pub use seed::seed_items;
