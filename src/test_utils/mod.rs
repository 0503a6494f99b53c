//! Test utilities and mock implementations.
//!
//! This module provides a deterministic clock and an instrumented item
//! repository for use in unit and integration tests.

pub mod mocks;

pub use mocks::{MockClock, MockItemRepository};
