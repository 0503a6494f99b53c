//! The API layer, containing web handlers, extractors and routing.

pub mod extract;
pub mod handlers;
pub mod router;

pub use router::{
    RateLimitConfig, create_router, create_router_from_config, create_router_with_rate_limit,
};
