//! Domain layer containing core business types, traits, and error definitions.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{AppError, ConfigError, FieldViolation, StoreError, ValidationError};
pub use traits::{Clock, ItemRepository, SystemClock};
pub use types::{
    CreateItemRequest, ErrorDetail, ErrorResponse, Item, ItemId, ItemRequest, MessageResponse,
    NewItem, RateLimitResponse, UpdateItemRequest,
};
