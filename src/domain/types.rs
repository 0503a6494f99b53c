use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::error::{FieldViolation, ValidationError};

/// Identifier assigned to an item by the store.
pub type ItemId = i64;

pub const NAME_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Core domain entity representing an item stored in the system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Builds a freshly created item; both timestamps are set to `now`.
    pub fn new(id: ItemId, fields: NewItem, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: fields.name,
            description: fields.description,
            price: fields.price,
            quantity: fields.quantity,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every mutable field, keeping `id` and `created_at`.
    pub fn replace(&mut self, fields: NewItem, now: DateTime<Utc>) {
        self.name = fields.name;
        self.description = fields.description;
        self.price = fields.price;
        self.quantity = fields.quantity;
        self.updated_at = now;
    }
}

/// Request payload for creating or replacing an item.
///
/// Deserialization only checks shape and JSON types; the field constraints
/// are enforced by [`Validate`] before anything reaches the store.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ItemRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    #[validate(custom(function = "validate_description"))]
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "must be greater than 0"))]
    pub price: f64,
    #[validate(range(min = 0, message = "must be 0 or greater"))]
    pub quantity: i64,
}

/// `POST /items` body.
pub type CreateItemRequest = ItemRequest;

/// `PUT /items/{id}` body. Whole-record replacement, so the shape matches creation.
pub type UpdateItemRequest = ItemRequest;

impl ItemRequest {
    pub fn new(name: impl Into<String>, price: f64, quantity: i64) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            quantity,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Blank check is on the trimmed name, the length cap on the name as sent,
/// which is also what gets stored.
fn validate_name(name: &str) -> Result<(), validator::ValidationError> {
    if name.trim().is_empty() {
        return Err(validator::ValidationError::new("length")
            .with_message("must not be blank".into()));
    }
    check_max_chars(name, NAME_MAX_CHARS)
}

fn validate_description(description: &str) -> Result<(), validator::ValidationError> {
    check_max_chars(description, DESCRIPTION_MAX_CHARS)
}

fn check_max_chars(value: &str, max: usize) -> Result<(), validator::ValidationError> {
    if value.chars().count() > max {
        return Err(validator::ValidationError::new("length")
            .with_message(format!("must be at most {max} characters").into()));
    }
    Ok(())
}

/// A field set that has passed validation. The only way to obtain one is
/// through [`TryFrom<ItemRequest>`], so the store never sees bad input.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    name: String,
    description: Option<String>,
    price: f64,
    quantity: i64,
}

impl NewItem {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }
}

impl TryFrom<ItemRequest> for NewItem {
    type Error = ValidationError;

    fn try_from(request: ItemRequest) -> Result<Self, Self::Error> {
        request.validate()?;
        // NaN and infinities compare false against the range bounds
        if !request.price.is_finite() {
            return Err(ValidationError::invalid_field(
                "price",
                "must be a finite number",
            ));
        }
        Ok(Self {
            name: request.name,
            description: request.description,
            price: request.price,
            quantity: request.quantity,
        })
    }
}

/// Static `{"message": ...}` payload used by the root and health endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body returned for every non-2xx outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorDetail {
    pub r#type: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldViolation>,
}

/// Body of a 429 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitResponse {
    pub error: ErrorDetail,
    pub retry_after: u64,
}

/// Fixed-width RFC 3339 timestamps with microsecond precision, so the
/// textual form sorts the same way as the instant it encodes.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

    pub fn format(value: &DateTime<Utc>) -> String {
        value.format(FORMAT).to_string()
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(D::Error::custom)
    }
}
