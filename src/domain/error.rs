//! Application error types with proper error chaining.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::ItemId;

/// A single rejected input field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub reason: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Item with id {0} not found")]
    NotFound(ItemId),
}

/// Startup configuration error; the process refuses to start on any of these.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
    #[error("Validation failed: {}", summarize(.0))]
    Multiple(Vec<FieldViolation>),
}

impl ValidationError {
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The `(field, reason)` pairs carried by this error.
    #[must_use]
    pub fn violations(&self) -> Vec<FieldViolation> {
        match self {
            ValidationError::InvalidField { field, reason } => {
                vec![FieldViolation::new(field.clone(), reason.clone())]
            }
            ValidationError::MalformedBody(reason) => {
                vec![FieldViolation::new("body", reason.clone())]
            }
            ValidationError::Multiple(violations) => violations.clone(),
        }
    }
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut violations: Vec<FieldViolation> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| {
                    let reason = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    FieldViolation::new(field.to_string(), reason)
                })
            })
            .collect();
        // field_errors() is backed by a HashMap
        violations.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.reason.cmp(&b.reason)));

        match violations.len() {
            1 => {
                let FieldViolation { field, reason } = violations.remove(0);
                ValidationError::InvalidField { field, reason }
            }
            _ => ValidationError::Multiple(violations),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(ValidationError::from(err))
    }
}
