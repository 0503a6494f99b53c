//! Request extractors that report bad input as validation errors.
//!
//! Axum's stock `Path` and `Json` rejections answer with a mix of 400, 415
//! and 422 plain-text bodies. These wrappers fold every decoding failure into
//! `ValidationError` so clients always get a 422 naming the offending field.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{HeaderMap, header, request::Parts},
};
use serde::de::DeserializeOwned;

use crate::domain::{AppError, ItemId, ValidationError};

/// The `{id}` path segment of `/items/{id}`, parsed as an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemIdParam(pub ItemId);

impl<S> FromRequestParts<S> for ItemIdParam
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ValidationError::invalid_field("id", rejection.body_text()))?;

        raw.trim().parse::<ItemId>().map(Self).map_err(|_| {
            AppError::from(ValidationError::invalid_field(
                "id",
                format!("must be an integer, got '{raw}'"),
            ))
        })
    }
}

/// JSON request body whose decoding failures become `ValidationError`s.
///
/// Failures serde can pin to a field are reported under that field's path;
/// syntax errors and wrong content types are reported under `body`. A
/// request without a `Content-Type` header is decoded as JSON.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !accepts_json(req.headers()) {
            return Err(ValidationError::MalformedBody(
                "Expected request with `Content-Type: application/json`".to_string(),
            )
            .into());
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ValidationError::MalformedBody(rejection.body_text()))?;

        Ok(Self(decode_json(&bytes)?))
    }
}

/// Absent content type is treated as JSON; otherwise `application/json` or
/// any `application/*+json` subtype.
fn accepts_json(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(header::CONTENT_TYPE) else {
        return true;
    };
    let Ok(value) = value.to_str() else {
        return false;
    };
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ValidationError> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let value: T = serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let path = err.path().to_string();
        let inner = err.into_inner();
        let reason = inner.to_string();

        if !inner.is_data() {
            return ValidationError::MalformedBody(reason);
        }
        // Missing fields are raised by the enclosing struct, so the path stops short
        match missing_field(&reason).map(str::to_owned) {
            Some(field) if path == "." => ValidationError::invalid_field(field, reason),
            Some(field) => ValidationError::invalid_field(format!("{path}.{field}"), reason),
            None if path == "." => ValidationError::MalformedBody(reason),
            None => ValidationError::invalid_field(path, reason),
        }
    })?;
    deserializer
        .end()
        .map_err(|err| ValidationError::MalformedBody(err.to_string()))?;

    Ok(value)
}

/// Field name out of serde's "missing field `name`" message.
fn missing_field(reason: &str) -> Option<&str> {
    reason
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next())
}
