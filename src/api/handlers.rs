//! HTTP request handlers and the error-to-status mapping.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use crate::app::AppState;
use crate::domain::{
    AppError, CreateItemRequest, ErrorDetail, ErrorResponse, Item, MessageResponse, StoreError,
    UpdateItemRequest,
};

use super::extract::{ItemIdParam, JsonBody};

pub const WELCOME_MESSAGE: &str = "Welcome to API-SUT! Visit /docs for Swagger documentation.";
pub const HEALTHY_MESSAGE: &str = "API-SUT is healthy and running!";

/// Welcome message
pub async fn root_handler() -> Json<MessageResponse> {
    Json(MessageResponse::new(WELCOME_MESSAGE))
}

/// Liveness check; the store is in-process, so there is nothing else to probe.
pub async fn health_check_handler() -> Json<MessageResponse> {
    Json(MessageResponse::new(HEALTHY_MESSAGE))
}

/// List all items
pub async fn list_items_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Item>> {
    Json(state.service.list_items().await)
}

/// Get a single item by ID
pub async fn get_item_handler(
    State(state): State<Arc<AppState>>,
    ItemIdParam(id): ItemIdParam,
) -> Result<Json<Item>, AppError> {
    let item = state.service.get_item(id).await?;
    Ok(Json(item))
}

/// Create a new item
pub async fn create_item_handler(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<CreateItemRequest>,
) -> Result<(StatusCode, Json<Item>), AppError> {
    let item = state.service.create_item(&payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Replace an existing item
pub async fn update_item_handler(
    State(state): State<Arc<AppState>>,
    ItemIdParam(id): ItemIdParam,
    JsonBody(payload): JsonBody<UpdateItemRequest>,
) -> Result<Json<Item>, AppError> {
    let item = state.service.update_item(id, &payload).await?;
    Ok(Json(item))
}

/// Delete an item
pub async fn delete_item_handler(
    State(state): State<Arc<AppState>>,
    ItemIdParam(id): ItemIdParam,
) -> Result<StatusCode, AppError> {
    state.service.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Prometheus text exposition
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: ErrorDetail {
                    r#type: "not_found".to_string(),
                    message: "Metrics recorder is not installed".to_string(),
                    fields: Vec::new(),
                },
            }),
        )
            .into_response(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, fields) = match &self {
            AppError::Store(StoreError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "not_found", Vec::new())
            }
            AppError::Validation(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                err.violations(),
            ),
        };
        let message = self.to_string();

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                r#type: error_type.to_string(),
                message,
                fields,
            },
        });

        (status, body).into_response()
    }
}
