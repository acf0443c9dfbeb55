use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;
use kitchen_order::validate_new_order;
use kitchen_shared::{Order, OrderStatus};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/queue", get(production_queue))
        .route("/orders/{order_id}/status", put(update_order_status))
}

/// POST /orders
/// Accept a new order into the kitchen queue
async fn create_order(
    State(state): State<AppState>,
    Json(order): Json<Order>,
) -> Result<Json<Order>, AppError> {
    validate_new_order(&order).map_err(AppError::ValidationError)?;

    let created = state.orders.create_order(order).await?;
    Ok(Json(created))
}

/// PUT /orders/:order_id/status
async fn update_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, AppError> {
    let updated = state
        .orders
        .update_status(order_id, req.status)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Order {} not found", order_id)))?;

    Ok(Json(updated))
}

/// GET /orders/queue
/// Every order currently known to the kitchen, unordered
async fn production_queue(State(state): State<AppState>) -> Result<Json<Vec<Order>>, AppError> {
    let queue = state.orders.list_queue().await?;
    debug!(orders = queue.len(), "Production queue listed");
    Ok(Json(queue))
}
