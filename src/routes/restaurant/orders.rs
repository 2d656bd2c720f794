use axum::{
    extract::{Extension, Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::AuthRestaurant;
use crate::models::{now_ts, Order, OrderStatus, PaymentStatus};
use crate::routes::views::OrderView;
use crate::routes::AppState;

#[derive(Deserialize)]
pub struct UpdateOrderRequest {
    pub order_status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Serialize)]
pub struct OrderListResponse {
    pub success: bool,
    pub orders: Vec<OrderView>,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: OrderView,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/{id}", get(get_order).put(update_order))
}

/// Loads an order only if it belongs to `restaurant_id`.
async fn owned_order(conn: &libsql::Connection, restaurant_id: &str, id: &str) -> AppResult<Order> {
    Order::find_by_id(conn, id)
        .await?
        .filter(|o| o.restaurant_id == restaurant_id)
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

async fn list_orders(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthRestaurant>,
) -> AppResult<Json<OrderListResponse>> {
    let conn = state.db.connect().map_err(AppError::from)?;
    let orders = Order::list_by_restaurant(&conn, &auth.id).await?;

    Ok(Json(OrderListResponse {
        success: true,
        orders: OrderView::build_all(&conn, orders).await?,
    }))
}

async fn get_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthRestaurant>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderResponse>> {
    let conn = state.db.connect().map_err(AppError::from)?;
    let order = owned_order(&conn, &auth.id, &id).await?;

    Ok(Json(OrderResponse {
        success: true,
        order: OrderView::build(&conn, order).await?,
    }))
}

async fn update_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthRestaurant>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateOrderRequest>,
) -> AppResult<Json<OrderResponse>> {
    if payload.order_status.is_none() && payload.payment_status.is_none() {
        return Err(AppError::BadRequest("Nothing to update".to_string()));
    }

    let conn = state.db.connect().map_err(AppError::from)?;
    let mut order = owned_order(&conn, &auth.id, &id).await?;

    order.apply_update(payload.order_status, payload.payment_status, now_ts())?;
    order.save_lifecycle(&conn).await?;

    tracing::info!(
        "Order {} is now {} / {}",
        order.id,
        order.order_status,
        order.payment_status
    );

    Ok(Json(OrderResponse {
        success: true,
        order: OrderView::build(&conn, order).await?,
    }))
}
