use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::Order;
use crate::routes::views::OrderView;
use crate::routes::AppState;

#[derive(Serialize)]
pub struct OrderListResponse {
    pub success: bool,
    pub orders: Vec<OrderView>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/orders", get(list_orders))
}

async fn list_orders(State(state): State<AppState>) -> AppResult<Json<OrderListResponse>> {
    let conn = state.db.connect().map_err(AppError::from)?;
    let orders = Order::list_all(&conn).await?;

    Ok(Json(OrderListResponse {
        success: true,
        orders: OrderView::build_all(&conn, orders).await?,
    }))
}
