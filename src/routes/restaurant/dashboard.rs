use axum::{
    extract::{Extension, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthRestaurant;
use crate::models::{Order, OrderStatus, Product};
use crate::routes::AppState;

#[derive(Serialize)]
pub struct RestaurantDashboard {
    pub success: bool,
    pub menu: Vec<Product>,
    pub total_menu_items: usize,
    pub running_orders: Vec<Order>,
    pub total_running_orders: usize,
    pub order_requests: i64,
    pub order_history: Vec<Order>,
    pub delivered_orders: Vec<Order>,
    pub total_earnings_cents: i64,
    pub total_earnings: f64,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

async fn get_dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthRestaurant>,
) -> AppResult<Json<RestaurantDashboard>> {
    let conn = state.db.connect().map_err(AppError::from)?;

    let menu = Product::list_by_restaurant(&conn, &auth.id).await?;
    let running_orders = Order::list_by_statuses(&conn, &auth.id, &OrderStatus::RUNNING).await?;
    let order_requests = Order::count_by_status(&conn, &auth.id, OrderStatus::Processing).await?;
    let order_history = Order::history_by_restaurant(&conn, &auth.id).await?;
    let delivered_orders = Order::list_delivered(&conn, Some(&auth.id)).await?;
    let total_earnings_cents: i64 = delivered_orders.iter().map(|o| o.total_cents).sum();

    Ok(Json(RestaurantDashboard {
        success: true,
        total_menu_items: menu.len(),
        menu,
        total_running_orders: running_orders.len(),
        running_orders,
        order_requests,
        order_history,
        delivered_orders,
        total_earnings_cents,
        total_earnings: total_earnings_cents as f64 / 100.0,
    }))
}
