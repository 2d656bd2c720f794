use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::{year_window, BucketSeries};
use crate::error::{AppError, AppResult};
use crate::models::{Category, Order, Product, Restaurant, Role, User};
use crate::routes::views::OrderView;
use crate::routes::AppState;

const RECENT_ORDERS: i64 = 10;

#[derive(Deserialize)]
pub struct DashboardQuery {
    pub year: Option<i32>,
}

#[derive(Serialize)]
pub struct DashboardStats {
    pub total_orders: i64,
    pub total_restaurants: i64,
    pub total_categories: i64,
    pub total_products: i64,
    pub total_riders: i64,
    pub total_revenue_cents: i64,
    pub total_revenue: f64,
    pub recent_orders: Vec<OrderView>,
    pub year: i32,
    pub monthly_revenue: BucketSeries,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<DashboardStats>> {
    let tz = state.analytics.timezone();
    let year = query
        .year
        .unwrap_or_else(|| Utc::now().with_timezone(&tz).year());

    let conn = state.db.connect().map_err(AppError::from)?;

    let total_revenue_cents = Order::delivered_revenue(&conn, None).await?;
    let recent = Order::list_recent(&conn, RECENT_ORDERS).await?;

    let delivered = Order::list_delivered_in(&conn, None, &year_window(year, tz)?).await?;
    let monthly_revenue = state.analytics.bucket_by_month_for_year(&delivered, year)?;

    Ok(Json(DashboardStats {
        total_orders: Order::count_all(&conn).await?,
        total_restaurants: Restaurant::count_all(&conn).await?,
        total_categories: Category::count_all(&conn).await?,
        total_products: Product::count_all(&conn).await?,
        total_riders: User::count_by_role(&conn, Role::Rider).await?,
        total_revenue_cents,
        total_revenue: total_revenue_cents as f64 / 100.0,
        recent_orders: OrderView::build_all(&conn, recent).await?,
        year,
        monthly_revenue,
    }))
}
