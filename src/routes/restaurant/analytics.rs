use axum::{
    extract::{Extension, State},
    routing::get,
    Json, Router,
};
use chrono::{Datelike, Utc};
use serde::Serialize;

use crate::analytics::{current_week, trailing_days, trailing_hours, year_window, BucketSeries, MonthComparison};
use crate::error::{AppError, AppResult};
use crate::middleware::AuthRestaurant;
use crate::models::Order;
use crate::routes::AppState;

const MONTHLY_DAYS: i64 = 30;
const HOURLY_HOURS: i64 = 24;

#[derive(Serialize)]
pub struct YearComparisonResponse {
    pub message: String,
    pub current_year: i32,
    pub previous_year: i32,
    pub graph_data: Vec<MonthComparison>,
}

#[derive(Serialize)]
pub struct OrderVolumeResponse {
    pub success: bool,
    pub timezone: String,
    pub weekly_order_data: BucketSeries,
    pub monthly_order_data: BucketSeries,
    pub hourly_order_data: BucketSeries,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analytics/years", get(year_comparison))
        .route("/analytics/orders", get(order_volume))
}

async fn year_comparison(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthRestaurant>,
) -> AppResult<Json<YearComparisonResponse>> {
    let tz = state.analytics.timezone();
    let current_year = Utc::now().with_timezone(&tz).year();
    let previous_year = current_year - 1;

    let conn = state.db.connect().map_err(AppError::from)?;
    let current = Order::list_delivered_in(&conn, Some(&auth.id), &year_window(current_year, tz)?).await?;
    let previous = Order::list_delivered_in(&conn, Some(&auth.id), &year_window(previous_year, tz)?).await?;

    let graph_data = state
        .analytics
        .year_over_year_revenue(&current, &previous, current_year, previous_year)?;

    Ok(Json(YearComparisonResponse {
        message: format!("Monthly revenue for {} and {}", current_year, previous_year),
        current_year,
        previous_year,
        graph_data,
    }))
}

async fn order_volume(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthRestaurant>,
) -> AppResult<Json<OrderVolumeResponse>> {
    let analytics = state.analytics;
    let now = Utc::now();

    let week = current_week(now, analytics.timezone())?;
    let month = trailing_days(now, MONTHLY_DAYS)?;
    let day = trailing_hours(now, HOURLY_HOURS)?;

    let conn = state.db.connect().map_err(AppError::from)?;
    let weekly = Order::list_delivered_in(&conn, Some(&auth.id), &week).await?;
    let monthly = Order::list_delivered_in(&conn, Some(&auth.id), &month).await?;
    let hourly = Order::list_delivered_in(&conn, Some(&auth.id), &day).await?;

    Ok(Json(OrderVolumeResponse {
        success: true,
        timezone: analytics.timezone().name().to_string(),
        weekly_order_data: analytics.bucket_by_day_of_week(&weekly, week)?,
        monthly_order_data: analytics.bucket_by_day_of_month(&monthly, month)?,
        hourly_order_data: analytics.bucket_by_hour_of_day(&hourly, day)?,
    }))
}
