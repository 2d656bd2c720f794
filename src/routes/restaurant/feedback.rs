use axum::{
    extract::{Extension, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthRestaurant;
use crate::models::{Notification, Review};
use crate::routes::AppState;

#[derive(Serialize)]
pub struct ReviewsResponse {
    pub success: bool,
    pub reviews: Vec<Review>,
    pub average_rating: f64,
    pub review_count: i64,
}

#[derive(Serialize)]
pub struct NotificationsResponse {
    pub success: bool,
    pub notifications: Vec<Notification>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reviews", get(list_reviews))
        .route("/notifications", get(list_notifications))
}

async fn list_reviews(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthRestaurant>,
) -> AppResult<Json<ReviewsResponse>> {
    let conn = state.db.connect().map_err(AppError::from)?;
    let reviews = Review::list_by_restaurant(&conn, &auth.id).await?;
    let summary = Review::summary_for(&conn, &auth.id).await?;

    Ok(Json(ReviewsResponse {
        success: true,
        reviews,
        average_rating: summary.average,
        review_count: summary.count,
    }))
}

async fn list_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthRestaurant>,
) -> AppResult<Json<NotificationsResponse>> {
    let conn = state.db.connect().map_err(AppError::from)?;
    let notifications = Notification::list_by_restaurant(&conn, &auth.id).await?;
    Ok(Json(NotificationsResponse { success: true, notifications }))
}
