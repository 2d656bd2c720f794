use axum::{
    extract::{Extension, Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{Notification, Restaurant, RestaurantProfile};
use crate::routes::AppState;

#[derive(Deserialize)]
pub struct ApprovalRequest {
    pub is_approve: bool,
}

#[derive(Serialize)]
pub struct RestaurantListResponse {
    pub success: bool,
    pub restaurants: Vec<RestaurantProfile>,
}

#[derive(Serialize)]
pub struct RestaurantResponse {
    pub success: bool,
    pub restaurant: RestaurantProfile,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/restaurants", get(list_approved))
        .route("/restaurants/pending", get(list_pending))
        .route("/restaurants/{id}", get(get_restaurant))
        .route("/restaurants/{id}/approval", put(set_approval))
}

async fn list_by_approval(state: &AppState, approved: bool) -> AppResult<Json<RestaurantListResponse>> {
    let conn = state.db.connect().map_err(AppError::from)?;
    let restaurants = Restaurant::list_by_approval(&conn, approved).await?;

    Ok(Json(RestaurantListResponse {
        success: true,
        restaurants: restaurants.into_iter().map(RestaurantProfile::from).collect(),
    }))
}

async fn list_approved(State(state): State<AppState>) -> AppResult<Json<RestaurantListResponse>> {
    list_by_approval(&state, true).await
}

async fn list_pending(State(state): State<AppState>) -> AppResult<Json<RestaurantListResponse>> {
    list_by_approval(&state, false).await
}

async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<RestaurantResponse>> {
    let conn = state.db.connect().map_err(AppError::from)?;
    let restaurant = Restaurant::find_by_id(&conn, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Restaurant not found".to_string()))?;

    Ok(Json(RestaurantResponse {
        success: true,
        restaurant: restaurant.into(),
    }))
}

async fn set_approval(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<ApprovalRequest>,
) -> AppResult<Json<RestaurantResponse>> {
    let conn = state.db.connect().map_err(AppError::from)?;
    Restaurant::find_by_id(&conn, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Restaurant not found".to_string()))?;

    let restaurant = Restaurant::set_approved(&conn, &id, payload.is_approve).await?;

    let (title, message) = if payload.is_approve {
        ("Restaurant approved", "Your restaurant is approved and visible to customers.")
    } else {
        ("Approval revoked", "Your restaurant is no longer approved. Contact support for details.")
    };
    Notification::create(&conn, &id, title, message).await?;

    tracing::info!(
        "Admin {} ({}) set restaurant {} approval to {}",
        admin.id,
        admin.email,
        id,
        payload.is_approve
    );

    Ok(Json(RestaurantResponse {
        success: true,
        restaurant: restaurant.into(),
    }))
}
