use axum::{
    extract::{Extension, Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{Role, User};
use crate::routes::AppState;

#[derive(Deserialize)]
pub struct ApprovalRequest {
    pub is_approve: bool,
}

#[derive(Serialize)]
pub struct CustomerListResponse {
    pub success: bool,
    pub customers: Vec<User>,
}

#[derive(Serialize)]
pub struct RiderListResponse {
    pub success: bool,
    pub riders: Vec<User>,
}

#[derive(Serialize)]
pub struct RiderResponse {
    pub success: bool,
    pub rider: User,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers))
        .route("/riders", get(list_approved_riders))
        .route("/riders/pending", get(list_pending_riders))
        .route("/riders/{id}", get(get_rider))
        .route("/riders/{id}/approval", put(set_rider_approval))
}

async fn list_customers(State(state): State<AppState>) -> AppResult<Json<CustomerListResponse>> {
    let conn = state.db.connect().map_err(AppError::from)?;
    let customers = User::list_customers_with_orders(&conn).await?;
    Ok(Json(CustomerListResponse { success: true, customers }))
}

async fn list_riders(state: &AppState, approved: bool) -> AppResult<Json<RiderListResponse>> {
    let conn = state.db.connect().map_err(AppError::from)?;
    let riders = User::list_by_role(&conn, Role::Rider, approved).await?;
    Ok(Json(RiderListResponse { success: true, riders }))
}

async fn list_approved_riders(State(state): State<AppState>) -> AppResult<Json<RiderListResponse>> {
    list_riders(&state, true).await
}

async fn list_pending_riders(State(state): State<AppState>) -> AppResult<Json<RiderListResponse>> {
    list_riders(&state, false).await
}

async fn find_rider(conn: &libsql::Connection, id: &str) -> AppResult<User> {
    User::find_by_id(conn, id)
        .await?
        .filter(|u| u.get_role() == Some(Role::Rider))
        .ok_or_else(|| AppError::NotFound("Rider not found".to_string()))
}

async fn get_rider(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<RiderResponse>> {
    let conn = state.db.connect().map_err(AppError::from)?;
    let rider = find_rider(&conn, &id).await?;
    Ok(Json(RiderResponse { success: true, rider }))
}

async fn set_rider_approval(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<ApprovalRequest>,
) -> AppResult<Json<RiderResponse>> {
    let conn = state.db.connect().map_err(AppError::from)?;
    find_rider(&conn, &id).await?;

    let rider = User::set_approved(&conn, &id, payload.is_approve).await?;
    tracing::info!(
        "Admin {} ({}) set rider {} approval to {}",
        admin.id,
        admin.email,
        id,
        payload.is_approve
    );

    Ok(Json(RiderResponse { success: true, rider }))
}
