use axum::{
    extract::{Extension, Multipart, State},
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthRestaurant;
use crate::models::{OperatingHours, OwnerDetails, Restaurant, RestaurantChanges, RestaurantProfile};
use crate::routes::upload::{store_file, FormData};
use crate::routes::AppState;

#[derive(Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub restaurant: RestaurantProfile,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/owner", put(update_owner))
        .route("/legal-copy", put(update_legal_copy))
}

fn respond(restaurant: Restaurant) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        success: true,
        restaurant: restaurant.into(),
    })
}

async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthRestaurant>,
) -> AppResult<Json<ProfileResponse>> {
    let conn = state.db.connect().map_err(AppError::from)?;
    let restaurant = Restaurant::find_by_id(&conn, &auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Restaurant not found".to_string()))?;
    Ok(respond(restaurant))
}

async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthRestaurant>,
    multipart: Multipart,
) -> AppResult<Json<ProfileResponse>> {
    let form = FormData::from_multipart(multipart).await?;

    let mut changes = RestaurantChanges {
        name: form.text("name"),
        phone: form.text("phone"),
        city: form.text("city"),
        address: form.text("address"),
        no_of_employees: form.number("no_of_employees")?,
        cuisine_type: form.text("cuisine_type"),
        operating_hours: form.json::<Vec<OperatingHours>>("operating_hours")?,
        image: None,
    };
    if let Some(file) = form.file("image") {
        changes.image = Some(store_file(&state, "restaurants", file).await?);
    }

    let conn = state.db.connect().map_err(AppError::from)?;
    let restaurant = Restaurant::update_details(&conn, &auth.id, changes).await?;
    tracing::info!(
        "Restaurant {} profile updated (complete: {})",
        restaurant.id,
        restaurant.is_profile_completed
    );

    Ok(respond(restaurant))
}

async fn update_owner(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthRestaurant>,
    multipart: Multipart,
) -> AppResult<Json<ProfileResponse>> {
    let form = FormData::from_multipart(multipart).await?;

    let mut owner = OwnerDetails {
        name: form.require("name")?,
        email: form.require("email")?,
        phone: form.require("phone")?,
        image: None,
        gender: form.require("gender")?,
        dob: form.require("dob")?,
        nationality: form.require("nationality")?,
    };

    let conn = state.db.connect().map_err(AppError::from)?;
    owner.image = match form.file("image") {
        Some(file) => Some(store_file(&state, "owners", file).await?),
        None => Restaurant::find_by_id(&conn, &auth.id)
            .await?
            .and_then(|r| r.get_owner_details())
            .and_then(|previous| previous.image),
    };

    let restaurant = Restaurant::set_owner_details(&conn, &auth.id, &owner).await?;
    Ok(respond(restaurant))
}

async fn update_legal_copy(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthRestaurant>,
    multipart: Multipart,
) -> AppResult<Json<ProfileResponse>> {
    let form = FormData::from_multipart(multipart).await?;
    let file = form
        .file("legal_copy")
        .ok_or_else(|| AppError::BadRequest("legal_copy file is required".to_string()))?;

    let url = store_file(&state, "legal", file).await?;

    let conn = state.db.connect().map_err(AppError::from)?;
    let restaurant = Restaurant::set_legal_copy(&conn, &auth.id, &url).await?;
    Ok(respond(restaurant))
}
