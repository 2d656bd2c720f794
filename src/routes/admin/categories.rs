use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::Category;
use crate::routes::upload::{store_file, FormData};
use crate::routes::AppState;

#[derive(Serialize)]
pub struct CategoryResponse {
    pub category: Category,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", post(create_category))
        .route("/categories/{id}", delete(delete_category))
}

async fn create_category(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<CategoryResponse>)> {
    let form = FormData::from_multipart(multipart).await?;
    let name = form.require("name")?;

    let conn = state.db.connect().map_err(AppError::from)?;
    if Category::find_by_name(&conn, &name).await?.is_some() {
        return Err(AppError::BadRequest("Category already exists".to_string()));
    }

    let image = match form.file("image") {
        Some(file) => Some(store_file(&state, "categories", file).await?),
        None => None,
    };

    let category = Category::create(&conn, &name, image).await?;
    tracing::info!("Created category {} ({})", category.name, category.id);

    Ok((StatusCode::CREATED, Json(CategoryResponse { category })))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    let conn = state.db.connect().map_err(AppError::from)?;
    let category = Category::find_by_id(&conn, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    Category::delete(&conn, &id).await?;

    if let Some(image) = category.image.as_deref() {
        if let Err(e) = state.storage.delete(image).await {
            tracing::warn!("Failed to delete image for category {}: {}", id, e);
        }
    }

    Ok(Json(DeleteResponse {
        success: true,
        message: "Category deleted successfully".to_string(),
    }))
}
