use axum::{extract::State, routing::get, Json, Router};

use crate::error::{AppError, AppResult};
use crate::models::Category;
use crate::routes::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/categories", get(list_categories))
}

async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    let conn = state.db.connect().map_err(AppError::from)?;
    let categories = Category::list_all(&conn).await?;
    Ok(Json(categories))
}
