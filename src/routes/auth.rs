use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::routes::AppState;
use crate::services::{verify_password, TokenKind};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let conn = state.db.connect().map_err(AppError::from)?;

    let email = payload.email.trim().to_lowercase();
    let user = User::find_by_email(&conn, &email)
        .await?
        .filter(|u| verify_password(&payload.password, &u.password_hash))
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    let token = state.tokens.issue(&user.id, TokenKind::User)?;
    tracing::info!("User {} logged in", user.id);

    Ok(Json(LoginResponse { token, user }))
}
