use axum::{
    body::Body,
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::{AppError, AppResult};
use crate::models::{Restaurant, Role, User};
use crate::routes::AppState;
use crate::services::TokenKind;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct AuthRestaurant {
    pub id: String,
}

fn bearer_token(req: &Request<Body>) -> AppResult<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))
}

async fn authenticate_admin(state: &AppState, token: &str) -> AppResult<AuthUser> {
    let claims = state.tokens.verify(token)?;
    if claims.kind != TokenKind::User {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    let conn = state.db.connect().map_err(AppError::from)?;
    let user = User::find_by_id(&conn, &claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    match user.get_role() {
        Some(Role::Admin) => Ok(AuthUser {
            id: user.id,
            email: user.email,
        }),
        _ => Err(AppError::Forbidden("Admin access required".to_string())),
    }
}

async fn authenticate_restaurant(state: &AppState, token: &str) -> AppResult<AuthRestaurant> {
    let claims = state.tokens.verify(token)?;
    if claims.kind != TokenKind::Restaurant {
        return Err(AppError::Unauthorized("Restaurant access required".to_string()));
    }

    let conn = state.db.connect().map_err(AppError::from)?;
    let restaurant = Restaurant::find_by_id(&conn, &claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Restaurant not found".to_string()))?;

    Ok(AuthRestaurant { id: restaurant.id })
}

pub async fn require_admin(State(state): State<AppState>, mut req: Request<Body>, next: Next) -> Response {
    let token = match bearer_token(&req) {
        Ok(token) => token.to_string(),
        Err(e) => return e.into_response(),
    };

    match authenticate_admin(&state, &token).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

pub async fn require_restaurant(State(state): State<AppState>, mut req: Request<Body>, next: Next) -> Response {
    let token = match bearer_token(&req) {
        Ok(token) => token.to_string(),
        Err(e) => return e.into_response(),
    };

    match authenticate_restaurant(&state, &token).await {
        Ok(restaurant) => {
            req.extensions_mut().insert(restaurant);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}
