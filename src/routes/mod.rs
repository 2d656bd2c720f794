pub mod admin;
pub mod auth;
pub mod categories;
pub mod restaurant;
pub mod upload;
pub mod views;

use axum::{extract::DefaultBodyLimit, routing::get, Json, Router};
use libsql::Database;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::analytics::OrderAnalytics;
use crate::config::Config;
use crate::services::{EmailService, TokenService};
use crate::storage::StorageBackend;

/// Multipart bodies carry images and licence scans.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
    pub tokens: TokenService,
    pub analytics: OrderAnalytics,
    pub email: Option<EmailService>,
    pub storage: Arc<dyn StorageBackend>,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .merge(categories::routes())
        .merge(auth::routes());

    Router::new()
        .route("/health", get(health))
        .nest("/api", public_routes)
        .nest("/api/admin", admin::routes(state.clone()))
        .nest("/api/restaurant", restaurant::routes(state.clone()))
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
