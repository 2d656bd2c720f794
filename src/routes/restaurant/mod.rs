pub mod analytics;
pub mod auth;
pub mod dashboard;
pub mod feedback;
pub mod orders;
pub mod products;
pub mod profile;

use axum::{middleware, Router};

use crate::middleware::require_restaurant;
use crate::routes::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .merge(profile::routes())
        .merge(products::routes())
        .merge(orders::routes())
        .merge(dashboard::routes())
        .merge(analytics::routes())
        .merge(feedback::routes())
        .route_layer(middleware::from_fn_with_state(state, require_restaurant));

    Router::new().merge(auth::routes()).merge(protected)
}
