pub mod categories;
pub mod dashboard;
pub mod orders;
pub mod restaurants;
pub mod users;

use axum::{middleware, Router};

use crate::middleware::require_admin;
use crate::routes::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(categories::routes())
        .merge(dashboard::routes())
        .merge(orders::routes())
        .merge(restaurants::routes())
        .merge(users::routes())
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}
