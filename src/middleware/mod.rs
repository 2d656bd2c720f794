pub mod auth;

pub use auth::{require_admin, require_restaurant, AuthRestaurant, AuthUser};
