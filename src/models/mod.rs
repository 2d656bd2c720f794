pub mod category;
pub mod notification;
pub mod order;
pub mod product;
pub mod restaurant;
pub mod review;
pub mod user;

pub use category::Category;
pub use notification::Notification;
pub use order::{CreateOrder, CreateOrderItem, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus};
pub use product::{NewProduct, Product, ProductChanges, ProductExtra, ProductSize};
pub use restaurant::{OperatingHours, OwnerDetails, Restaurant, RestaurantChanges, RestaurantProfile};
pub use review::{RatingSummary, Review};
pub use user::{CreateUser, Role, User};

/// Current time as unix seconds, the unit every `*_ts` column uses.
pub fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}
