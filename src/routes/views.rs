use libsql::Connection;
use serde::Serialize;

use crate::error::AppResult;
use crate::models::{Order, Product, Restaurant, User};

#[derive(Serialize)]
pub struct OrderUserInfo {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Serialize)]
pub struct OrderRestaurantInfo {
    pub id: String,
    pub name: Option<String>,
    pub city: Option<String>,
    pub image: Option<String>,
}

#[derive(Serialize)]
pub struct OrderItemInfo {
    pub product_id: String,
    pub item_name: Option<String>,
    pub quantity: i64,
    pub price_cents: i64,
}

/// An order with the people and dishes it refers to resolved.
#[derive(Serialize)]
pub struct OrderView {
    pub id: String,
    pub order_status: String,
    pub payment_status: String,
    pub payment_method: String,
    pub total_cents: i64,
    pub total: f64,
    pub delivery_address: Option<String>,
    pub user: Option<OrderUserInfo>,
    pub restaurant: Option<OrderRestaurantInfo>,
    pub items: Vec<OrderItemInfo>,
    pub paid_ts: Option<i64>,
    pub delivered_ts: Option<i64>,
    pub created_ts: i64,
    pub updated_ts: i64,
}

impl OrderView {
    pub async fn build(conn: &Connection, order: Order) -> AppResult<Self> {
        let user = match order.user_id.as_deref() {
            Some(user_id) => User::find_by_id(conn, user_id).await?.map(|u| OrderUserInfo {
                id: u.id,
                name: u.name,
                email: u.email,
                phone: u.phone,
            }),
            None => None,
        };

        let restaurant = Restaurant::find_by_id(conn, &order.restaurant_id)
            .await?
            .map(|r| OrderRestaurantInfo {
                id: r.id,
                name: r.name,
                city: r.city,
                image: r.image,
            });

        let mut items = Vec::new();
        for item in Order::get_items(conn, &order.id).await? {
            let item_name = Product::find_by_id(conn, &item.product_id)
                .await?
                .map(|p| p.item_name);
            items.push(OrderItemInfo {
                product_id: item.product_id,
                item_name,
                quantity: item.quantity,
                price_cents: item.price_cents,
            });
        }

        Ok(Self {
            id: order.id,
            order_status: order.order_status,
            payment_status: order.payment_status,
            payment_method: order.payment_method,
            total_cents: order.total_cents,
            total: order.total_cents as f64 / 100.0,
            delivery_address: order.delivery_address,
            user,
            restaurant,
            items,
            paid_ts: order.paid_ts,
            delivered_ts: order.delivered_ts,
            created_ts: order.created_ts,
            updated_ts: order.updated_ts,
        })
    }

    pub async fn build_all(conn: &Connection, orders: Vec<Order>) -> AppResult<Vec<Self>> {
        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            views.push(Self::build(conn, order).await?);
        }
        Ok(views)
    }
}
