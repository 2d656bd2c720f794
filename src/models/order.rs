use chrono::{DateTime, Utc};
use libsql::{params::Params, Connection, Value};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::now_ts;
use crate::analytics::{DeliveredOrder, Window};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Processing,
    Preparing,
    #[serde(rename = "Picked up")]
    PickedUp,
    #[serde(rename = "On its way")]
    OnItsWay,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Accepted by the restaurant and not yet delivered.
    pub const RUNNING: [OrderStatus; 3] = [OrderStatus::Preparing, OrderStatus::PickedUp, OrderStatus::OnItsWay];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "Processing",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::PickedUp => "Picked up",
            OrderStatus::OnItsWay => "On its way",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Processing" => Some(OrderStatus::Processing),
            "Preparing" => Some(OrderStatus::Preparing),
            "Picked up" => Some(OrderStatus::PickedUp),
            "On its way" => Some(OrderStatus::OnItsWay),
            "Delivered" => Some(OrderStatus::Delivered),
            "Cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "paid" => Some(PaymentStatus::Paid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cod,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::Card => "card",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: Option<String>,
    pub restaurant_id: String,
    pub order_status: String,
    pub total_cents: i64,
    pub payment_status: String,
    pub payment_method: String,
    pub delivery_address: Option<String>,
    pub paid_ts: Option<i64>,
    pub delivered_ts: Option<i64>,
    pub created_ts: i64,
    pub updated_ts: i64,
}

impl Order {
    fn from_row(row: &libsql::Row) -> Result<Self, libsql::Error> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            restaurant_id: row.get(2)?,
            order_status: row.get(3)?,
            total_cents: row.get(4)?,
            payment_status: row.get(5)?,
            payment_method: row.get(6)?,
            delivery_address: row.get(7)?,
            paid_ts: row.get(8)?,
            delivered_ts: row.get(9)?,
            created_ts: row.get(10)?,
            updated_ts: row.get(11)?,
        })
    }
}

impl DeliveredOrder for Order {
    fn order_id(&self) -> &str {
        &self.id
    }

    fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_ts.and_then(|ts| DateTime::from_timestamp(ts, 0))
    }

    fn total_cents(&self) -> i64 {
        self.total_cents
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub price_cents: i64,
}

impl OrderItem {
    fn from_row(row: &libsql::Row) -> Result<Self, libsql::Error> {
        Ok(Self {
            id: row.get(0)?,
            order_id: row.get(1)?,
            product_id: row.get(2)?,
            quantity: row.get(3)?,
            price_cents: row.get(4)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderItem {
    pub product_id: String,
    pub quantity: i64,
    pub price_cents: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrder {
    pub user_id: Option<String>,
    pub restaurant_id: String,
    pub delivery_address: Option<String>,
    pub payment_method: PaymentMethod,
    pub items: Vec<CreateOrderItem>,
}

/// Smallest whole second that is not before `at`, so integer `*_ts` columns
/// compare the same way the half-open window does.
fn ceil_secs(at: DateTime<Utc>) -> i64 {
    if at.timestamp_subsec_nanos() > 0 {
        at.timestamp() + 1
    } else {
        at.timestamp()
    }
}

impl Order {
    pub fn get_status(&self) -> Option<OrderStatus> {
        OrderStatus::from_str(&self.order_status)
    }

    pub fn get_payment_status(&self) -> Option<PaymentStatus> {
        PaymentStatus::from_str(&self.payment_status)
    }

    /// Applies a restaurant's status/payment change at `now`.
    ///
    /// Delivered orders are frozen. Delivering an order stamps delivery and
    /// payment times and settles it as paid cash-on-delivery.
    pub fn apply_update(
        &mut self,
        status: Option<OrderStatus>,
        payment: Option<PaymentStatus>,
        now: i64,
    ) -> AppResult<()> {
        if self.get_status() == Some(OrderStatus::Delivered) {
            return Err(AppError::BadRequest("Order already delivered".to_string()));
        }

        if let Some(status) = status {
            self.order_status = status.as_str().to_string();
        }
        if let Some(payment) = payment {
            self.payment_status = payment.as_str().to_string();
        }

        if status == Some(OrderStatus::Delivered) {
            self.delivered_ts = Some(now);
            self.paid_ts = Some(now);
            self.payment_status = PaymentStatus::Paid.as_str().to_string();
            self.payment_method = PaymentMethod::Cod.as_str().to_string();
        }
        if payment == Some(PaymentStatus::Paid) {
            self.paid_ts = Some(now);
        }

        self.updated_ts = now;
        Ok(())
    }

    pub async fn save_lifecycle(&self, conn: &Connection) -> AppResult<()> {
        conn.execute(
            r#"
            UPDATE orders SET
                order_status = ?,
                payment_status = ?,
                payment_method = ?,
                paid_ts = ?,
                delivered_ts = ?,
                updated_ts = ?
            WHERE id = ?
            "#,
            libsql::params![
                self.order_status.clone(),
                self.payment_status.clone(),
                self.payment_method.clone(),
                self.paid_ts,
                self.delivered_ts,
                self.updated_ts,
                self.id.clone()
            ],
        )
        .await
        .map_err(AppError::from)?;
        Ok(())
    }

    pub async fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<Self>> {
        let mut rows = conn
            .query("SELECT * FROM orders WHERE id = ?", [id])
            .await
            .map_err(AppError::from)?;

        match rows.next().await.map_err(AppError::from)? {
            Some(row) => Ok(Some(Self::from_row(&row).map_err(AppError::from)?)),
            None => Ok(None),
        }
    }

    async fn collect(conn: &Connection, sql: &str, params: Params) -> AppResult<Vec<Self>> {
        let mut rows = conn.query(sql, params).await.map_err(AppError::from)?;

        let mut orders = Vec::new();
        while let Some(row) = rows.next().await.map_err(AppError::from)? {
            orders.push(Self::from_row(&row).map_err(AppError::from)?);
        }
        Ok(orders)
    }

    pub async fn list_all(conn: &Connection) -> AppResult<Vec<Self>> {
        Self::collect(conn, "SELECT * FROM orders ORDER BY created_ts DESC", Params::None).await
    }

    pub async fn list_recent(conn: &Connection, limit: i64) -> AppResult<Vec<Self>> {
        Self::collect(
            conn,
            "SELECT * FROM orders ORDER BY created_ts DESC, rowid DESC LIMIT ?",
            Params::Positional(vec![Value::Integer(limit)]),
        )
        .await
    }

    pub async fn list_by_restaurant(conn: &Connection, restaurant_id: &str) -> AppResult<Vec<Self>> {
        Self::collect(
            conn,
            "SELECT * FROM orders WHERE restaurant_id = ? ORDER BY created_ts DESC",
            Params::Positional(vec![Value::Text(restaurant_id.to_string())]),
        )
        .await
    }

    pub async fn list_by_statuses(
        conn: &Connection,
        restaurant_id: &str,
        statuses: &[OrderStatus],
    ) -> AppResult<Vec<Self>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; statuses.len()].join(", ");
        let sql = format!(
            "SELECT * FROM orders WHERE restaurant_id = ? AND order_status IN ({}) ORDER BY created_ts DESC",
            placeholders
        );

        let mut values = vec![Value::Text(restaurant_id.to_string())];
        values.extend(statuses.iter().map(|s| Value::Text(s.as_str().to_string())));

        Self::collect(conn, &sql, Params::Positional(values)).await
    }

    /// Every order of a restaurant, most recently delivered first.
    pub async fn history_by_restaurant(conn: &Connection, restaurant_id: &str) -> AppResult<Vec<Self>> {
        Self::collect(
            conn,
            "SELECT * FROM orders WHERE restaurant_id = ? ORDER BY delivered_ts DESC, created_ts DESC",
            Params::Positional(vec![Value::Text(restaurant_id.to_string())]),
        )
        .await
    }

    /// Delivered orders, optionally limited to one restaurant.
    pub async fn list_delivered(conn: &Connection, restaurant_id: Option<&str>) -> AppResult<Vec<Self>> {
        Self::collect(
            conn,
            "SELECT * FROM orders WHERE order_status = 'Delivered' AND (?1 IS NULL OR restaurant_id = ?1) ORDER BY delivered_ts DESC",
            Params::Positional(vec![restaurant_id.map(|r| r.to_string()).into()]),
        )
        .await
    }

    /// Delivered orders whose delivery falls inside `window`.
    pub async fn list_delivered_in(
        conn: &Connection,
        restaurant_id: Option<&str>,
        window: &Window,
    ) -> AppResult<Vec<Self>> {
        Self::collect(
            conn,
            r#"
            SELECT * FROM orders
            WHERE order_status = 'Delivered'
              AND (?1 IS NULL OR restaurant_id = ?1)
              AND delivered_ts >= ?2
              AND delivered_ts < ?3
            ORDER BY delivered_ts ASC
            "#,
            Params::Positional(vec![
                restaurant_id.map(|r| r.to_string()).into(),
                Value::Integer(ceil_secs(window.start())),
                Value::Integer(ceil_secs(window.end())),
            ]),
        )
        .await
    }

    pub async fn count_by_status(
        conn: &Connection,
        restaurant_id: &str,
        status: OrderStatus,
    ) -> AppResult<i64> {
        let mut rows = conn
            .query(
                "SELECT COUNT(*) FROM orders WHERE restaurant_id = ? AND order_status = ?",
                [restaurant_id, status.as_str()],
            )
            .await
            .map_err(AppError::from)?;

        match rows.next().await.map_err(AppError::from)? {
            Some(row) => Ok(row.get::<i64>(0).map_err(AppError::from)?),
            None => Ok(0),
        }
    }

    pub async fn count_all(conn: &Connection) -> AppResult<i64> {
        let mut rows = conn
            .query("SELECT COUNT(*) FROM orders", ())
            .await
            .map_err(AppError::from)?;

        match rows.next().await.map_err(AppError::from)? {
            Some(row) => Ok(row.get::<i64>(0).map_err(AppError::from)?),
            None => Ok(0),
        }
    }

    /// Sum of delivered order totals, optionally for one restaurant.
    pub async fn delivered_revenue(conn: &Connection, restaurant_id: Option<&str>) -> AppResult<i64> {
        let mut rows = conn
            .query(
                "SELECT COALESCE(SUM(total_cents), 0) FROM orders WHERE order_status = 'Delivered' AND (?1 IS NULL OR restaurant_id = ?1)",
                Params::Positional(vec![restaurant_id.map(|r| r.to_string()).into()]),
            )
            .await
            .map_err(AppError::from)?;

        match rows.next().await.map_err(AppError::from)? {
            Some(row) => Ok(row.get::<i64>(0).map_err(AppError::from)?),
            None => Ok(0),
        }
    }

    pub async fn create(conn: &Connection, data: CreateOrder) -> AppResult<Self> {
        let id = Uuid::new_v4().to_string();
        let now = now_ts();
        let total_cents: i64 = data.items.iter().map(|i| i.price_cents * i.quantity).sum();

        conn.execute(
            "INSERT INTO orders (id, user_id, restaurant_id, total_cents, payment_method, delivery_address, created_ts, updated_ts) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            libsql::params![
                id.clone(),
                data.user_id,
                data.restaurant_id,
                total_cents,
                data.payment_method.as_str().to_string(),
                data.delivery_address,
                now,
                now
            ],
        )
        .await
        .map_err(AppError::from)?;

        for item in data.items {
            let item_id = Uuid::new_v4().to_string();
            conn.execute(
                "INSERT INTO order_items (id, order_id, product_id, quantity, price_cents) VALUES (?, ?, ?, ?, ?)",
                libsql::params![item_id, id.clone(), item.product_id, item.quantity, item.price_cents],
            )
            .await
            .map_err(AppError::from)?;
        }

        Self::find_by_id(conn, &id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to create order".to_string()))
    }

    pub async fn get_items(conn: &Connection, order_id: &str) -> AppResult<Vec<OrderItem>> {
        let mut rows = conn
            .query("SELECT * FROM order_items WHERE order_id = ?", [order_id])
            .await
            .map_err(AppError::from)?;

        let mut items = Vec::new();
        while let Some(row) = rows.next().await.map_err(AppError::from)? {
            items.push(OrderItem::from_row(&row).map_err(AppError::from)?);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(status: OrderStatus) -> Order {
        Order {
            id: "o1".to_string(),
            user_id: None,
            restaurant_id: "r1".to_string(),
            order_status: status.as_str().to_string(),
            total_cents: 2400,
            payment_status: "pending".to_string(),
            payment_method: "card".to_string(),
            delivery_address: None,
            paid_ts: None,
            delivered_ts: None,
            created_ts: 0,
            updated_ts: 0,
        }
    }

    #[test]
    fn status_strings_round_trip_through_serde() {
        let json = serde_json::to_string(&OrderStatus::OnItsWay).unwrap();
        assert_eq!(json, "\"On its way\"");
        assert_eq!(OrderStatus::from_str("Picked up"), Some(OrderStatus::PickedUp));
        assert_eq!(OrderStatus::from_str("delivered"), None);
    }

    #[test]
    fn delivering_settles_payment() {
        let mut o = order(OrderStatus::OnItsWay);
        o.apply_update(Some(OrderStatus::Delivered), None, 1_700_000_000).unwrap();

        assert_eq!(o.get_status(), Some(OrderStatus::Delivered));
        assert_eq!(o.delivered_ts, Some(1_700_000_000));
        assert_eq!(o.paid_ts, Some(1_700_000_000));
        assert_eq!(o.get_payment_status(), Some(PaymentStatus::Paid));
        assert_eq!(o.payment_method, "cod");
        assert_eq!(o.delivered_at(), DateTime::from_timestamp(1_700_000_000, 0));
    }

    #[test]
    fn delivered_orders_are_frozen() {
        let mut o = order(OrderStatus::Delivered);
        let err = o.apply_update(Some(OrderStatus::Cancelled), None, 10).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(o.get_status(), Some(OrderStatus::Delivered));
    }

    #[test]
    fn marking_paid_stamps_payment_time_only() {
        let mut o = order(OrderStatus::Preparing);
        o.apply_update(None, Some(PaymentStatus::Paid), 42).unwrap();

        assert_eq!(o.paid_ts, Some(42));
        assert_eq!(o.delivered_ts, None);
        assert_eq!(o.get_status(), Some(OrderStatus::Preparing));
        assert_eq!(o.payment_method, "card");
    }

    #[test]
    fn window_bounds_round_up_to_whole_seconds() {
        let exact = DateTime::from_timestamp(100, 0).unwrap();
        let fractional = DateTime::from_timestamp(100, 500_000_000).unwrap();
        assert_eq!(ceil_secs(exact), 100);
        assert_eq!(ceil_secs(fractional), 101);
    }
}
