#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono_tz::Tz;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use food_delivery_api::analytics::OrderAnalytics;
use food_delivery_api::config::Config;
use food_delivery_api::db;
use food_delivery_api::models::{
    CreateOrder, CreateOrderItem, CreateUser, NewProduct, Order, OrderStatus, PaymentMethod, Product, Restaurant,
    Role, User,
};
use food_delivery_api::routes::{create_router, AppState};
use food_delivery_api::services::{hash_password, TokenKind, TokenService};
use food_delivery_api::storage::LocalStorage;

pub const BOUNDARY: &str = "X-FOOD-DELIVERY-BOUNDARY";
pub const PASSWORD: &str = "correct-horse";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    root: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_in(Tz::UTC).await
}

/// App whose analytics read calendar fields in `timezone`.
pub async fn spawn_app_in(timezone: Tz) -> TestApp {
    let root = std::env::temp_dir().join(format!("food-delivery-test-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&root).unwrap();
    let db_path = root.join("test.db");
    let upload_dir = root.join("uploads");

    let config = Config {
        database_url: db_path.to_string_lossy().to_string(),
        turso_auth_token: None,
        jwt_secret: "test-secret".to_string(),
        jwt_ttl_hours: 1,
        otp_ttl_minutes: 10,
        analytics_timezone: timezone,
        smtp: None,
        from_email: "no-reply@example.com".to_string(),
        storage_type: "local".to_string(),
        upload_dir: upload_dir.to_string_lossy().to_string(),
        r2: None,
        admin_email: None,
        admin_password: None,
        base_url: "http://localhost:4000".to_string(),
        port: 0,
    };

    let database = db::create_database(&config.database_url, None).await.unwrap();
    db::migrate(&database.connect().unwrap()).await.unwrap();

    let storage = LocalStorage::new(&config.upload_dir, &config.base_url);
    storage.ensure_dir().await.unwrap();

    let state = AppState {
        db: Arc::new(database),
        tokens: TokenService::new(&config.jwt_secret, config.jwt_ttl_hours),
        analytics: OrderAnalytics::new(config.analytics_timezone),
        email: None,
        storage: Arc::new(storage),
        config,
    };

    TestApp {
        router: create_router(state.clone()),
        state,
        root,
    }
}

impl TestApp {
    pub fn conn(&self) -> libsql::Connection {
        self.state.db.connect().unwrap()
    }

    /// Local disk location of a URL returned by an upload.
    pub fn stored_path(&self, url: &str) -> PathBuf {
        let prefix = format!("{}/uploads/", self.state.config.base_url);
        PathBuf::from(&self.state.config.upload_dir).join(url.strip_prefix(&prefix).unwrap())
    }

    /// Names of the files currently stored under `folder`.
    pub fn stored_files(&self, folder: &str) -> Vec<String> {
        match std::fs::read_dir(PathBuf::from(&self.state.config.upload_dir).join(folder)) {
            Ok(entries) => entries
                .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request("GET", uri, token).body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request("DELETE", uri, token).body(Body::empty()).unwrap()).await
    }

    pub async fn json(&self, method: &str, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(
            request(method, uri, token)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Sends a multipart form; `file` is `(field, filename, bytes)`.
    pub async fn multipart(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &[u8])>,
    ) -> (StatusCode, Value) {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }
        if let Some((name, filename, data)) = file {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    BOUNDARY, name, filename
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        self.send(
            request(method, uri, token)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    pub async fn seed_user(&self, email: &str, role: Role) -> (User, String) {
        let user = User::create(
            &self.conn(),
            CreateUser {
                name: Some(email.split('@').next().unwrap_or("user").to_string()),
                email: email.to_string(),
                password_hash: hash_password(PASSWORD).unwrap(),
                role,
                phone: None,
                is_approved: role != Role::Rider,
            },
        )
        .await
        .unwrap();
        let token = self.state.tokens.issue(&user.id, TokenKind::User).unwrap();
        (user, token)
    }

    pub async fn seed_admin(&self) -> String {
        self.seed_user("admin@example.com", Role::Admin).await.1
    }

    pub async fn seed_restaurant(&self, email: &str) -> (Restaurant, String) {
        let restaurant = Restaurant::create(&self.conn(), email, &hash_password(PASSWORD).unwrap())
            .await
            .unwrap();
        let token = self.state.tokens.issue(&restaurant.id, TokenKind::Restaurant).unwrap();
        (restaurant, token)
    }

    pub async fn seed_product(&self, restaurant_id: &str, item_name: &str, price_cents: i64) -> Product {
        Product::create(
            &self.conn(),
            NewProduct {
                restaurant_id: restaurant_id.to_string(),
                category_id: None,
                item_name: item_name.to_string(),
                description: None,
                base_price_cents: price_cents,
                discount_price_cents: None,
                image: None,
                ingredients: Vec::new(),
                sizes: Vec::new(),
                extras: Vec::new(),
                special_instructions: None,
                is_available: true,
            },
        )
        .await
        .unwrap()
    }

    /// Places an order for `quantity` of `product` and returns it unprocessed.
    pub async fn seed_order(&self, user_id: Option<&str>, product: &Product, quantity: i64) -> Order {
        Order::create(
            &self.conn(),
            CreateOrder {
                user_id: user_id.map(|u| u.to_string()),
                restaurant_id: product.restaurant_id.clone(),
                delivery_address: Some("1 Main St".to_string()),
                payment_method: PaymentMethod::Card,
                items: vec![CreateOrderItem {
                    product_id: product.id.clone(),
                    quantity,
                    price_cents: product.base_price_cents,
                }],
            },
        )
        .await
        .unwrap()
    }

    /// Places an order and marks it delivered at `delivered_ts`.
    pub async fn seed_delivered(&self, product: &Product, quantity: i64, delivered_ts: i64) -> Order {
        let mut order = self.seed_order(None, product, quantity).await;
        order
            .apply_update(Some(OrderStatus::Delivered), None, delivered_ts)
            .unwrap();
        order.save_lifecycle(&self.conn()).await.unwrap();
        order
    }
}

fn request(method: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {}", token)),
        None => builder,
    }
}
