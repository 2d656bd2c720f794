use axum::{
    extract::{Extension, Multipart, Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthRestaurant;
use crate::models::{Category, NewProduct, Product, ProductChanges, ProductExtra, ProductSize};
use crate::routes::upload::{discard_file, store_file, FormData};
use crate::routes::AppState;

#[derive(Serialize)]
pub struct ProductResponse {
    pub success: bool,
    pub product: Product,
}

#[derive(Serialize)]
pub struct MenuResponse {
    pub success: bool,
    pub products: Vec<Product>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", put(update_product))
}

async fn resolve_category(conn: &libsql::Connection, form: &FormData) -> AppResult<Option<String>> {
    match form.text("category_id") {
        Some(id) => Category::find_by_id(conn, &id)
            .await?
            .map(|c| Some(c.id))
            .ok_or_else(|| AppError::BadRequest("Unknown category".to_string())),
        None => Ok(None),
    }
}

async fn list_products(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthRestaurant>,
) -> AppResult<Json<MenuResponse>> {
    let conn = state.db.connect().map_err(AppError::from)?;
    let products = Product::list_by_restaurant(&conn, &auth.id).await?;
    Ok(Json(MenuResponse { success: true, products }))
}

async fn create_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthRestaurant>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ProductResponse>)> {
    let form = FormData::from_multipart(multipart).await?;
    let item_name = form.require("item_name")?;
    let base_price_cents = form
        .cents("base_price")?
        .ok_or_else(|| AppError::BadRequest("base_price is required".to_string()))?;

    let conn = state.db.connect().map_err(AppError::from)?;
    if Product::find_by_item_name(&conn, &auth.id, &item_name).await?.is_some() {
        return Err(AppError::BadRequest("Product already exists".to_string()));
    }
    let category_id = resolve_category(&conn, &form).await?;

    let new_product = NewProduct {
        restaurant_id: auth.id.clone(),
        category_id,
        item_name,
        description: form.text("description"),
        base_price_cents,
        discount_price_cents: form.cents("discount_price")?,
        image: None,
        ingredients: form.list("ingredients")?.unwrap_or_default(),
        sizes: form.json::<Vec<ProductSize>>("sizes")?.unwrap_or_default(),
        extras: form.json::<Vec<ProductExtra>>("extras")?.unwrap_or_default(),
        special_instructions: form.text("special_instructions"),
        is_available: form.boolean("is_available")?.unwrap_or(true),
    };

    let image = match form.file("image") {
        Some(file) => Some(store_file(&state, "products", file).await?),
        None => None,
    };

    let product = match Product::create(&conn, NewProduct { image: image.clone(), ..new_product }).await {
        Ok(product) => product,
        Err(e) => {
            if let Some(url) = image.as_deref() {
                discard_file(&state, url).await;
            }
            return Err(e);
        }
    };

    tracing::info!("Restaurant {} added product {}", auth.id, product.id);

    Ok((StatusCode::CREATED, Json(ProductResponse { success: true, product })))
}

async fn update_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthRestaurant>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<ProductResponse>> {
    let conn = state.db.connect().map_err(AppError::from)?;
    let existing = Product::find_by_id(&conn, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    if existing.restaurant_id != auth.id {
        return Err(AppError::Forbidden("Product belongs to another restaurant".to_string()));
    }

    let form = FormData::from_multipart(multipart).await?;

    let item_name = form.text("item_name");
    if let Some(name) = item_name.as_deref().filter(|n| *n != existing.item_name) {
        if Product::find_by_item_name(&conn, &auth.id, name).await?.is_some() {
            return Err(AppError::BadRequest("Product already exists".to_string()));
        }
    }

    let mut changes = ProductChanges {
        category_id: resolve_category(&conn, &form).await?,
        item_name,
        description: form.text("description"),
        base_price_cents: form.cents("base_price")?,
        discount_price_cents: form.cents("discount_price")?,
        image: None,
        ingredients: form.list("ingredients")?,
        sizes: form.json("sizes")?,
        extras: form.json("extras")?,
        special_instructions: form.text("special_instructions"),
        is_available: form.boolean("is_available")?,
    };
    if let Some(file) = form.file("image") {
        changes.image = Some(store_file(&state, "products", file).await?);
    }
    let new_image = changes.image.clone();

    let product = match Product::update(&conn, &id, changes).await {
        Ok(product) => product,
        Err(e) => {
            if let Some(url) = new_image.as_deref() {
                discard_file(&state, url).await;
            }
            return Err(e);
        }
    };

    // The row now points at the new upload, so the replaced file is unreferenced.
    if let (Some(_), Some(old)) = (new_image.as_deref(), existing.image.as_deref()) {
        discard_file(&state, old).await;
    }

    Ok(Json(ProductResponse { success: true, product }))
}
