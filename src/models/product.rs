use libsql::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::now_ts;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSize {
    pub size: String,
    pub price_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductExtra {
    pub name: String,
    pub price_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: String,
    pub restaurant_id: String,
    pub category_id: Option<String>,
    pub item_name: String,
    pub description: Option<String>,
    pub base_price_cents: i64,
    pub discount_price_cents: Option<i64>,
    pub discount_percentage: i64,
    pub image: Option<String>,
    pub ingredients: Vec<String>,
    pub sizes: Vec<ProductSize>,
    pub extras: Vec<ProductExtra>,
    pub special_instructions: Option<String>,
    pub is_available: bool,
    pub created_ts: i64,
    pub updated_ts: i64,
}

#[derive(Debug)]
pub struct NewProduct {
    pub restaurant_id: String,
    pub category_id: Option<String>,
    pub item_name: String,
    pub description: Option<String>,
    pub base_price_cents: i64,
    pub discount_price_cents: Option<i64>,
    pub image: Option<String>,
    pub ingredients: Vec<String>,
    pub sizes: Vec<ProductSize>,
    pub extras: Vec<ProductExtra>,
    pub special_instructions: Option<String>,
    pub is_available: bool,
}

/// Partial product update; `None` keeps the stored value.
#[derive(Debug, Default)]
pub struct ProductChanges {
    pub category_id: Option<String>,
    pub item_name: Option<String>,
    pub description: Option<String>,
    pub base_price_cents: Option<i64>,
    pub discount_price_cents: Option<i64>,
    pub image: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub sizes: Option<Vec<ProductSize>>,
    pub extras: Option<Vec<ProductExtra>>,
    pub special_instructions: Option<String>,
    pub is_available: Option<bool>,
}

/// Whole-percent saving of `discount` against `base`, 0 when there is none.
pub fn discount_percentage(base_cents: i64, discount_cents: Option<i64>) -> i64 {
    match discount_cents {
        Some(discount) if base_cents > 0 && discount < base_cents => {
            let saved = (base_cents - discount.max(0)) as f64;
            (saved / base_cents as f64 * 100.0).round() as i64
        }
        _ => 0,
    }
}

fn to_json<T: Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string(value).map_err(|e| AppError::Internal(e.to_string()))
}

impl Product {
    fn from_row(row: &libsql::Row) -> Result<Self, libsql::Error> {
        let ingredients: String = row.get(9)?;
        let sizes: String = row.get(10)?;
        let extras: String = row.get(11)?;

        Ok(Self {
            id: row.get(0)?,
            restaurant_id: row.get(1)?,
            category_id: row.get(2)?,
            item_name: row.get(3)?,
            description: row.get(4)?,
            base_price_cents: row.get(5)?,
            discount_price_cents: row.get(6)?,
            discount_percentage: row.get(7)?,
            image: row.get(8)?,
            ingredients: serde_json::from_str(&ingredients).unwrap_or_default(),
            sizes: serde_json::from_str(&sizes).unwrap_or_default(),
            extras: serde_json::from_str(&extras).unwrap_or_default(),
            special_instructions: row.get(12)?,
            is_available: row.get::<i32>(13)? != 0,
            created_ts: row.get(14)?,
            updated_ts: row.get(15)?,
        })
    }

    pub async fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<Self>> {
        let mut rows = conn
            .query("SELECT * FROM products WHERE id = ?", [id])
            .await
            .map_err(AppError::from)?;

        match rows.next().await.map_err(AppError::from)? {
            Some(row) => Ok(Some(Self::from_row(&row).map_err(AppError::from)?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_item_name(
        conn: &Connection,
        restaurant_id: &str,
        item_name: &str,
    ) -> AppResult<Option<Self>> {
        let mut rows = conn
            .query(
                "SELECT * FROM products WHERE restaurant_id = ? AND item_name = ?",
                [restaurant_id, item_name],
            )
            .await
            .map_err(AppError::from)?;

        match rows.next().await.map_err(AppError::from)? {
            Some(row) => Ok(Some(Self::from_row(&row).map_err(AppError::from)?)),
            None => Ok(None),
        }
    }

    pub async fn list_by_restaurant(conn: &Connection, restaurant_id: &str) -> AppResult<Vec<Self>> {
        let mut rows = conn
            .query(
                "SELECT * FROM products WHERE restaurant_id = ? ORDER BY created_ts DESC",
                [restaurant_id],
            )
            .await
            .map_err(AppError::from)?;

        let mut products = Vec::new();
        while let Some(row) = rows.next().await.map_err(AppError::from)? {
            products.push(Self::from_row(&row).map_err(AppError::from)?);
        }
        Ok(products)
    }

    pub async fn create(conn: &Connection, data: NewProduct) -> AppResult<Self> {
        let id = Uuid::new_v4().to_string();
        let now = now_ts();
        let percentage = discount_percentage(data.base_price_cents, data.discount_price_cents);

        conn.execute(
            r#"
            INSERT INTO products (
                id, restaurant_id, category_id, item_name, description,
                base_price_cents, discount_price_cents, discount_percentage, image,
                ingredients, sizes, extras, special_instructions, is_available,
                created_ts, updated_ts
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            libsql::params![
                id.clone(),
                data.restaurant_id,
                data.category_id,
                data.item_name,
                data.description,
                data.base_price_cents,
                data.discount_price_cents,
                percentage,
                data.image,
                to_json(&data.ingredients)?,
                to_json(&data.sizes)?,
                to_json(&data.extras)?,
                data.special_instructions,
                data.is_available as i32,
                now,
                now
            ],
        )
        .await
        .map_err(AppError::from)?;

        Self::find_by_id(conn, &id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to create product".to_string()))
    }

    pub async fn update(conn: &Connection, id: &str, data: ProductChanges) -> AppResult<Self> {
        let current = Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        let base_price_cents = data.base_price_cents.unwrap_or(current.base_price_cents);
        let discount_price_cents = data.discount_price_cents.or(current.discount_price_cents);
        let percentage = discount_percentage(base_price_cents, discount_price_cents);

        conn.execute(
            r#"
            UPDATE products SET
                category_id = ?,
                item_name = ?,
                description = ?,
                base_price_cents = ?,
                discount_price_cents = ?,
                discount_percentage = ?,
                image = ?,
                ingredients = ?,
                sizes = ?,
                extras = ?,
                special_instructions = ?,
                is_available = ?,
                updated_ts = ?
            WHERE id = ?
            "#,
            libsql::params![
                data.category_id.or(current.category_id),
                data.item_name.unwrap_or(current.item_name),
                data.description.or(current.description),
                base_price_cents,
                discount_price_cents,
                percentage,
                data.image.or(current.image),
                to_json(&data.ingredients.unwrap_or(current.ingredients))?,
                to_json(&data.sizes.unwrap_or(current.sizes))?,
                to_json(&data.extras.unwrap_or(current.extras))?,
                data.special_instructions.or(current.special_instructions),
                data.is_available.unwrap_or(current.is_available) as i32,
                now_ts(),
                id.to_string()
            ],
        )
        .await
        .map_err(AppError::from)?;

        Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    pub async fn count_all(conn: &Connection) -> AppResult<i64> {
        let mut rows = conn
            .query("SELECT COUNT(*) FROM products", ())
            .await
            .map_err(AppError::from)?;

        match rows.next().await.map_err(AppError::from)? {
            Some(row) => Ok(row.get::<i64>(0).map_err(AppError::from)?),
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount_percentage_rounds_to_whole_percent() {
        assert_eq!(discount_percentage(1000, Some(750)), 25);
        assert_eq!(discount_percentage(999, Some(666)), 33);
        assert_eq!(discount_percentage(300, Some(0)), 100);
    }

    #[test]
    fn discount_percentage_is_zero_without_a_saving() {
        assert_eq!(discount_percentage(1000, None), 0);
        assert_eq!(discount_percentage(0, Some(0)), 0);
        assert_eq!(discount_percentage(1000, Some(1000)), 0);
        assert_eq!(discount_percentage(1000, Some(1200)), 0);
    }
}
