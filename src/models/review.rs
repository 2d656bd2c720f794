use libsql::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::now_ts;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub restaurant_id: String,
    pub user_id: Option<String>,
    pub rating: i64,
    pub review: Option<String>,
    pub created_ts: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingSummary {
    pub average: f64,
    pub count: i64,
}

impl Review {
    fn from_row(row: &libsql::Row) -> Result<Self, libsql::Error> {
        Ok(Self {
            id: row.get(0)?,
            restaurant_id: row.get(1)?,
            user_id: row.get(2)?,
            rating: row.get(3)?,
            review: row.get(4)?,
            created_ts: row.get(5)?,
        })
    }

    pub async fn create(
        conn: &Connection,
        restaurant_id: &str,
        user_id: Option<&str>,
        rating: i64,
        review: Option<&str>,
    ) -> AppResult<Self> {
        if !(1..=5).contains(&rating) {
            return Err(AppError::BadRequest("Rating must be between 1 and 5".to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let created_ts = now_ts();
        conn.execute(
            "INSERT INTO reviews (id, restaurant_id, user_id, rating, review, created_ts) VALUES (?, ?, ?, ?, ?, ?)",
            libsql::params![
                id.clone(),
                restaurant_id.to_string(),
                user_id.map(|s| s.to_string()),
                rating,
                review.map(|s| s.to_string()),
                created_ts
            ],
        )
        .await
        .map_err(AppError::from)?;

        Ok(Self {
            id,
            restaurant_id: restaurant_id.to_string(),
            user_id: user_id.map(|s| s.to_string()),
            rating,
            review: review.map(|s| s.to_string()),
            created_ts,
        })
    }

    pub async fn list_by_restaurant(conn: &Connection, restaurant_id: &str) -> AppResult<Vec<Self>> {
        let mut rows = conn
            .query(
                "SELECT * FROM reviews WHERE restaurant_id = ? ORDER BY created_ts DESC",
                [restaurant_id],
            )
            .await
            .map_err(AppError::from)?;

        let mut reviews = Vec::new();
        while let Some(row) = rows.next().await.map_err(AppError::from)? {
            reviews.push(Self::from_row(&row).map_err(AppError::from)?);
        }
        Ok(reviews)
    }

    pub async fn summary_for(conn: &Connection, restaurant_id: &str) -> AppResult<RatingSummary> {
        let mut rows = conn
            .query(
                "SELECT AVG(rating), COUNT(*) FROM reviews WHERE restaurant_id = ?",
                [restaurant_id],
            )
            .await
            .map_err(AppError::from)?;

        match rows.next().await.map_err(AppError::from)? {
            Some(row) => Ok(RatingSummary {
                average: row.get::<Option<f64>>(0).map_err(AppError::from)?.unwrap_or(0.0),
                count: row.get::<i64>(1).map_err(AppError::from)?,
            }),
            None => Ok(RatingSummary { average: 0.0, count: 0 }),
        }
    }
}
