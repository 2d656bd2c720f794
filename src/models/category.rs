use libsql::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::now_ts;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub created_ts: i64,
}

impl Category {
    fn from_row(row: &libsql::Row) -> Result<Self, libsql::Error> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            image: row.get(2)?,
            created_ts: row.get(3)?,
        })
    }

    pub async fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<Self>> {
        let mut rows = conn
            .query("SELECT * FROM categories WHERE id = ?", [id])
            .await
            .map_err(AppError::from)?;

        match rows.next().await.map_err(AppError::from)? {
            Some(row) => Ok(Some(Self::from_row(&row).map_err(AppError::from)?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_name(conn: &Connection, name: &str) -> AppResult<Option<Self>> {
        let mut rows = conn
            .query("SELECT * FROM categories WHERE name = ?", [name])
            .await
            .map_err(AppError::from)?;

        match rows.next().await.map_err(AppError::from)? {
            Some(row) => Ok(Some(Self::from_row(&row).map_err(AppError::from)?)),
            None => Ok(None),
        }
    }

    pub async fn list_all(conn: &Connection) -> AppResult<Vec<Self>> {
        let mut rows = conn
            .query("SELECT * FROM categories ORDER BY name ASC", ())
            .await
            .map_err(AppError::from)?;

        let mut categories = Vec::new();
        while let Some(row) = rows.next().await.map_err(AppError::from)? {
            categories.push(Self::from_row(&row).map_err(AppError::from)?);
        }
        Ok(categories)
    }

    pub async fn create(conn: &Connection, name: &str, image: Option<String>) -> AppResult<Self> {
        let id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO categories (id, name, image, created_ts) VALUES (?, ?, ?, ?)",
            libsql::params![id.clone(), name.to_string(), image, now_ts()],
        )
        .await
        .map_err(AppError::from)?;

        Self::find_by_id(conn, &id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to create category".to_string()))
    }

    pub async fn delete(conn: &Connection, id: &str) -> AppResult<()> {
        conn.execute("DELETE FROM categories WHERE id = ?", [id.to_string()])
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    pub async fn count_all(conn: &Connection) -> AppResult<i64> {
        let mut rows = conn
            .query("SELECT COUNT(*) FROM categories", ())
            .await
            .map_err(AppError::from)?;

        match rows.next().await.map_err(AppError::from)? {
            Some(row) => Ok(row.get::<i64>(0).map_err(AppError::from)?),
            None => Ok(0),
        }
    }
}
