use libsql::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::now_ts;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub restaurant_id: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_ts: i64,
}

impl Notification {
    fn from_row(row: &libsql::Row) -> Result<Self, libsql::Error> {
        Ok(Self {
            id: row.get(0)?,
            restaurant_id: row.get(1)?,
            title: row.get(2)?,
            message: row.get(3)?,
            is_read: row.get::<i32>(4)? != 0,
            created_ts: row.get(5)?,
        })
    }

    pub async fn create(conn: &Connection, restaurant_id: &str, title: &str, message: &str) -> AppResult<()> {
        conn.execute(
            "INSERT INTO notifications (id, restaurant_id, title, message, created_ts) VALUES (?, ?, ?, ?, ?)",
            libsql::params![
                Uuid::new_v4().to_string(),
                restaurant_id.to_string(),
                title.to_string(),
                message.to_string(),
                now_ts()
            ],
        )
        .await
        .map_err(AppError::from)?;
        Ok(())
    }

    pub async fn list_by_restaurant(conn: &Connection, restaurant_id: &str) -> AppResult<Vec<Self>> {
        let mut rows = conn
            .query(
                "SELECT * FROM notifications WHERE restaurant_id = ? ORDER BY created_ts DESC",
                [restaurant_id],
            )
            .await
            .map_err(AppError::from)?;

        let mut notifications = Vec::new();
        while let Some(row) = rows.next().await.map_err(AppError::from)? {
            notifications.push(Self::from_row(&row).map_err(AppError::from)?);
        }
        Ok(notifications)
    }
}
