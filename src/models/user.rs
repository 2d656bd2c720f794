use libsql::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::now_ts;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Rider,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Rider => "rider",
            Role::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(Role::Customer),
            "rider" => Some(Role::Rider),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub phone: Option<String>,
    pub image: Option<String>,
    pub is_approved: bool,
    pub created_ts: i64,
    pub updated_ts: i64,
}

impl User {
    fn from_row(row: &libsql::Row) -> Result<Self, libsql::Error> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            role: row.get(4)?,
            phone: row.get(5)?,
            image: row.get(6)?,
            is_approved: row.get::<i32>(7)? != 0,
            created_ts: row.get(8)?,
            updated_ts: row.get(9)?,
        })
    }

    pub fn get_role(&self) -> Option<Role> {
        Role::from_str(&self.role)
    }
}

#[derive(Debug)]
pub struct CreateUser {
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
    pub is_approved: bool,
}

impl User {
    pub async fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<Self>> {
        let mut rows = conn
            .query("SELECT * FROM users WHERE id = ?", [id])
            .await
            .map_err(AppError::from)?;

        match rows.next().await.map_err(AppError::from)? {
            Some(row) => Ok(Some(Self::from_row(&row).map_err(AppError::from)?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_email(conn: &Connection, email: &str) -> AppResult<Option<Self>> {
        let mut rows = conn
            .query("SELECT * FROM users WHERE email = ?", [email])
            .await
            .map_err(AppError::from)?;

        match rows.next().await.map_err(AppError::from)? {
            Some(row) => Ok(Some(Self::from_row(&row).map_err(AppError::from)?)),
            None => Ok(None),
        }
    }

    pub async fn create(conn: &Connection, data: CreateUser) -> AppResult<Self> {
        let id = Uuid::new_v4().to_string();
        let now = now_ts();
        conn.execute(
            "INSERT INTO users (id, name, email, password_hash, role, phone, is_approved, created_ts, updated_ts) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            libsql::params![
                id.clone(),
                data.name,
                data.email,
                data.password_hash,
                data.role.as_str().to_string(),
                data.phone,
                data.is_approved as i32,
                now,
                now
            ],
        )
        .await
        .map_err(|e| AppError::from(e).on_conflict("User already exists"))?;

        Self::find_by_id(conn, &id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to create user".to_string()))
    }

    pub async fn list_by_role(conn: &Connection, role: Role, approved: bool) -> AppResult<Vec<Self>> {
        let mut rows = conn
            .query(
                "SELECT * FROM users WHERE role = ? AND is_approved = ? ORDER BY created_ts DESC",
                libsql::params![role.as_str().to_string(), approved as i32],
            )
            .await
            .map_err(AppError::from)?;

        let mut users = Vec::new();
        while let Some(row) = rows.next().await.map_err(AppError::from)? {
            users.push(Self::from_row(&row).map_err(AppError::from)?);
        }
        Ok(users)
    }

    /// Customers that have placed at least one order.
    pub async fn list_customers_with_orders(conn: &Connection) -> AppResult<Vec<Self>> {
        let mut rows = conn
            .query(
                "SELECT * FROM users WHERE role = 'customer' AND id IN (SELECT user_id FROM orders WHERE user_id IS NOT NULL) ORDER BY created_ts DESC",
                (),
            )
            .await
            .map_err(AppError::from)?;

        let mut users = Vec::new();
        while let Some(row) = rows.next().await.map_err(AppError::from)? {
            users.push(Self::from_row(&row).map_err(AppError::from)?);
        }
        Ok(users)
    }

    pub async fn count_by_role(conn: &Connection, role: Role) -> AppResult<i64> {
        let mut rows = conn
            .query("SELECT COUNT(*) FROM users WHERE role = ?", [role.as_str()])
            .await
            .map_err(AppError::from)?;

        match rows.next().await.map_err(AppError::from)? {
            Some(row) => Ok(row.get::<i64>(0).map_err(AppError::from)?),
            None => Ok(0),
        }
    }

    pub async fn set_approved(conn: &Connection, id: &str, is_approved: bool) -> AppResult<Self> {
        conn.execute(
            "UPDATE users SET is_approved = ?, updated_ts = ? WHERE id = ?",
            libsql::params![is_approved as i32, now_ts(), id.to_string()],
        )
        .await
        .map_err(AppError::from)?;

        Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}
