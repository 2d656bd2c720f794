use libsql::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::now_ts;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub image: Option<String>,
    pub gender: String,
    pub dob: String,
    pub nationality: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    pub day: String,
    pub open: String,
    pub close: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_verified: bool,
    #[serde(skip_serializing)]
    pub otp: Option<String>,
    #[serde(skip_serializing)]
    pub otp_expire_ts: Option<i64>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub no_of_employees: Option<i64>,
    pub cuisine_type: Option<String>,
    pub operating_hours: Option<String>,
    pub image: Option<String>,
    pub owner_details: Option<String>,
    pub legal_copy: Option<String>,
    pub is_profile_completed: bool,
    pub is_approved: bool,
    pub created_ts: i64,
    pub updated_ts: i64,
}

/// Public view of a restaurant. Credentials and OTP state never leave the
/// server.
#[derive(Debug, Clone, Serialize)]
pub struct RestaurantProfile {
    pub id: String,
    pub email: String,
    pub is_verified: bool,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub no_of_employees: Option<i64>,
    pub cuisine_type: Option<String>,
    pub operating_hours: Vec<OperatingHours>,
    pub image: Option<String>,
    pub owner_details: Option<OwnerDetails>,
    pub legal_copy: Option<String>,
    pub is_profile_completed: bool,
    pub is_approved: bool,
    pub created_ts: i64,
    pub updated_ts: i64,
}

impl From<Restaurant> for RestaurantProfile {
    fn from(r: Restaurant) -> Self {
        let operating_hours = r.get_operating_hours();
        let owner_details = r.get_owner_details();
        Self {
            id: r.id,
            email: r.email,
            is_verified: r.is_verified,
            name: r.name,
            phone: r.phone,
            city: r.city,
            address: r.address,
            no_of_employees: r.no_of_employees,
            cuisine_type: r.cuisine_type,
            operating_hours,
            image: r.image,
            owner_details,
            legal_copy: r.legal_copy,
            is_profile_completed: r.is_profile_completed,
            is_approved: r.is_approved,
            created_ts: r.created_ts,
            updated_ts: r.updated_ts,
        }
    }
}

/// Partial profile update; `None` keeps the stored value.
#[derive(Debug, Default)]
pub struct RestaurantChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub no_of_employees: Option<i64>,
    pub cuisine_type: Option<String>,
    pub operating_hours: Option<Vec<OperatingHours>>,
    pub image: Option<String>,
}

impl Restaurant {
    fn from_row(row: &libsql::Row) -> Result<Self, libsql::Error> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            password_hash: row.get(2)?,
            is_verified: row.get::<i32>(3)? != 0,
            otp: row.get(4)?,
            otp_expire_ts: row.get(5)?,
            name: row.get(6)?,
            phone: row.get(7)?,
            city: row.get(8)?,
            address: row.get(9)?,
            no_of_employees: row.get(10)?,
            cuisine_type: row.get(11)?,
            operating_hours: row.get(12)?,
            image: row.get(13)?,
            owner_details: row.get(14)?,
            legal_copy: row.get(15)?,
            is_profile_completed: row.get::<i32>(16)? != 0,
            is_approved: row.get::<i32>(17)? != 0,
            created_ts: row.get(18)?,
            updated_ts: row.get(19)?,
        })
    }

    pub fn get_owner_details(&self) -> Option<OwnerDetails> {
        self.owner_details
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
    }

    pub fn get_operating_hours(&self) -> Vec<OperatingHours> {
        self.operating_hours
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }

    /// Every field an admin needs before approving the restaurant is filled.
    pub fn is_profile_complete(&self) -> bool {
        let filled = |field: &Option<String>| field.as_deref().is_some_and(|v| !v.trim().is_empty());

        filled(&self.name)
            && filled(&self.phone)
            && filled(&self.city)
            && filled(&self.address)
            && filled(&self.cuisine_type)
            && filled(&self.image)
            && filled(&self.legal_copy)
            && !self.get_operating_hours().is_empty()
            && self.get_owner_details().is_some()
    }

    /// True when `otp` matches the pending code and it has not expired at `now`.
    pub fn otp_matches(&self, otp: &str, now: i64) -> bool {
        match (&self.otp, self.otp_expire_ts) {
            (Some(expected), Some(expires)) => expected == otp && now <= expires,
            _ => false,
        }
    }
}

impl Restaurant {
    pub async fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<Self>> {
        let mut rows = conn
            .query("SELECT * FROM restaurants WHERE id = ?", [id])
            .await
            .map_err(AppError::from)?;

        match rows.next().await.map_err(AppError::from)? {
            Some(row) => Ok(Some(Self::from_row(&row).map_err(AppError::from)?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_email(conn: &Connection, email: &str) -> AppResult<Option<Self>> {
        let mut rows = conn
            .query("SELECT * FROM restaurants WHERE email = ?", [email])
            .await
            .map_err(AppError::from)?;

        match rows.next().await.map_err(AppError::from)? {
            Some(row) => Ok(Some(Self::from_row(&row).map_err(AppError::from)?)),
            None => Ok(None),
        }
    }

    pub async fn create(conn: &Connection, email: &str, password_hash: &str) -> AppResult<Self> {
        let id = Uuid::new_v4().to_string();
        let now = now_ts();
        conn.execute(
            "INSERT INTO restaurants (id, email, password_hash, created_ts, updated_ts) VALUES (?, ?, ?, ?, ?)",
            libsql::params![id.clone(), email.to_string(), password_hash.to_string(), now, now],
        )
        .await
        .map_err(|e| AppError::from(e).on_conflict("Restaurant already exists"))?;

        Self::find_by_id(conn, &id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to create restaurant".to_string()))
    }

    pub async fn set_otp(
        conn: &Connection,
        id: &str,
        otp: Option<&str>,
        expire_ts: Option<i64>,
    ) -> AppResult<()> {
        conn.execute(
            "UPDATE restaurants SET otp = ?, otp_expire_ts = ?, updated_ts = ? WHERE id = ?",
            libsql::params![otp.map(|s| s.to_string()), expire_ts, now_ts(), id.to_string()],
        )
        .await
        .map_err(AppError::from)?;
        Ok(())
    }

    pub async fn mark_verified(conn: &Connection, id: &str) -> AppResult<Self> {
        conn.execute(
            "UPDATE restaurants SET is_verified = 1, otp = NULL, otp_expire_ts = NULL, updated_ts = ? WHERE id = ?",
            libsql::params![now_ts(), id.to_string()],
        )
        .await
        .map_err(AppError::from)?;

        Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Restaurant not found".to_string()))
    }

    pub async fn update_details(conn: &Connection, id: &str, data: RestaurantChanges) -> AppResult<Self> {
        let current = Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Restaurant not found".to_string()))?;

        let operating_hours = match data.operating_hours {
            Some(hours) => Some(
                serde_json::to_string(&hours).map_err(|e| AppError::Internal(e.to_string()))?,
            ),
            None => current.operating_hours,
        };

        conn.execute(
            r#"
            UPDATE restaurants SET
                name = ?,
                phone = ?,
                city = ?,
                address = ?,
                no_of_employees = ?,
                cuisine_type = ?,
                operating_hours = ?,
                image = ?,
                updated_ts = ?
            WHERE id = ?
            "#,
            libsql::params![
                data.name.or(current.name),
                data.phone.or(current.phone),
                data.city.or(current.city),
                data.address.or(current.address),
                data.no_of_employees.or(current.no_of_employees),
                data.cuisine_type.or(current.cuisine_type),
                operating_hours,
                data.image.or(current.image),
                now_ts(),
                id.to_string()
            ],
        )
        .await
        .map_err(AppError::from)?;

        Self::refresh_profile_completion(conn, id).await
    }

    pub async fn set_owner_details(conn: &Connection, id: &str, owner: &OwnerDetails) -> AppResult<Self> {
        let owner_json = serde_json::to_string(owner).map_err(|e| AppError::Internal(e.to_string()))?;

        conn.execute(
            "UPDATE restaurants SET owner_details = ?, updated_ts = ? WHERE id = ?",
            libsql::params![owner_json, now_ts(), id.to_string()],
        )
        .await
        .map_err(AppError::from)?;

        Self::refresh_profile_completion(conn, id).await
    }

    pub async fn set_legal_copy(conn: &Connection, id: &str, legal_copy: &str) -> AppResult<Self> {
        conn.execute(
            "UPDATE restaurants SET legal_copy = ?, updated_ts = ? WHERE id = ?",
            libsql::params![legal_copy.to_string(), now_ts(), id.to_string()],
        )
        .await
        .map_err(AppError::from)?;

        Self::refresh_profile_completion(conn, id).await
    }

    /// Re-evaluates `is_profile_completed` from the stored fields.
    async fn refresh_profile_completion(conn: &Connection, id: &str) -> AppResult<Self> {
        let mut restaurant = Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Restaurant not found".to_string()))?;

        let completed = restaurant.is_profile_complete();
        if completed != restaurant.is_profile_completed {
            conn.execute(
                "UPDATE restaurants SET is_profile_completed = ? WHERE id = ?",
                libsql::params![completed as i32, id.to_string()],
            )
            .await
            .map_err(AppError::from)?;
            restaurant.is_profile_completed = completed;
        }

        Ok(restaurant)
    }

    pub async fn list_by_approval(conn: &Connection, approved: bool) -> AppResult<Vec<Self>> {
        let mut rows = conn
            .query(
                "SELECT * FROM restaurants WHERE is_approved = ? ORDER BY created_ts DESC",
                [approved as i32],
            )
            .await
            .map_err(AppError::from)?;

        let mut restaurants = Vec::new();
        while let Some(row) = rows.next().await.map_err(AppError::from)? {
            restaurants.push(Self::from_row(&row).map_err(AppError::from)?);
        }
        Ok(restaurants)
    }

    pub async fn set_approved(conn: &Connection, id: &str, is_approved: bool) -> AppResult<Self> {
        conn.execute(
            "UPDATE restaurants SET is_approved = ?, updated_ts = ? WHERE id = ?",
            libsql::params![is_approved as i32, now_ts(), id.to_string()],
        )
        .await
        .map_err(AppError::from)?;

        Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Restaurant not found".to_string()))
    }

    pub async fn count_all(conn: &Connection) -> AppResult<i64> {
        let mut rows = conn
            .query("SELECT COUNT(*) FROM restaurants", ())
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

    fn blank() -> Restaurant {
        Restaurant {
            id: "r1".to_string(),
            email: "owner@example.com".to_string(),
            password_hash: String::new(),
            is_verified: true,
            otp: None,
            otp_expire_ts: None,
            name: None,
            phone: None,
            city: None,
            address: None,
            no_of_employees: None,
            cuisine_type: None,
            operating_hours: None,
            image: None,
            owner_details: None,
            legal_copy: None,
            is_profile_completed: false,
            is_approved: false,
            created_ts: 0,
            updated_ts: 0,
        }
    }

    fn completed() -> Restaurant {
        let owner = OwnerDetails {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            phone: "555-0100".to_string(),
            image: None,
            gender: "female".to_string(),
            dob: "1990-02-01".to_string(),
            nationality: "PT".to_string(),
        };
        let hours = vec![OperatingHours {
            day: "Monday".to_string(),
            open: "09:00".to_string(),
            close: "22:00".to_string(),
        }];

        Restaurant {
            name: Some("Tasca".to_string()),
            phone: Some("555-0101".to_string()),
            city: Some("Lisbon".to_string()),
            address: Some("Rua 1".to_string()),
            cuisine_type: Some("Portuguese".to_string()),
            operating_hours: Some(serde_json::to_string(&hours).unwrap()),
            image: Some("/uploads/a.jpg".to_string()),
            owner_details: Some(serde_json::to_string(&owner).unwrap()),
            legal_copy: Some("/uploads/license.pdf".to_string()),
            ..blank()
        }
    }

    #[test]
    fn profile_completion_requires_every_section() {
        assert!(!blank().is_profile_complete());
        assert!(completed().is_profile_complete());

        let mut no_license = completed();
        no_license.legal_copy = None;
        assert!(!no_license.is_profile_complete());

        let mut blank_name = completed();
        blank_name.name = Some("  ".to_string());
        assert!(!blank_name.is_profile_complete());

        let mut broken_owner = completed();
        broken_owner.owner_details = Some("not json".to_string());
        assert!(!broken_owner.is_profile_complete());
    }

    #[test]
    fn otp_must_match_and_be_unexpired() {
        let mut restaurant = blank();
        assert!(!restaurant.otp_matches("1234", 0));

        restaurant.otp = Some("1234".to_string());
        restaurant.otp_expire_ts = Some(100);
        assert!(restaurant.otp_matches("1234", 100));
        assert!(!restaurant.otp_matches("1234", 101));
        assert!(!restaurant.otp_matches("4321", 50));
    }

    #[test]
    fn profile_hides_credentials() {
        let mut restaurant = completed();
        restaurant.password_hash = "secret-hash".to_string();
        restaurant.otp = Some("9999".to_string());

        let json = serde_json::to_value(RestaurantProfile::from(restaurant)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("otp").is_none());
        assert_eq!(json["owner_details"]["nationality"], "PT");
        assert_eq!(json["operating_hours"][0]["day"], "Monday");
    }
}
