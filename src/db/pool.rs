use libsql::{Builder, Database};

pub async fn create_database(database_url: &str, auth_token: Option<&str>) -> Result<Database, libsql::Error> {
    // Turso remote URL
    if database_url.starts_with("libsql://") {
        let auth_token = auth_token.ok_or_else(|| {
            libsql::Error::ConnectionFailed("TURSO_AUTH_TOKEN must be set for remote database".to_string())
        })?;

        Builder::new_remote(database_url.to_string(), auth_token.to_string())
            .build()
            .await
    } else {
        // Local SQLite file
        let path = database_url
            .strip_prefix("sqlite:")
            .unwrap_or(database_url)
            .split('?')
            .next()
            .unwrap_or("food_delivery.db");

        Builder::new_local(path).build().await
    }
}
