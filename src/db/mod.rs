mod pool;

use libsql::Connection;

pub use pool::create_database;

const SCHEMA: &str = include_str!("schema.sql");

/// Creates any missing tables and indexes.
pub async fn migrate(conn: &Connection) -> Result<(), libsql::Error> {
    conn.execute_batch(SCHEMA).await?;
    Ok(())
}
