//! Database pool for the scanner datastore.
//!
//! The schema belongs to the scanner, so there are no migrations here.

use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;

/// Initialize the MySQL connection pool.
///
/// # Errors
///
/// Returns an error if the connection fails.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<MySqlPool, sqlx::Error> {
    MySqlPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
