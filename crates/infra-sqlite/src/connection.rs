// SQLite Connection Pool Setup

use crate::error::map_sqlx_error;
use cctv_core::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// True for `sqlite::memory:` and `?mode=memory` URLs
pub fn is_in_memory(database_url: &str) -> bool {
    if database_url.contains(":memory:") {
        return true;
    }
    database_url
        .split_once('?')
        .map(|(_, query)| query.split('&').any(|pair| pair == "mode=memory"))
        .unwrap_or(false)
}

/// Create SQLite connection pool with WAL mode
///
/// In-memory databases get a single connection: every connection would
/// otherwise see its own empty database.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    let in_memory = is_in_memory(database_url);

    let mut options = SqliteConnectOptions::from_str(database_url)
        .map_err(map_sqlx_error)?
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true)
        .create_if_missing(true);
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(if in_memory { 1 } else { 10 })
        // Keep the single in-memory connection (and its data) alive
        .min_connections(if in_memory { 1 } else { 0 })
        .idle_timeout(if in_memory { None } else { Some(Duration::from_secs(600)) })
        .max_lifetime(if in_memory { None } else { Some(Duration::from_secs(1800)) })
        .connect_with(options)
        .await
        .map_err(map_sqlx_error)?;

    Ok(pool)
}
