use log::error;
use review_server_domain::ServiceError;
use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

pub mod entries;
pub mod games;
pub mod users;

pub use entries::SqliteEntryRepository;
pub use games::SqliteGameRepository;
pub use users::SqliteUserRepository;

const SCHEMA: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS games (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        rating REAL NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS entries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id),
        game_id INTEGER NOT NULL REFERENCES games(id),
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        rating INTEGER NOT NULL,
        image_path TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_entries_game_id ON entries (game_id)",
];

/// Pool over the review database file, created on first use if missing.
pub fn create_db_pool(db_path: &str) -> Pool<Sqlite> {
    let conn_options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_lazy_with(conn_options)
}

pub async fn create_schema(pool: &Pool<Sqlite>) -> sqlx::Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

pub(crate) fn db_error(e: sqlx::Error) -> ServiceError {
    error!("Database error: {}", e);
    ServiceError::Internal(e.to_string())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> Pool<Sqlite> {
    use std::str::FromStr;

    let conn_options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    // A single connection that never expires keeps the in-memory database alive.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(conn_options)
        .await
        .unwrap();
    create_schema(&pool).await.unwrap();
    pool
}
