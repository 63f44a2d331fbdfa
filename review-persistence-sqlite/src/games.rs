use review_server_domain::{
    GameId, ServiceResult,
    game::{Game, GameRepository, NewGame},
};
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use crate::db_error;

pub struct SqliteGameRepository {
    pool: Pool<Sqlite>,
}

impl SqliteGameRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn game_from_row(row: &SqliteRow) -> sqlx::Result<Game> {
        Ok(Game {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            rating: row.try_get("rating")?,
        })
    }

    /// Ids of every game, for bulk maintenance.
    pub async fn get_game_ids(&self) -> ServiceResult<Vec<GameId>> {
        sqlx::query_scalar("SELECT id FROM games ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)
    }

    fn games_from_rows(rows: Vec<SqliteRow>) -> ServiceResult<Vec<Game>> {
        rows.iter()
            .map(|row| Self::game_from_row(row).map_err(db_error))
            .collect()
    }
}

/// Escapes LIKE wildcards so the term only ever matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait::async_trait]
impl GameRepository for SqliteGameRepository {
    async fn get_games(&self) -> ServiceResult<Vec<Game>> {
        let rows = sqlx::query("SELECT id, title, description, rating FROM games ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        Self::games_from_rows(rows)
    }

    async fn get_game(&self, id: GameId) -> ServiceResult<Option<Game>> {
        let row = sqlx::query("SELECT id, title, description, rating FROM games WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.as_ref()
            .map(Self::game_from_row)
            .transpose()
            .map_err(db_error)
    }

    async fn search_games(&self, term: &str) -> ServiceResult<Vec<Game>> {
        // LIKE ignores case for ASCII letters
        let rows = sqlx::query(
            "SELECT id, title, description, rating FROM games WHERE title LIKE ? ESCAPE '\\' ORDER BY id",
        )
        .bind(format!("%{}%", escape_like(term)))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Self::games_from_rows(rows)
    }

    async fn create_game(&self, game: &NewGame) -> ServiceResult<GameId> {
        let res = sqlx::query("INSERT INTO games (title, description, rating) VALUES (?, ?, 0)")
            .bind(&game.title)
            .bind(&game.description)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(res.last_insert_rowid())
    }
}
