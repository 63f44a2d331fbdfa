use review_core::average_rating;
use review_server_domain::{
    EntryId, GameId, ServiceResult, UserId,
    entry::{Entry, EntryRepository, EntryUpdate, EntryView, EntryWrite, NewEntry},
};
use sqlx::{Pool, Row, Sqlite, SqliteConnection, sqlite::SqliteRow};

use crate::db_error;

const ENTRY_COLUMNS: &str = "entries.id, entries.user_id, entries.game_id, entries.title, \
    entries.description, entries.rating, entries.image_path, entries.created_at";

pub struct SqliteEntryRepository {
    pool: Pool<Sqlite>,
}

impl SqliteEntryRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn entry_from_row(row: &SqliteRow) -> sqlx::Result<Entry> {
        Ok(Entry {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            game_id: row.try_get("game_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            rating: row.try_get("rating")?,
            image_path: row.try_get("image_path")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Writes the mean of the game's current entry ratings onto the game row.
/// Runs on the caller's connection so it joins the caller's transaction.
async fn recompute_in(conn: &mut SqliteConnection, game_id: GameId) -> sqlx::Result<f64> {
    let ratings: Vec<i64> = sqlx::query_scalar("SELECT rating FROM entries WHERE game_id = ?")
        .bind(game_id)
        .fetch_all(&mut *conn)
        .await?;
    let average = average_rating(&ratings);

    sqlx::query("UPDATE games SET rating = ? WHERE id = ?")
        .bind(average)
        .bind(game_id)
        .execute(&mut *conn)
        .await?;
    Ok(average)
}

#[async_trait::async_trait]
impl EntryRepository for SqliteEntryRepository {
    async fn get_entry(&self, id: EntryId) -> ServiceResult<Option<Entry>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM entries WHERE entries.id = ?",
            ENTRY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        row.as_ref()
            .map(Self::entry_from_row)
            .transpose()
            .map_err(db_error)
    }

    async fn get_entries_for_game(&self, game_id: GameId) -> ServiceResult<Vec<EntryView>> {
        let rows = sqlx::query(&format!(
            "SELECT {}, users.username FROM entries \
             JOIN users ON entries.user_id = users.id \
             WHERE entries.game_id = ? \
             ORDER BY entries.created_at DESC, entries.id DESC",
            ENTRY_COLUMNS
        ))
        .bind(game_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter()
            .map(|row| {
                Ok(EntryView {
                    entry: Self::entry_from_row(row)?,
                    username: row.try_get("username")?,
                })
            })
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(db_error)
    }

    async fn create_entry(&self, entry: &NewEntry) -> ServiceResult<EntryWrite> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let res = sqlx::query(
            "INSERT INTO entries (user_id, game_id, title, description, rating, image_path, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.user_id)
        .bind(entry.game_id)
        .bind(&entry.title)
        .bind(&entry.description)
        .bind(entry.rating.stars())
        .bind(&entry.image_path)
        .bind(entry.created_at)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        let game_rating = recompute_in(&mut tx, entry.game_id)
            .await
            .map_err(db_error)?;
        tx.commit().await.map_err(db_error)?;

        Ok(EntryWrite {
            entry_id: res.last_insert_rowid(),
            game_id: entry.game_id,
            game_rating,
            removed_image: None,
        })
    }

    async fn update_entry(
        &self,
        id: EntryId,
        owner: UserId,
        update: &EntryUpdate,
    ) -> ServiceResult<Option<EntryWrite>> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let current: Option<(GameId, String)> = sqlx::query_as(
            "SELECT game_id, image_path FROM entries WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error)?;
        let Some((game_id, current_image)) = current else {
            return Ok(None);
        };

        let query = match &update.image_path {
            Some(image_path) => sqlx::query(
                "UPDATE entries SET title = ?, description = ?, rating = ?, image_path = ? \
                 WHERE id = ? AND user_id = ?",
            )
            .bind(&update.title)
            .bind(&update.description)
            .bind(update.rating.stars())
            .bind(image_path),
            None => sqlx::query(
                "UPDATE entries SET title = ?, description = ?, rating = ? \
                 WHERE id = ? AND user_id = ?",
            )
            .bind(&update.title)
            .bind(&update.description)
            .bind(update.rating.stars()),
        };
        query
            .bind(id)
            .bind(owner)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        let game_rating = recompute_in(&mut tx, game_id).await.map_err(db_error)?;
        tx.commit().await.map_err(db_error)?;

        Ok(Some(EntryWrite {
            entry_id: id,
            game_id,
            game_rating,
            removed_image: update.image_path.as_ref().map(|_| current_image),
        }))
    }

    async fn delete_entry(
        &self,
        id: EntryId,
        owner: UserId,
    ) -> ServiceResult<Option<EntryWrite>> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let current: Option<(GameId, String)> = sqlx::query_as(
            "SELECT game_id, image_path FROM entries WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error)?;
        let Some((game_id, current_image)) = current else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM entries WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        let game_rating = recompute_in(&mut tx, game_id).await.map_err(db_error)?;
        tx.commit().await.map_err(db_error)?;

        Ok(Some(EntryWrite {
            entry_id: id,
            game_id,
            game_rating,
            removed_image: Some(current_image),
        }))
    }

    async fn recompute_rating(&self, game_id: GameId) -> ServiceResult<f64> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let rating = recompute_in(&mut tx, game_id).await.map_err(db_error)?;
        tx.commit().await.map_err(db_error)?;
        Ok(rating)
    }
}
