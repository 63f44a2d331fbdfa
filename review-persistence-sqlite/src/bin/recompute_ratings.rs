use review_persistence_sqlite::{
    SqliteEntryRepository, SqliteGameRepository, create_db_pool, create_schema,
};
use review_server_domain::entry::EntryRepository;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let db_path =
        std::env::var("REVIEW_DB").unwrap_or_else(|_| "database/games_review.db".to_string());
    let pool = create_db_pool(&db_path);
    create_schema(&pool).await.expect("Failed to create schema");

    let games = SqliteGameRepository::new(pool.clone());
    let repository = SqliteEntryRepository::new(pool);
    let game_ids = games
        .get_game_ids()
        .await
        .expect("Failed to list games");
    for game_id in &game_ids {
        let rating = repository
            .recompute_rating(*game_id)
            .await
            .expect("Failed to recompute rating");
        println!("Game {}: {:.1}", game_id, rating);
    }
    println!("Recomputed {} games", game_ids.len());
}
