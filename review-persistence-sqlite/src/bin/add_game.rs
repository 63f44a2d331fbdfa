use review_persistence_sqlite::{SqliteGameRepository, create_db_pool, create_schema};
use review_server_domain::game::{GameRepository, NewGame};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: add_game <title> [description]");
        std::process::exit(1);
    }

    let db_path =
        std::env::var("REVIEW_DB").unwrap_or_else(|_| "database/games_review.db".to_string());
    let pool = create_db_pool(&db_path);
    create_schema(&pool).await.expect("Failed to create schema");

    let game = NewGame {
        title: args[1].trim().to_string(),
        description: args.get(2).cloned().unwrap_or_default(),
    };
    if game.title.is_empty() {
        eprintln!("Title must not be empty");
        std::process::exit(1);
    }

    let repository = SqliteGameRepository::new(pool);
    let id = repository
        .create_game(&game)
        .await
        .expect("Failed to create game");
    println!("Created game [{}] with id {}", game.title, id);
}
