use review_persistence_sqlite::{create_db_pool, create_schema};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let db_path =
        std::env::var("REVIEW_DB").unwrap_or_else(|_| "database/games_review.db".to_string());
    if let Some(parent) = std::path::Path::new(&db_path).parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory for DB");
        println!("Created parent directory for DB at {}", parent.display());
    }

    let pool = create_db_pool(&db_path);
    create_schema(&pool).await.expect("Failed to create schema");
    println!("Database ready at {}", db_path);
}
