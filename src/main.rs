use std::sync::Arc;

use log::{error, info};
use review_images_fs::LocalImageStore;
use review_persistence_sqlite::{
    SqliteEntryRepository, SqliteGameRepository, SqliteUserRepository, create_db_pool,
    create_schema,
};
use review_server_api::ApiSettings;
use review_server_domain::app::{AppSettings, construct_app};

use crate::config::Config;

mod config;
mod logs;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received. Preparing graceful exit...");
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    logs::init_logger();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.create_db_dir() {
        error!("Failed to create database directory for {}: {}", config.db_path, e);
        std::process::exit(1);
    }

    let pool = create_db_pool(&config.db_path);
    if let Err(e) = create_schema(&pool).await {
        error!("Failed to prepare database {}: {}", config.db_path, e);
        std::process::exit(1);
    }
    info!("Using database {}", config.db_path);

    let app = construct_app(
        AppSettings {
            password_hash_cost: config.bcrypt_cost,
        },
        Arc::new(Box::new(SqliteUserRepository::new(pool.clone()))),
        Arc::new(Box::new(SqliteGameRepository::new(pool.clone()))),
        Arc::new(Box::new(SqliteEntryRepository::new(pool.clone()))),
        Arc::new(Box::new(LocalImageStore::new(config.static_dir.clone()))),
    );

    let settings = ApiSettings {
        host: config.host,
        port: config.port,
        static_dir: config.static_dir,
        jwt_secret: config.jwt_secret,
        max_upload_bytes: config.max_upload_bytes,
    };

    info!("Starting application");

    if let Err(e) = review_server_api::run(app, settings, shutdown_signal()).await {
        error!("HTTP server failed: {}", e);
    }
}
