use std::{path::PathBuf, sync::Arc};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use log::info;
use review_server_domain::app::AppState;
use tower_http::services::{ServeDir, ServeFile};

use crate::jwt::Keys;

mod accounts;
mod auth;
mod entries;
mod error;
mod games;
mod jwt;

pub struct ApiSettings {
    pub host: String,
    pub port: u16,
    /// Directory served below `/static`, uploaded images included.
    pub static_dir: PathBuf,
    pub jwt_secret: Vec<u8>,
    pub max_upload_bytes: usize,
}

#[derive(Clone)]
pub struct ApiState {
    pub app: AppState,
    keys: Arc<Keys>,
}

pub fn router(app: AppState, settings: &ApiSettings) -> Router {
    let static_dir = &settings.static_dir;
    let state = ApiState {
        app,
        keys: Arc::new(Keys::new(&settings.jwt_secret)),
    };

    Router::new()
        .route("/", get(games::index))
        .route("/game/{id}", get(games::game_page))
        .route("/search", get(games::search))
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        .route("/logout", get(accounts::logout))
        .route("/add_entry", post(entries::add_entry))
        .route("/edit_entry/{id}", post(entries::edit_entry))
        .route("/delete_entry/{id}", post(entries::delete_entry))
        .route_service("/offline", ServeFile::new(static_dir.join("offline.html")))
        .route_service(
            "/service-worker.js",
            ServeFile::new(static_dir.join("js").join("service-worker.js")),
        )
        .route_service(
            "/manifest.json",
            ServeFile::new(static_dir.join("manifest.json")),
        )
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(settings.max_upload_bytes))
        .with_state(state)
}

pub async fn run(
    app: AppState,
    settings: ApiSettings,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let router = router(app, &settings);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", settings.host, settings.port)).await?;

    info!(
        "Review server listening on {}:{}",
        settings.host, settings.port
    );
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Review server shut down gracefully");
    Ok(())
}
