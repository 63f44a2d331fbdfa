use axum::{
    Json,
    extract::{Path, Query, State},
};
use review_server_domain::{
    EntryId, GameId, UserId,
    entry::EntryView,
    game::Game,
};

use crate::{ApiState, error::ApiResult};

#[derive(serde::Serialize)]
pub struct JsonGame {
    id: GameId,
    title: String,
    description: String,
    rating: f64,
}

impl From<Game> for JsonGame {
    fn from(game: Game) -> Self {
        Self {
            id: game.id,
            title: game.title,
            description: game.description,
            rating: game.rating,
        }
    }
}

#[derive(serde::Serialize)]
pub struct JsonEntry {
    id: EntryId,
    user_id: UserId,
    username: String,
    title: String,
    description: String,
    rating: i64,
    image_url: String,
    created_at: String,
}

impl From<EntryView> for JsonEntry {
    fn from(view: EntryView) -> Self {
        let entry = view.entry;
        Self {
            id: entry.id,
            user_id: entry.user_id,
            username: view.username,
            title: entry.title,
            description: entry.description,
            rating: entry.rating,
            image_url: format!("/static/{}", entry.image_path),
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

#[derive(serde::Serialize)]
pub struct JsonGameList {
    games: Vec<JsonGame>,
}

#[derive(serde::Serialize)]
pub struct JsonGamePage {
    game: JsonGame,
    entries: Vec<JsonEntry>,
}

#[derive(serde::Serialize)]
pub struct JsonSearchResult {
    games: Vec<JsonGame>,
    query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct SearchParams {
    search: Option<String>,
}

pub async fn index(State(state): State<ApiState>) -> ApiResult<Json<JsonGameList>> {
    let games = state.app.game_service.list_games().await?;
    Ok(Json(JsonGameList {
        games: games.into_iter().map(JsonGame::from).collect(),
    }))
}

pub async fn game_page(
    Path(id): Path<GameId>,
    State(state): State<ApiState>,
) -> ApiResult<Json<JsonGamePage>> {
    let page = state.app.game_service.get_game_page(id).await?;
    Ok(Json(JsonGamePage {
        game: page.game.into(),
        entries: page.entries.into_iter().map(JsonEntry::from).collect(),
    }))
}

pub async fn search(
    Query(params): Query<SearchParams>,
    State(state): State<ApiState>,
) -> ApiResult<Json<JsonSearchResult>> {
    let result = state
        .app
        .game_service
        .search(params.search.as_deref())
        .await?;
    let message = result
        .no_results()
        .then(|| "No games match your search".to_string());
    Ok(Json(JsonSearchResult {
        games: result.games.into_iter().map(JsonGame::from).collect(),
        query: result.query,
        message,
    }))
}
