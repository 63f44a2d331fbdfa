use std::sync::Arc;

use crate::{
    GameId, ServiceError, ServiceResult,
    entry::{ArcEntryRepository, EntryView},
};

#[derive(Clone, Debug, PartialEq)]
pub struct Game {
    pub id: GameId,
    pub title: String,
    pub description: String,
    /// Cached mean of the game's entry ratings, one decimal place.
    pub rating: f64,
}

#[derive(Clone, Debug)]
pub struct NewGame {
    pub title: String,
    pub description: String,
}

pub type ArcGameRepository = Arc<Box<dyn GameRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait GameRepository {
    async fn get_games(&self) -> ServiceResult<Vec<Game>>;
    async fn get_game(&self, id: GameId) -> ServiceResult<Option<Game>>;
    /// Games whose title contains `term`, ignoring case.
    async fn search_games(&self, term: &str) -> ServiceResult<Vec<Game>>;
    async fn create_game(&self, game: &NewGame) -> ServiceResult<GameId>;
}

#[derive(Clone, Debug)]
pub struct GamePage {
    pub game: Game,
    pub entries: Vec<EntryView>,
}

#[derive(Clone, Debug)]
pub struct SearchResult {
    pub games: Vec<Game>,
    pub query: Option<String>,
}

impl SearchResult {
    /// A non-empty query matched nothing.
    pub fn no_results(&self) -> bool {
        self.query.is_some() && self.games.is_empty()
    }
}

pub type ArcGameService = Arc<Box<dyn GameService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait GameService {
    async fn list_games(&self) -> ServiceResult<Vec<Game>>;
    async fn get_game_page(&self, id: GameId) -> ServiceResult<GamePage>;
    async fn search(&self, query: Option<&str>) -> ServiceResult<SearchResult>;
}

pub struct GameServiceImpl {
    game_repository: ArcGameRepository,
    entry_repository: ArcEntryRepository,
}

impl GameServiceImpl {
    pub fn new(game_repository: ArcGameRepository, entry_repository: ArcEntryRepository) -> Self {
        Self {
            game_repository,
            entry_repository,
        }
    }
}

#[async_trait::async_trait]
impl GameService for GameServiceImpl {
    async fn list_games(&self) -> ServiceResult<Vec<Game>> {
        self.game_repository.get_games().await
    }

    async fn get_game_page(&self, id: GameId) -> ServiceResult<GamePage> {
        let Some(game) = self.game_repository.get_game(id).await? else {
            return ServiceError::not_found("Game not found");
        };
        let entries = self.entry_repository.get_entries_for_game(id).await?;
        Ok(GamePage { game, entries })
    }

    async fn search(&self, query: Option<&str>) -> ServiceResult<SearchResult> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let games = match query {
            Some(term) => self.game_repository.search_games(term).await?,
            None => self.game_repository.get_games().await?,
        };
        Ok(SearchResult {
            games,
            query: query.map(str::to_string),
        })
    }
}
