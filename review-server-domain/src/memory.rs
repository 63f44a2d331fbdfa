//! In-memory implementations of the storage ports, for service tests.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use chrono::Utc;
use review_core::{
    average_rating,
    upload::{UPLOAD_DIR, stored_image_name},
};

use crate::{
    EntryId, GameId, ServiceError, ServiceResult, UserId,
    account::{AuthenticatedUser, User, UserRepository},
    entry::{Entry, EntryRepository, EntryUpdate, EntryView, EntryWrite, NewEntry},
    game::{Game, GameRepository, NewGame},
    image::{ImageStore, ImageUpload},
};

#[derive(Default)]
struct StoreState {
    users: BTreeMap<UserId, User>,
    games: BTreeMap<GameId, Game>,
    entries: BTreeMap<EntryId, Entry>,
    last_id: i64,
    fail_writes: bool,
    /// Image path another request switches the entry to right before the
    /// next update or delete reaches the store.
    concurrent_image: Option<String>,
}

impl StoreState {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn recompute(&mut self, game_id: GameId) -> f64 {
        let ratings: Vec<i64> = self
            .entries
            .values()
            .filter(|e| e.game_id == game_id)
            .map(|e| e.rating)
            .collect();
        let average = average_rating(&ratings);
        if let Some(game) = self.games.get_mut(&game_id) {
            game.rating = average;
        }
        average
    }

    fn apply_concurrent_image(&mut self, id: EntryId) {
        if let Some(path) = self.concurrent_image.take() {
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.image_path = path;
            }
        }
    }

    fn check_writable(&self) -> ServiceResult<()> {
        if self.fail_writes {
            return ServiceError::internal("database is read only");
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub fn add_user(&self, username: &str) -> AuthenticatedUser {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.users.insert(
            id,
            User {
                id,
                username: username.to_string(),
                password_hash: String::new(),
            },
        );
        AuthenticatedUser {
            id,
            username: username.to_string(),
        }
    }

    pub fn add_game(&self, title: &str) -> GameId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.games.insert(
            id,
            Game {
                id,
                title: title.to_string(),
                description: String::new(),
                rating: 0.0,
            },
        );
        id
    }

    pub fn user(&self, id: UserId) -> Option<User> {
        self.state.lock().unwrap().users.get(&id).cloned()
    }

    pub fn game(&self, id: GameId) -> Option<Game> {
        self.state.lock().unwrap().games.get(&id).cloned()
    }

    pub fn entry(&self, id: EntryId) -> Option<Entry> {
        self.state.lock().unwrap().entries.get(&id).cloned()
    }

    pub fn entries_for_game(&self, game_id: GameId) -> Vec<Entry> {
        self.state
            .lock()
            .unwrap()
            .entries
            .values()
            .filter(|e| e.game_id == game_id)
            .cloned()
            .collect()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }

    pub fn replace_image_concurrently(&self, path: &str) {
        self.state.lock().unwrap().concurrent_image = Some(path.to_string());
    }
}

#[async_trait::async_trait]
impl UserRepository for MemoryStore {
    async fn get_user_by_id(&self, id: UserId) -> ServiceResult<Option<User>> {
        Ok(self.user(id))
    }

    async fn get_user_by_name(&self, username: &str) -> ServiceResult<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> ServiceResult<UserId> {
        let mut state = self.state.lock().unwrap();
        state.check_writable()?;
        if state.users.values().any(|u| u.username == username) {
            return ServiceError::not_possible("Username already taken");
        }
        let id = state.next_id();
        state.users.insert(
            id,
            User {
                id,
                username: username.to_string(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(id)
    }
}

#[async_trait::async_trait]
impl GameRepository for MemoryStore {
    async fn get_games(&self) -> ServiceResult<Vec<Game>> {
        Ok(self.state.lock().unwrap().games.values().cloned().collect())
    }

    async fn get_game(&self, id: GameId) -> ServiceResult<Option<Game>> {
        Ok(self.game(id))
    }

    async fn search_games(&self, term: &str) -> ServiceResult<Vec<Game>> {
        // Same folding as SQLite LIKE: ASCII letters only.
        let term = term.to_ascii_lowercase();
        let state = self.state.lock().unwrap();
        Ok(state
            .games
            .values()
            .filter(|g| g.title.to_ascii_lowercase().contains(&term))
            .cloned()
            .collect())
    }

    async fn create_game(&self, game: &NewGame) -> ServiceResult<GameId> {
        let id = self.add_game(&game.title);
        if let Some(stored) = self.state.lock().unwrap().games.get_mut(&id) {
            stored.description = game.description.clone();
        }
        Ok(id)
    }
}

#[async_trait::async_trait]
impl EntryRepository for MemoryStore {
    async fn get_entry(&self, id: EntryId) -> ServiceResult<Option<Entry>> {
        Ok(self.entry(id))
    }

    async fn get_entries_for_game(&self, game_id: GameId) -> ServiceResult<Vec<EntryView>> {
        let state = self.state.lock().unwrap();
        let mut entries: Vec<EntryView> = state
            .entries
            .values()
            .filter(|e| e.game_id == game_id)
            .map(|e| EntryView {
                entry: e.clone(),
                username: state
                    .users
                    .get(&e.user_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_default(),
            })
            .collect();
        entries.sort_by(|a, b| {
            (b.entry.created_at, b.entry.id).cmp(&(a.entry.created_at, a.entry.id))
        });
        Ok(entries)
    }

    async fn create_entry(&self, entry: &NewEntry) -> ServiceResult<EntryWrite> {
        let mut state = self.state.lock().unwrap();
        state.check_writable()?;
        let id = state.next_id();
        state.entries.insert(
            id,
            Entry {
                id,
                user_id: entry.user_id,
                game_id: entry.game_id,
                title: entry.title.clone(),
                description: entry.description.clone(),
                rating: entry.rating.stars(),
                image_path: entry.image_path.clone(),
                created_at: entry.created_at,
            },
        );
        let game_rating = state.recompute(entry.game_id);
        Ok(EntryWrite {
            entry_id: id,
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
        let mut state = self.state.lock().unwrap();
        state.check_writable()?;
        state.apply_concurrent_image(id);
        let Some(entry) = state
            .entries
            .get_mut(&id)
            .filter(|e| e.user_id == owner)
        else {
            return Ok(None);
        };
        entry.title = update.title.clone();
        entry.description = update.description.clone();
        entry.rating = update.rating.stars();
        let removed_image = update
            .image_path
            .as_ref()
            .map(|path| std::mem::replace(&mut entry.image_path, path.clone()));
        let game_id = entry.game_id;
        let game_rating = state.recompute(game_id);
        Ok(Some(EntryWrite {
            entry_id: id,
            game_id,
            game_rating,
            removed_image,
        }))
    }

    async fn delete_entry(
        &self,
        id: EntryId,
        owner: UserId,
    ) -> ServiceResult<Option<EntryWrite>> {
        let mut state = self.state.lock().unwrap();
        state.check_writable()?;
        state.apply_concurrent_image(id);
        if !state.entries.get(&id).is_some_and(|e| e.user_id == owner) {
            return Ok(None);
        }
        let Some(entry) = state.entries.remove(&id) else {
            return Ok(None);
        };
        let game_rating = state.recompute(entry.game_id);
        Ok(Some(EntryWrite {
            entry_id: id,
            game_id: entry.game_id,
            game_rating,
            removed_image: Some(entry.image_path),
        }))
    }

    async fn recompute_rating(&self, game_id: GameId) -> ServiceResult<f64> {
        Ok(self.state.lock().unwrap().recompute(game_id))
    }
}

#[derive(Default)]
struct ImageState {
    files: BTreeMap<String, Vec<u8>>,
    uploads: u64,
    fail_deletes: bool,
}

#[derive(Clone, Default)]
pub struct MemoryImageStore {
    state: Arc<Mutex<ImageState>>,
}

impl MemoryImageStore {
    pub fn stored(&self) -> Vec<String> {
        self.state.lock().unwrap().files.keys().cloned().collect()
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.state.lock().unwrap().fail_deletes = fail;
    }
}

#[async_trait::async_trait]
impl ImageStore for MemoryImageStore {
    async fn save(&self, upload: &ImageUpload) -> ServiceResult<String> {
        let mut state = self.state.lock().unwrap();
        state.uploads += 1;
        let Some(name) =
            stored_image_name(&upload.filename, Utc::now(), &state.uploads.to_string())
        else {
            return ServiceError::bad_request("Invalid file type");
        };
        let path = format!("{}/{}", UPLOAD_DIR, name);
        state.files.insert(path.clone(), upload.bytes.clone());
        Ok(path)
    }

    async fn delete(&self, path: &str) -> ServiceResult<bool> {
        let mut state = self.state.lock().unwrap();
        if state.fail_deletes {
            return ServiceError::internal("permission denied");
        }
        Ok(state.files.remove(path).is_some())
    }
}
