use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;
use review_core::{StarRating, upload::is_allowed_image};

use crate::{
    EntryId, GameId, ServiceError, ServiceResult, UserId,
    account::AuthenticatedUser,
    game::ArcGameRepository,
    image::{ArcImageStore, ImageUpload, discard_image},
};

#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub id: EntryId,
    pub user_id: UserId,
    pub game_id: GameId,
    pub title: String,
    pub description: String,
    pub rating: i64,
    pub image_path: String,
    pub created_at: DateTime<Utc>,
}

/// An entry together with its author's username.
#[derive(Clone, Debug, PartialEq)]
pub struct EntryView {
    pub entry: Entry,
    pub username: String,
}

#[derive(Clone, Debug)]
pub struct NewEntry {
    pub user_id: UserId,
    pub game_id: GameId,
    pub title: String,
    pub description: String,
    pub rating: StarRating,
    pub image_path: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct EntryUpdate {
    pub title: String,
    pub description: String,
    pub rating: StarRating,
    /// Replacement image, `None` keeps the current one.
    pub image_path: Option<String>,
}

/// Result of a write to the entry set of a game.
#[derive(Clone, Debug, PartialEq)]
pub struct EntryWrite {
    pub entry_id: EntryId,
    pub game_id: GameId,
    /// The game's cached rating after recomputation.
    pub game_rating: f64,
    /// Image the write detached from the entry, read within the write.
    pub removed_image: Option<String>,
}

pub type ArcEntryRepository = Arc<Box<dyn EntryRepository + Send + Sync + 'static>>;

/// Storage for entries. Every write recomputes the owning game's rating
/// within the same transaction as the entry change.
#[async_trait::async_trait]
pub trait EntryRepository {
    async fn get_entry(&self, id: EntryId) -> ServiceResult<Option<Entry>>;
    /// Entries of a game, newest first.
    async fn get_entries_for_game(&self, game_id: GameId) -> ServiceResult<Vec<EntryView>>;
    async fn create_entry(&self, entry: &NewEntry) -> ServiceResult<EntryWrite>;
    /// `None` if no entry with this id is owned by `owner`. Reports the
    /// previous image when `update` replaces it.
    async fn update_entry(
        &self,
        id: EntryId,
        owner: UserId,
        update: &EntryUpdate,
    ) -> ServiceResult<Option<EntryWrite>>;
    /// `None` if no entry with this id is owned by `owner`. Reports the
    /// deleted entry's image.
    async fn delete_entry(&self, id: EntryId, owner: UserId)
    -> ServiceResult<Option<EntryWrite>>;
    /// Rewrites the cached rating of a game from its current entries. An
    /// unknown game is left alone and averages to `0`.
    async fn recompute_rating(&self, game_id: GameId) -> ServiceResult<f64>;
}

#[derive(Clone, Debug, Default)]
pub struct EntryForm {
    pub game_id: Option<GameId>,
    pub title: String,
    pub description: String,
    pub rating: Option<i64>,
}

#[derive(Clone, Debug, Default)]
pub struct EntryEdit {
    pub title: String,
    pub description: String,
    pub rating: Option<i64>,
}

pub type ArcEntryService = Arc<Box<dyn EntryService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait EntryService {
    async fn create_entry(
        &self,
        user: &AuthenticatedUser,
        form: EntryForm,
        image: Option<ImageUpload>,
    ) -> ServiceResult<EntryWrite>;
    async fn update_entry(
        &self,
        user: &AuthenticatedUser,
        entry_id: EntryId,
        edit: EntryEdit,
        image: Option<ImageUpload>,
    ) -> ServiceResult<EntryWrite>;
    async fn delete_entry(
        &self,
        user: &AuthenticatedUser,
        entry_id: EntryId,
    ) -> ServiceResult<EntryWrite>;
}

pub struct EntryServiceImpl {
    entry_repository: ArcEntryRepository,
    game_repository: ArcGameRepository,
    image_store: ArcImageStore,
}

impl EntryServiceImpl {
    pub fn new(
        entry_repository: ArcEntryRepository,
        game_repository: ArcGameRepository,
        image_store: ArcImageStore,
    ) -> Self {
        Self {
            entry_repository,
            game_repository,
            image_store,
        }
    }

    fn validate_rating(rating: Option<i64>) -> ServiceResult<StarRating> {
        let Some(rating) = rating else {
            return ServiceError::bad_request("No rating given");
        };
        match StarRating::new(rating) {
            Some(rating) => Ok(rating),
            None => ServiceError::bad_request("Rating must be between 1 and 5"),
        }
    }

    fn validate_image(image: &ImageUpload) -> ServiceResult<()> {
        if !is_allowed_image(&image.filename) {
            return ServiceError::bad_request("Invalid file type");
        }
        Ok(())
    }

    /// Tells a missing entry apart from someone else's. The write itself
    /// filters on the owner again.
    async fn check_owner(&self, user: &AuthenticatedUser, entry_id: EntryId) -> ServiceResult<()> {
        let Some(entry) = self.entry_repository.get_entry(entry_id).await? else {
            return ServiceError::not_found("Entry not found");
        };
        if entry.user_id != user.id {
            return ServiceError::forbidden("You can only change your own entries");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl EntryService for EntryServiceImpl {
    async fn create_entry(
        &self,
        user: &AuthenticatedUser,
        form: EntryForm,
        image: Option<ImageUpload>,
    ) -> ServiceResult<EntryWrite> {
        let Some(game_id) = form.game_id else {
            return ServiceError::bad_request("No game selected");
        };
        let rating = Self::validate_rating(form.rating)?;
        let Some(image) = image else {
            return ServiceError::bad_request("No image selected");
        };
        Self::validate_image(&image)?;

        if self.game_repository.get_game(game_id).await?.is_none() {
            return ServiceError::not_found("Game not found");
        }

        let image_path = self.image_store.save(&image).await?;
        let new_entry = NewEntry {
            user_id: user.id,
            game_id,
            title: form.title,
            description: form.description,
            rating,
            image_path: image_path.clone(),
            created_at: Utc::now(),
        };
        let write = match self.entry_repository.create_entry(&new_entry).await {
            Ok(write) => write,
            Err(e) => {
                discard_image(&self.image_store, &image_path).await;
                return Err(e);
            }
        };

        info!(
            "User {} added entry {} to game {}, rating is now {}",
            user.username, write.entry_id, game_id, write.game_rating
        );
        Ok(write)
    }

    async fn update_entry(
        &self,
        user: &AuthenticatedUser,
        entry_id: EntryId,
        edit: EntryEdit,
        image: Option<ImageUpload>,
    ) -> ServiceResult<EntryWrite> {
        self.check_owner(user, entry_id).await?;
        let rating = Self::validate_rating(edit.rating)?;
        if let Some(image) = &image {
            Self::validate_image(image)?;
        }

        let new_image_path = match &image {
            Some(image) => Some(self.image_store.save(image).await?),
            None => None,
        };
        let update = EntryUpdate {
            title: edit.title,
            description: edit.description,
            rating,
            image_path: new_image_path.clone(),
        };

        let result = self
            .entry_repository
            .update_entry(entry_id, user.id, &update)
            .await;
        let write = match result {
            Ok(Some(write)) => write,
            Ok(None) => {
                if let Some(path) = &new_image_path {
                    discard_image(&self.image_store, path).await;
                }
                return ServiceError::not_found("Entry not found");
            }
            Err(e) => {
                if let Some(path) = &new_image_path {
                    discard_image(&self.image_store, path).await;
                }
                return Err(e);
            }
        };

        if let Some(old_image) = &write.removed_image {
            discard_image(&self.image_store, old_image).await;
        }

        info!(
            "User {} updated entry {} of game {}, rating is now {}",
            user.username, entry_id, write.game_id, write.game_rating
        );
        Ok(write)
    }

    async fn delete_entry(
        &self,
        user: &AuthenticatedUser,
        entry_id: EntryId,
    ) -> ServiceResult<EntryWrite> {
        self.check_owner(user, entry_id).await?;

        let Some(write) = self.entry_repository.delete_entry(entry_id, user.id).await? else {
            return ServiceError::not_found("Entry not found");
        };
        if let Some(image) = &write.removed_image {
            discard_image(&self.image_store, image).await;
        }

        info!(
            "User {} deleted entry {} of game {}, rating is now {}",
            user.username, entry_id, write.game_id, write.game_rating
        );
        Ok(write)
    }
}
