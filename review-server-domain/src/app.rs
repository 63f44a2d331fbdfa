use std::sync::Arc;

use crate::{
    account::{AccountServiceImpl, ArcAccountService, ArcUserRepository},
    entry::{ArcEntryRepository, ArcEntryService, EntryServiceImpl},
    game::{ArcGameRepository, ArcGameService, GameServiceImpl},
    image::ArcImageStore,
};

#[derive(Clone)]
pub struct AppState {
    pub account_service: ArcAccountService,
    pub game_service: ArcGameService,
    pub entry_service: ArcEntryService,
}

pub struct AppSettings {
    /// bcrypt work factor used for new password hashes.
    pub password_hash_cost: u32,
}

pub fn construct_app(
    settings: AppSettings,
    user_repository: ArcUserRepository,
    game_repository: ArcGameRepository,
    entry_repository: ArcEntryRepository,
    image_store: ArcImageStore,
) -> AppState {
    let account_service: ArcAccountService = Arc::new(Box::new(AccountServiceImpl::new(
        user_repository,
        settings.password_hash_cost,
    )));

    let game_service: ArcGameService = Arc::new(Box::new(GameServiceImpl::new(
        game_repository.clone(),
        entry_repository.clone(),
    )));

    let entry_service: ArcEntryService = Arc::new(Box::new(EntryServiceImpl::new(
        entry_repository,
        game_repository,
        image_store,
    )));

    AppState {
        account_service,
        game_service,
        entry_service,
    }
}
