use std::sync::Arc;

use log::info;

use crate::{ServiceError, ServiceResult, UserId, util::validate_credentials};

#[derive(Clone, Debug)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
}

/// The user a request acts on behalf of. Handed explicitly to every
/// operation that needs a logged in user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub username: String,
}

impl From<User> for AuthenticatedUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

pub type ArcUserRepository = Arc<Box<dyn UserRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait UserRepository {
    async fn get_user_by_id(&self, id: UserId) -> ServiceResult<Option<User>>;
    async fn get_user_by_name(&self, username: &str) -> ServiceResult<Option<User>>;
    async fn create_user(&self, username: &str, password_hash: &str) -> ServiceResult<UserId>;
}

pub type ArcAccountService = Arc<Box<dyn AccountService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait AccountService {
    async fn register(&self, username: &str, password: &str) -> ServiceResult<UserId>;
    async fn login(&self, username: &str, password: &str) -> ServiceResult<AuthenticatedUser>;
    async fn find_user(&self, id: UserId) -> ServiceResult<AuthenticatedUser>;
}

pub struct AccountServiceImpl {
    user_repository: ArcUserRepository,
    hash_cost: u32,
}

impl AccountServiceImpl {
    pub fn new(user_repository: ArcUserRepository, hash_cost: u32) -> Self {
        Self {
            user_repository,
            hash_cost,
        }
    }
}

#[async_trait::async_trait]
impl AccountService for AccountServiceImpl {
    async fn register(&self, username: &str, password: &str) -> ServiceResult<UserId> {
        let username = username.trim();
        validate_credentials(username, password)?;

        if self
            .user_repository
            .get_user_by_name(username)
            .await?
            .is_some()
        {
            return ServiceError::not_possible("Username already taken");
        }

        let password_hash = bcrypt::hash(password, self.hash_cost)
            .map_err(|e| ServiceError::Internal(format!("Failed to hash password: {}", e)))?;
        let id = self
            .user_repository
            .create_user(username, &password_hash)
            .await?;

        info!("Registered user {} with id {}", username, id);
        Ok(id)
    }

    async fn login(&self, username: &str, password: &str) -> ServiceResult<AuthenticatedUser> {
        let Some(user) = self
            .user_repository
            .get_user_by_name(username.trim())
            .await?
        else {
            return ServiceError::unauthorized("Invalid username or password");
        };

        let verified = bcrypt::verify(password, &user.password_hash)
            .map_err(|e| ServiceError::Internal(format!("Failed to verify password: {}", e)))?;
        if !verified {
            return ServiceError::unauthorized("Invalid username or password");
        }

        info!("User {} logged in", user.username);
        Ok(user.into())
    }

    async fn find_user(&self, id: UserId) -> ServiceResult<AuthenticatedUser> {
        match self.user_repository.get_user_by_id(id).await? {
            Some(user) => Ok(user.into()),
            None => ServiceError::unauthorized("Unknown user"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::memory::MemoryStore;

    use super::*;

    fn account_service(store: &MemoryStore) -> AccountServiceImpl {
        AccountServiceImpl::new(Arc::new(Box::new(store.clone())), 4 /* bcrypt minimum cost */)
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let store = MemoryStore::default();
        let service = account_service(&store);

        let id = service.register("gamer_01", "secret123").await.unwrap();
        let user = service.login("gamer_01", "secret123").await.unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.username, "gamer_01");

        let stored = store.user(id).unwrap();
        assert_ne!(stored.password_hash, "secret123");

        assert_eq!(service.find_user(id).await.unwrap(), user);
        assert!(matches!(
            service.find_user(id + 1).await,
            Err(ServiceError::Unauthorized(..))
        ));
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let store = MemoryStore::default();
        let service = account_service(&store);
        service.register("gamer_01", "secret123").await.unwrap();

        let wrong_password = service.login("gamer_01", "wrong-password").await;
        let unknown_user = service.login("nobody", "secret123").await;
        match (wrong_password, unknown_user) {
            (Err(ServiceError::Unauthorized(a)), Err(ServiceError::Unauthorized(b))) => {
                assert_eq!(a, b)
            }
            other => panic!("unexpected login results: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_rejects_taken_username() {
        let store = MemoryStore::default();
        let service = account_service(&store);
        service.register("gamer_01", "secret123").await.unwrap();

        assert!(matches!(
            service.register("gamer_01", "another123").await,
            Err(ServiceError::NotPossible(..))
        ));
        assert!(matches!(
            service.register("x", "secret123").await,
            Err(ServiceError::BadRequest(..))
        ));
    }
}
