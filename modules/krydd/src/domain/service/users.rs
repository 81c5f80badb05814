use std::sync::Arc;

use page_core::Page;
use tracing::{debug, info, instrument};

use crate::contract::model::{NewUser, PageRequest, User, UserPatch};
use crate::domain::error::DomainError;
use crate::domain::repo::UsersRepository;

const ENTITY: &str = "user";

#[derive(Clone)]
pub struct UsersService {
    repo: Arc<dyn UsersRepository>,
}

impl UsersService {
    pub fn new(repo: Arc<dyn UsersRepository>) -> Self {
        Self { repo }
    }

    #[instrument(name = "krydd.service.create_user", skip_all, fields(email = %new_user.email))]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Creating new user");
        // Store writes are unconditional; uniqueness is checked here.
        if self.repo.get(&new_user.email).await?.is_some() {
            return Err(DomainError::already_exists(ENTITY, new_user.email));
        }
        let user = self.repo.create(new_user).await?;
        info!("Successfully created user");
        Ok(user)
    }

    #[instrument(name = "krydd.service.get_user", skip(self))]
    pub async fn get_user(&self, email: &str) -> Result<User, DomainError> {
        debug!("Getting user by email");
        self.repo
            .get(email)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, email))
    }

    #[instrument(name = "krydd.service.update_user", skip(self, patch))]
    pub async fn update_user(&self, email: &str, patch: UserPatch) -> Result<User, DomainError> {
        info!("Updating user");
        self.repo
            .update(email, patch)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, email))
    }

    #[instrument(name = "krydd.service.delete_user", skip(self))]
    pub async fn delete_user(&self, email: &str) -> Result<(), DomainError> {
        info!("Deleting user");
        if !self.repo.remove(email).await? {
            return Err(DomainError::not_found(ENTITY, email));
        }
        Ok(())
    }

    #[instrument(name = "krydd.service.list_users", skip_all)]
    pub async fn list_users(&self, page: PageRequest) -> Result<Page<User>, DomainError> {
        let page = self.repo.list(page).await?;
        debug!("Listed {} users", page.items.len());
        Ok(page)
    }
}
