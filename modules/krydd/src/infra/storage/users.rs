use std::sync::Arc;

use async_trait::async_trait;
use page_core::{LimitCfg, Page};
use table_store::{IndexName, TableStore};
use tracing::instrument;

use crate::contract::model::{PageRequest, User, UserPatch};
use crate::domain::error::DomainError;
use crate::domain::repo::UsersRepository;
use crate::domain::validation::validate_user;

use super::keys::{encode_keys, EntityKey, USER_PARTITION, USER_PREFIX};
use super::{from_item, query_page, to_item, Listing};

const ENTITY: &str = "user";

/// Users in the single table: `PK=USER`, `SK=USER#{email}`.
pub struct TableUsersRepository {
    store: Arc<dyn TableStore>,
    limits: LimitCfg,
}

impl TableUsersRepository {
    pub fn new(store: Arc<dyn TableStore>, limits: LimitCfg) -> Self {
        Self { store, limits }
    }

    async fn put(&self, user: &User) -> Result<(), DomainError> {
        validate_user(user)?;
        let item = to_item(user, &encode_keys(user.into()))?;
        self.store.put(item).await?;
        Ok(())
    }
}

#[async_trait]
impl UsersRepository for TableUsersRepository {
    #[instrument(name = "krydd.repo.users.create", skip_all, fields(email = %user.email))]
    async fn create(&self, user: User) -> Result<User, DomainError> {
        self.put(&user).await?;
        Ok(user)
    }

    #[instrument(name = "krydd.repo.users.get", skip(self))]
    async fn get(&self, email: &str) -> Result<Option<User>, DomainError> {
        let key = encode_keys(EntityKey::User { email }).primary();
        Ok(self
            .store
            .get(&key)
            .await?
            .and_then(|item| from_item(item, ENTITY, validate_user)))
    }

    #[instrument(name = "krydd.repo.users.update", skip(self, patch))]
    async fn update(&self, email: &str, patch: UserPatch) -> Result<Option<User>, DomainError> {
        let Some(mut user) = self.get(email).await? else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            user.name = Some(name);
        }
        self.put(&user).await?;
        Ok(Some(user))
    }

    #[instrument(name = "krydd.repo.users.remove", skip(self))]
    async fn remove(&self, email: &str) -> Result<bool, DomainError> {
        let key = encode_keys(EntityKey::User { email }).primary();
        Ok(self.store.delete(&key).await?.is_some())
    }

    #[instrument(name = "krydd.repo.users.list", skip_all)]
    async fn list(&self, page: PageRequest) -> Result<Page<User>, DomainError> {
        let listing = Listing::new(
            IndexName::Primary,
            USER_PARTITION.to_string(),
            USER_PREFIX,
            self.limits,
        );
        query_page(self.store.as_ref(), listing, page, ENTITY, validate_user).await
    }
}
