use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use page_core::{LimitCfg, Page};
use table_store::{IndexName, PrimaryKey, TableStore};
use tracing::{debug, instrument};

use crate::contract::model::{NewRecipe, PageRequest, Recipe, RecipePatch};
use crate::domain::error::DomainError;
use crate::domain::ports::{Clock, IdGenerator};
use crate::domain::repo::RecipesRepository;
use crate::domain::validation::validate_recipe;

use super::keys::{
    author_partition, cuisine_partition, encode_keys, recipe_sk, RECIPE_PARTITION, RECIPE_PREFIX,
};
use super::{from_item, next_updated_at, query_page, to_item, Listing};

const ENTITY: &str = "recipe";

/// Recipes in the single table.
///
/// Primary `RECIPE / RECIPE#{id}`, GSI1 by author, GSI2 by cuisine ordered by
/// creation time.
pub struct TableRecipesRepository {
    store: Arc<dyn TableStore>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    limits: LimitCfg,
}

impl TableRecipesRepository {
    pub fn new(
        store: Arc<dyn TableStore>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        limits: LimitCfg,
    ) -> Self {
        Self {
            store,
            clock,
            ids,
            limits,
        }
    }

    async fn put(&self, recipe: &Recipe) -> Result<(), DomainError> {
        validate_recipe(recipe)?;
        let item = to_item(recipe, &encode_keys(recipe.into()))?;
        self.store.put(item).await?;
        Ok(())
    }

    async fn list_on(
        &self,
        index: IndexName,
        partition: String,
        page: PageRequest,
    ) -> Result<Page<Recipe>, DomainError> {
        let listing = Listing::new(index, partition, RECIPE_PREFIX, self.limits);
        query_page(self.store.as_ref(), listing, page, ENTITY, validate_recipe).await
    }
}

#[async_trait]
impl RecipesRepository for TableRecipesRepository {
    #[instrument(name = "krydd.repo.recipes.create", skip_all, fields(author_id = %input.author_id))]
    async fn create(&self, input: NewRecipe) -> Result<Recipe, DomainError> {
        let now = self.clock.now();
        let recipe = Recipe {
            id: self.ids.new_id(),
            title: input.title,
            description: input.description,
            ingredients: input.ingredients,
            instructions: input.instructions,
            prep_time: input.prep_time,
            cook_time: input.cook_time,
            servings: input.servings,
            difficulty: input.difficulty,
            cuisine: input.cuisine,
            dietary_tags: input.dietary_tags,
            image_url: input.image_url,
            author_id: input.author_id,
            created_at: now,
            updated_at: now,
        };
        self.put(&recipe).await?;
        debug!(id = %recipe.id, "recipe stored");
        Ok(recipe)
    }

    #[instrument(name = "krydd.repo.recipes.get", skip(self))]
    async fn get(&self, id: &str) -> Result<Option<Recipe>, DomainError> {
        let key = PrimaryKey::new(RECIPE_PARTITION, recipe_sk(id));
        Ok(self
            .store
            .get(&key)
            .await?
            .and_then(|item| from_item(item, ENTITY, validate_recipe)))
    }

    #[instrument(name = "krydd.repo.recipes.update", skip(self, patch))]
    async fn update(&self, id: &str, patch: RecipePatch) -> Result<Option<Recipe>, DomainError> {
        let Some(mut recipe) = self.get(id).await? else {
            return Ok(None);
        };
        let previous = recipe.updated_at;
        patch.apply_to(&mut recipe);
        recipe.updated_at = next_updated_at(self.clock.now(), previous);
        // Primary key depends on the id only; GSI keys are re-derived by `put`.
        self.put(&recipe).await?;
        Ok(Some(recipe))
    }

    #[instrument(name = "krydd.repo.recipes.remove", skip(self))]
    async fn remove(&self, id: &str) -> Result<bool, DomainError> {
        let key = PrimaryKey::new(RECIPE_PARTITION, recipe_sk(id));
        Ok(self.store.delete(&key).await?.is_some())
    }

    #[instrument(name = "krydd.repo.recipes.list", skip_all)]
    async fn list(&self, page: PageRequest) -> Result<Page<Recipe>, DomainError> {
        self.list_on(IndexName::Primary, RECIPE_PARTITION.to_string(), page)
            .await
    }

    #[instrument(name = "krydd.repo.recipes.list_by_author", skip(self, page))]
    async fn list_by_author(
        &self,
        author_id: &str,
        page: PageRequest,
    ) -> Result<Page<Recipe>, DomainError> {
        self.list_on(IndexName::Gsi1, author_partition(author_id), page)
            .await
    }

    #[instrument(name = "krydd.repo.recipes.list_by_cuisine", skip(self, page))]
    async fn list_by_cuisine(
        &self,
        cuisine: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Recipe>, DomainError> {
        self.list_on(IndexName::Gsi2, cuisine_partition(cuisine), page)
            .await
    }

    #[instrument(name = "krydd.repo.recipes.batch_get", skip_all, fields(count = ids.len()))]
    async fn batch_get(&self, ids: &[String]) -> Result<Vec<Recipe>, DomainError> {
        let lookups = ids.iter().map(|id| self.get(id));
        let mut found = Vec::with_capacity(ids.len());
        for res in join_all(lookups).await {
            if let Some(recipe) = res? {
                found.push(recipe);
            }
        }
        Ok(found)
    }
}
