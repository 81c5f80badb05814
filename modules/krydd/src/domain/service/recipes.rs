use std::sync::Arc;

use page_core::Page;
use tracing::{debug, info, instrument, warn};

use crate::contract::model::{Difficulty, NewRecipe, PageRequest, Recipe, RecipePatch};
use crate::domain::error::DomainError;
use crate::domain::repo::RecipesRepository;
use crate::domain::search::EmbeddingIndex;

const ENTITY: &str = "recipe";

/// Filters of the general recipe listing.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub author_id: Option<String>,
    pub cuisine: Option<String>,
    pub difficulty: Option<Difficulty>,
    /// Every tag must be present on the recipe.
    pub dietary_tags: Vec<String>,
}

impl RecipeFilter {
    fn matches(&self, r: &Recipe) -> bool {
        self.difficulty.map_or(true, |d| r.difficulty == d)
            && self
                .dietary_tags
                .iter()
                .all(|tag| r.dietary_tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
    }
}

#[derive(Clone)]
pub struct RecipesService {
    repo: Arc<dyn RecipesRepository>,
    embeddings: Option<EmbeddingIndex>,
}

impl RecipesService {
    /// `embeddings` is `None` when embedding generation is disabled.
    pub fn new(repo: Arc<dyn RecipesRepository>, embeddings: Option<EmbeddingIndex>) -> Self {
        Self { repo, embeddings }
    }

    /// Best-effort: a failed embedding never fails the recipe write.
    async fn reindex(&self, recipe: &Recipe) {
        if let Some(index) = &self.embeddings {
            if let Err(e) = index.index_recipe(recipe).await {
                warn!(recipe_id = %recipe.id, error = %e, "Embedding update failed (continuing)");
            }
        }
    }

    #[instrument(name = "krydd.service.create_recipe", skip_all, fields(title = %input.title))]
    pub async fn create_recipe(&self, input: NewRecipe) -> Result<Recipe, DomainError> {
        info!("Creating new recipe");
        let recipe = self.repo.create(input).await?;
        self.reindex(&recipe).await;
        info!("Successfully created recipe with id={}", recipe.id);
        Ok(recipe)
    }

    #[instrument(name = "krydd.service.get_recipe", skip(self))]
    pub async fn get_recipe(&self, id: &str) -> Result<Recipe, DomainError> {
        debug!("Getting recipe by id");
        self.repo
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))
    }

    #[instrument(name = "krydd.service.update_recipe", skip(self, patch))]
    pub async fn update_recipe(&self, id: &str, patch: RecipePatch) -> Result<Recipe, DomainError> {
        info!("Updating recipe");
        let recipe = self
            .repo
            .update(id, patch)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))?;
        self.reindex(&recipe).await;
        Ok(recipe)
    }

    #[instrument(name = "krydd.service.delete_recipe", skip(self))]
    pub async fn delete_recipe(&self, id: &str) -> Result<(), DomainError> {
        info!("Deleting recipe");
        if !self.repo.remove(id).await? {
            return Err(DomainError::not_found(ENTITY, id));
        }
        if let Some(index) = &self.embeddings {
            if let Err(e) = index.remove(id).await {
                warn!(error = %e, "Embedding removal failed (continuing)");
            }
        }
        Ok(())
    }

    /// List by author, by cuisine, or everything, then drop recipes failing
    /// the difficulty and tag filters. The cursor still follows the store.
    #[instrument(name = "krydd.service.list_recipes", skip(self, page))]
    pub async fn list_recipes(
        &self,
        filter: RecipeFilter,
        page: PageRequest,
    ) -> Result<Page<Recipe>, DomainError> {
        let page = match (&filter.author_id, &filter.cuisine) {
            (Some(author), _) => self.repo.list_by_author(author, page).await?,
            (None, Some(cuisine)) => self.repo.list_by_cuisine(Some(cuisine), page).await?,
            (None, None) => self.repo.list(page).await?,
        };
        Ok(page.retain_items(|r| filter.matches(r)))
    }

    #[instrument(name = "krydd.service.list_recipes_by_author", skip(self, page))]
    pub async fn list_by_author(
        &self,
        author_id: &str,
        page: PageRequest,
    ) -> Result<Page<Recipe>, DomainError> {
        self.repo.list_by_author(author_id, page).await
    }

    /// `cuisine` may be the `UNKNOWN` sentinel, which lists recipes without one.
    #[instrument(name = "krydd.service.list_recipes_by_cuisine", skip(self, page))]
    pub async fn list_by_cuisine(
        &self,
        cuisine: &str,
        page: PageRequest,
    ) -> Result<Page<Recipe>, DomainError> {
        self.repo.list_by_cuisine(Some(cuisine), page).await
    }

    pub async fn batch_get(&self, ids: &[String]) -> Result<Vec<Recipe>, DomainError> {
        self.repo.batch_get(ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::Ingredient;

    fn recipe(difficulty: Difficulty, tags: &[&str]) -> Recipe {
        let now = chrono::Utc::now();
        Recipe {
            id: "r".into(),
            title: "t".into(),
            description: None,
            ingredients: vec![Ingredient::named("x")],
            instructions: vec!["y".into()],
            prep_time: 0,
            cook_time: 0,
            servings: 1,
            difficulty,
            cuisine: None,
            dietary_tags: tags.iter().map(|t| t.to_string()).collect(),
            image_url: None,
            author_id: "u".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn filter_requires_every_tag() {
        let filter = RecipeFilter {
            dietary_tags: vec!["vegan".into(), "gluten-free".into()],
            ..Default::default()
        };
        assert!(filter.matches(&recipe(Difficulty::Easy, &["Vegan", "gluten-free"])));
        assert!(!filter.matches(&recipe(Difficulty::Easy, &["vegan"])));
    }

    #[test]
    fn filter_checks_difficulty() {
        let filter = RecipeFilter {
            difficulty: Some(Difficulty::Hard),
            ..Default::default()
        };
        assert!(filter.matches(&recipe(Difficulty::Hard, &[])));
        assert!(!filter.matches(&recipe(Difficulty::Easy, &[])));
    }
}
