use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::config::SearchConfig;
use crate::contract::model::{Difficulty, PageRequest, Recipe, ScoredRecipe};
use crate::domain::error::DomainError;
use crate::domain::repo::RecipesRepository;
use crate::domain::search::{EmbeddingIndex, Scored};
use crate::domain::validation::ValidationError;

pub const QUERY_MAX_CHARS: usize = 500;
pub const MAX_INGREDIENTS: usize = 20;

#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    pub cuisine: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub max_results: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct SearchResults {
    pub recipes: Vec<ScoredRecipe>,
    pub query: String,
}

#[derive(Clone)]
pub struct SearchService {
    recipes: Arc<dyn RecipesRepository>,
    index: EmbeddingIndex,
    config: SearchConfig,
}

impl SearchService {
    pub fn new(
        recipes: Arc<dyn RecipesRepository>,
        index: EmbeddingIndex,
        config: SearchConfig,
    ) -> Self {
        Self {
            recipes,
            index,
            config,
        }
    }

    fn max_results(&self, requested: Option<usize>) -> Result<usize, DomainError> {
        let n = requested.unwrap_or(self.config.default_max_results);
        if n == 0 || n > self.config.max_results {
            return Err(ValidationError::single(
                "/maxResults",
                format!("must be between 1 and {}", self.config.max_results),
            )
            .into());
        }
        Ok(n)
    }

    /// Load ranked recipes in score order, keeping those accepted by `keep`,
    /// until `max` are collected.
    async fn resolve(
        &self,
        ranked: Vec<Scored>,
        max: usize,
        keep: impl Fn(&Recipe) -> bool,
    ) -> Result<Vec<ScoredRecipe>, DomainError> {
        let scores: HashMap<String, f32> = ranked
            .iter()
            .map(|s| (s.recipe_id.clone(), s.score))
            .collect();
        let mut out = Vec::with_capacity(max);
        for chunk in ranked.chunks(max.max(1)) {
            let ids: Vec<String> = chunk.iter().map(|s| s.recipe_id.clone()).collect();
            for recipe in self.recipes.batch_get(&ids).await? {
                if out.len() == max {
                    break;
                }
                if keep(&recipe) {
                    let similarity_score = scores.get(&recipe.id).copied().unwrap_or_default();
                    out.push(ScoredRecipe {
                        recipe,
                        similarity_score,
                    });
                }
            }
            if out.len() == max {
                break;
            }
        }
        Ok(out)
    }

    /// Semantic search over every stored recipe embedding.
    #[instrument(name = "krydd.service.semantic_search", skip_all, fields(query = %req.query))]
    pub async fn semantic_search(&self, req: SearchRequest) -> Result<SearchResults, DomainError> {
        let chars = req.query.trim().chars().count();
        if chars == 0 || req.query.chars().count() > QUERY_MAX_CHARS {
            return Err(ValidationError::single(
                "/query",
                format!("must be between 1 and {QUERY_MAX_CHARS} characters"),
            )
            .into());
        }
        let max = self.max_results(req.max_results)?;

        let embedding = self.index.embed(&req.query).await?;
        let ranked = self.index.rank(&embedding, None).await?;
        debug!("Ranked {} embeddings", ranked.len());

        let cuisine = req.cuisine.as_deref();
        let recipes = self
            .resolve(ranked, max, |r| {
                cuisine.map_or(true, |c| {
                    r.cuisine
                        .as_deref()
                        .is_some_and(|rc| rc.eq_ignore_ascii_case(c))
                }) && req.difficulty.map_or(true, |d| r.difficulty == d)
            })
            .await?;
        info!("Semantic search returned {} recipes", recipes.len());
        Ok(SearchResults {
            recipes,
            query: req.query,
        })
    }

    /// Rank the most recent recipe candidates against the listed ingredients.
    #[instrument(name = "krydd.service.search_by_ingredients", skip_all, fields(count = ingredients.len()))]
    pub async fn search_by_ingredients(
        &self,
        ingredients: &[String],
        max_results: Option<usize>,
    ) -> Result<Vec<ScoredRecipe>, DomainError> {
        if ingredients.is_empty() || ingredients.len() > MAX_INGREDIENTS {
            return Err(ValidationError::single(
                "/ingredients",
                format!("must contain between 1 and {MAX_INGREDIENTS} items"),
            )
            .into());
        }
        let max = self.max_results(max_results)?;

        let candidates: Vec<String> = self
            .recipes
            .list(PageRequest::first(self.config.ingredient_candidates))
            .await?
            .items
            .into_iter()
            .map(|r| r.id)
            .collect();
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let embedding = self.index.embed(&ingredients.join(" ")).await?;
        let ranked = self.index.rank(&embedding, Some(candidates)).await?;
        self.resolve(ranked, max, |_| true).await
    }

    /// First recipes of the catalogue. `user_id` is accepted for future
    /// personalisation and only logged.
    #[instrument(name = "krydd.service.recommendations", skip(self))]
    pub async fn recommendations(&self, user_id: Option<&str>) -> Result<Vec<Recipe>, DomainError> {
        Ok(self
            .recipes
            .list(PageRequest::first(self.config.recommendations))
            .await?
            .items)
    }
}
