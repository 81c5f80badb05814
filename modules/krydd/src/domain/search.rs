//! Vector search: embedding text, cosine similarity and the embedding index
//! kept in the object store.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::contract::model::{EmbeddingRecord, Recipe};
use crate::domain::error::DomainError;
use crate::domain::ports::{Clock, LanguageModel, ObjectStore};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("vector dimensions differ: {left} vs {right}")]
pub struct DimensionMismatch {
    pub left: usize,
    pub right: usize,
}

/// Cosine similarity of two equal-length vectors. A zero vector has
/// similarity 0.0 with everything.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, DimensionMismatch> {
    if a.len() != b.len() {
        return Err(DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Text embedded for a recipe.
pub fn recipe_embedding_text(recipe: &Recipe) -> String {
    let ingredients: Vec<&str> = recipe.ingredients.iter().map(|i| i.name.as_str()).collect();
    format!(
        "Recipe: {}. Description: {}. Ingredients: {}",
        recipe.title,
        recipe.description.as_deref().unwrap_or(""),
        ingredients.join(", ")
    )
}

/// A recipe id with its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    pub recipe_id: String,
    pub score: f32,
}

/// Sort by descending score and keep the best `k`. Ties keep input order.
pub fn top_k(mut scored: Vec<Scored>, k: usize) -> Vec<Scored> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(k);
    scored
}

/// Embedding records stored as `{prefix}/{recipeId}.json`.
#[derive(Clone)]
pub struct EmbeddingIndex {
    objects: Arc<dyn ObjectStore>,
    model: Arc<dyn LanguageModel>,
    clock: Arc<dyn Clock>,
    prefix: String,
}

impl EmbeddingIndex {
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        model: Arc<dyn LanguageModel>,
        clock: Arc<dyn Clock>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            objects,
            model,
            clock,
            prefix: prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn object_key(&self, recipe_id: &str) -> String {
        format!("{}/{recipe_id}.json", self.prefix)
    }

    fn list_prefix(&self) -> String {
        format!("{}/", self.prefix)
    }

    #[instrument(name = "krydd.search.embed", skip_all, fields(chars = text.len()))]
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        self.model.embed(text).await.map_err(DomainError::model)
    }

    /// Embed `recipe` and store its record, replacing any previous one.
    #[instrument(name = "krydd.search.index_recipe", skip_all, fields(recipe_id = %recipe.id))]
    pub async fn index_recipe(&self, recipe: &Recipe) -> Result<(), DomainError> {
        let embedding = self.embed(&recipe_embedding_text(recipe)).await?;
        let record = EmbeddingRecord {
            recipe_id: recipe.id.clone(),
            embedding,
            created_at: self.clock.now(),
        };
        let body = serde_json::to_vec(&record).map_err(DomainError::objects)?;
        self.objects
            .put(&self.object_key(&recipe.id), body)
            .await
            .map_err(DomainError::objects)?;
        debug!("embedding stored");
        Ok(())
    }

    pub async fn remove(&self, recipe_id: &str) -> Result<bool, DomainError> {
        self.objects
            .delete(&self.object_key(recipe_id))
            .await
            .map_err(DomainError::objects)
    }

    pub async fn get(&self, recipe_id: &str) -> Result<Option<EmbeddingRecord>, DomainError> {
        let Some(body) = self
            .objects
            .get(&self.object_key(recipe_id))
            .await
            .map_err(DomainError::objects)?
        else {
            return Ok(None);
        };
        match serde_json::from_slice(&body) {
            Ok(record) => Ok(Some(record)),
            Err(error) => {
                warn!(corrupt = true, recipe_id, %error, "unreadable embedding record");
                Ok(None)
            }
        }
    }

    /// Ids of every recipe with a stored embedding.
    pub async fn indexed_ids(&self) -> Result<Vec<String>, DomainError> {
        let prefix = self.list_prefix();
        let keys = self
            .objects
            .list(&prefix)
            .await
            .map_err(DomainError::objects)?;
        Ok(keys
            .iter()
            .filter_map(|k| k.strip_prefix(&prefix)?.strip_suffix(".json"))
            .filter(|id| !id.is_empty() && !id.contains('/'))
            .map(str::to_string)
            .collect())
    }

    /// Rank `candidates` (or every indexed recipe when `None`) by similarity
    /// to `query`. Records with another dimension are skipped.
    #[instrument(name = "krydd.search.rank", skip_all)]
    pub async fn rank(
        &self,
        query: &[f32],
        candidates: Option<Vec<String>>,
    ) -> Result<Vec<Scored>, DomainError> {
        let ids = match candidates {
            Some(ids) => ids,
            None => self.indexed_ids().await?,
        };
        let records = futures::future::join_all(ids.iter().map(|id| self.get(id))).await;

        let mut scored = Vec::with_capacity(ids.len());
        for record in records {
            let Some(record) = record? else { continue };
            match cosine_similarity(query, &record.embedding) {
                Ok(score) => scored.push(Scored {
                    recipe_id: record.recipe_id,
                    score,
                }),
                Err(e) => warn!(recipe_id = %record.recipe_id, error = %e, "skipping embedding"),
            }
        }
        Ok(top_k(scored, usize::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_have_similarity_one() {
        let v = [0.3, -1.2, 4.0];
        let s = cosine_similarity(&v, &v).unwrap();
        assert!((s - 1.0).abs() < 1e-6, "{s}");
    }

    #[test]
    fn orthogonal_vectors_have_similarity_zero() {
        let s = cosine_similarity(&[1.0, 0.0], &[0.0, 2.0]).unwrap();
        assert!(s.abs() < 1e-6);
    }

    #[test]
    fn opposite_vectors_have_similarity_minus_one() {
        let s = cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]).unwrap();
        assert!((s + 1.0).abs() < 1e-6);
    }

    #[test]
    fn mismatched_lengths_fail() {
        assert_eq!(
            cosine_similarity(&[1.0, 2.0], &[1.0]),
            Err(DimensionMismatch { left: 2, right: 1 })
        );
    }

    #[test]
    fn zero_vector_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), Ok(0.0));
    }

    #[test]
    fn top_k_orders_descending() {
        let scored = vec![
            Scored { recipe_id: "a".into(), score: 0.1 },
            Scored { recipe_id: "b".into(), score: 0.9 },
            Scored { recipe_id: "c".into(), score: 0.5 },
        ];
        let ids: Vec<_> = top_k(scored, 2).into_iter().map(|s| s.recipe_id).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn embedding_text_lists_ingredients() {
        use crate::contract::model::{Difficulty, Ingredient};
        let now = chrono::Utc::now();
        let recipe = Recipe {
            id: "r1".into(),
            title: "Soup".into(),
            description: Some("Warm".into()),
            ingredients: vec![Ingredient::named("Salt"), Ingredient::named("Water")],
            instructions: vec!["Boil".into()],
            prep_time: 0,
            cook_time: 0,
            servings: 1,
            difficulty: Difficulty::Easy,
            cuisine: None,
            dietary_tags: vec![],
            image_url: None,
            author_id: "u1".into(),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(
            recipe_embedding_text(&recipe),
            "Recipe: Soup. Description: Warm. Ingredients: Salt, Water"
        );
    }
}
