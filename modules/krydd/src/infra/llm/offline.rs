use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;

use crate::domain::ports::{Completion, Invocation, LanguageModel, ModelError};

/// Deterministic stand-in for the model service, used by `--mock` runs and
/// tests. Embeddings are hashed bags of lowercase words, so texts sharing
/// words score higher than unrelated ones.
pub struct OfflineModel {
    dimensions: usize,
}

impl OfflineModel {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn bucket(&self, word: &str) -> usize {
        let mut h = DefaultHasher::new();
        word.hash(&mut h);
        (h.finish() % self.dimensions as u64) as usize
    }
}

#[async_trait]
impl LanguageModel for OfflineModel {
    async fn invoke(&self, req: Invocation) -> Result<Completion, ModelError> {
        let first_line = req.prompt.lines().next().unwrap_or_default();
        Ok(Completion {
            text: format!("[offline model] {first_line}"),
            tool_calls: Vec::new(),
        })
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError> {
        let mut v = vec![0.0f32; self.dimensions];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            v[self.bucket(&word.to_lowercase())] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search::cosine_similarity;

    #[tokio::test]
    async fn shared_words_score_higher() {
        let model = OfflineModel::new(256);
        let query = model.embed("tomato soup").await.unwrap();
        let soup = model.embed("Recipe: Tomato Soup. Ingredients: tomato, salt").await.unwrap();
        let cake = model.embed("Recipe: Chocolate cake. Ingredients: flour, cocoa").await.unwrap();
        assert_eq!(query.len(), 256);
        assert!(
            cosine_similarity(&query, &soup).unwrap() > cosine_similarity(&query, &cake).unwrap()
        );
    }

    #[tokio::test]
    async fn invoke_echoes_first_prompt_line() {
        let model = OfflineModel::new(8);
        let reply = model.invoke(Invocation::new("hello\nworld")).await.unwrap();
        assert_eq!(reply.text, "[offline model] hello");
    }
}
