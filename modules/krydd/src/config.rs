use page_core::LimitCfg;
use serde::{Deserialize, Serialize};

/// Configuration for the krydd module
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KryddConfig {
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

/// Default and maximum page size per listing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaginationConfig {
    #[serde(default = "default_users_limits")]
    pub users: LimitCfg,
    #[serde(default = "default_recipes_limits")]
    pub recipes: LimitCfg,
    #[serde(default = "default_meal_plans_by_user_limits")]
    pub meal_plans_by_user: LimitCfg,
    #[serde(default = "default_meal_plans_by_week_limits")]
    pub meal_plans_by_week: LimitCfg,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            users: default_users_limits(),
            recipes: default_recipes_limits(),
            meal_plans_by_user: default_meal_plans_by_user_limits(),
            meal_plans_by_week: default_meal_plans_by_week_limits(),
        }
    }
}

fn default_users_limits() -> LimitCfg {
    LimitCfg::new(50, 1000)
}

fn default_recipes_limits() -> LimitCfg {
    LimitCfg::new(20, 100)
}

fn default_meal_plans_by_user_limits() -> LimitCfg {
    LimitCfg::new(4, 52)
}

fn default_meal_plans_by_week_limits() -> LimitCfg {
    LimitCfg::new(100, 1000)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingsConfig {
    /// Object key prefix of embedding records.
    #[serde(default = "default_embeddings_prefix")]
    pub prefix: String,
    /// Generate embeddings on recipe create/update.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            prefix: default_embeddings_prefix(),
            enabled: true,
        }
    }
}

fn default_embeddings_prefix() -> String {
    "embeddings".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    #[serde(default = "default_max_results")]
    pub default_max_results: usize,
    #[serde(default = "default_max_results_cap")]
    pub max_results: usize,
    /// Recipes considered by ingredient search.
    #[serde(default = "default_candidate_limit")]
    pub ingredient_candidates: u64,
    /// Recipes returned by the recommendations endpoint.
    #[serde(default = "default_recommendations")]
    pub recommendations: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_max_results: default_max_results(),
            max_results: default_max_results_cap(),
            ingredient_candidates: default_candidate_limit(),
            recommendations: default_recommendations(),
        }
    }
}

fn default_max_results() -> usize {
    10
}

fn default_max_results_cap() -> usize {
    50
}

fn default_candidate_limit() -> u64 {
    100
}

fn default_recommendations() -> u64 {
    10
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssistantConfig {
    #[serde(default = "default_chat_max_tokens")]
    pub chat_max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_summary_max_tokens")]
    pub summary_max_tokens: u32,
    #[serde(default = "default_summary_temperature")]
    pub summary_temperature: f32,
    /// Recipes listed in the chat context.
    #[serde(default = "default_context_recipes")]
    pub context_recipes: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            chat_max_tokens: default_chat_max_tokens(),
            temperature: default_temperature(),
            summary_max_tokens: default_summary_max_tokens(),
            summary_temperature: default_summary_temperature(),
            context_recipes: default_context_recipes(),
        }
    }
}

fn default_chat_max_tokens() -> u32 {
    2048
}

fn default_temperature() -> f32 {
    0.7
}

fn default_summary_max_tokens() -> u32 {
    512
}

fn default_summary_temperature() -> f32 {
    0.5
}

fn default_context_recipes() -> usize {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg: KryddConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, KryddConfig::default());
        assert_eq!(cfg.pagination.recipes, LimitCfg::new(20, 100));
        assert_eq!(cfg.pagination.meal_plans_by_user, LimitCfg::new(4, 52));
        assert_eq!(cfg.embeddings.prefix, "embeddings");
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let cfg: KryddConfig = serde_json::from_value(serde_json::json!({
            "pagination": { "recipes": { "default": 5, "max": 10 } },
            "search": { "max_results": 20 }
        }))
        .unwrap();
        assert_eq!(cfg.pagination.recipes, LimitCfg::new(5, 10));
        assert_eq!(cfg.pagination.users, LimitCfg::new(50, 1000));
        assert_eq!(cfg.search.max_results, 20);
        assert_eq!(cfg.search.default_max_results, 10);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res: Result<KryddConfig, _> = serde_json::from_str(r#"{"bogus": 1}"#);
        assert!(res.is_err());
    }
}
