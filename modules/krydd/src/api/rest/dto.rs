use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::contract::model::{Days, Difficulty, PageRequest, Recipe, ScoredRecipe};
use crate::domain::service::assistant::{ChatContext, MealPlanPreferences, SuggestPreferences};
use crate::domain::service::{RecipeFilter, SearchRequest};

// ---------- query strings ----------

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Page size; clamped to the listing's maximum.
    pub limit: Option<u64>,
    /// `nextCursor` of the previous page.
    pub cursor: Option<String>,
}

impl From<ListQuery> for PageRequest {
    fn from(q: ListQuery) -> Self {
        PageRequest::new(q.limit, q.cursor)
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RecipeListQuery {
    pub author_id: Option<String>,
    pub cuisine: Option<String>,
    pub difficulty: Option<Difficulty>,
    /// Comma-separated; every tag must be present.
    pub dietary_tags: Option<String>,
    pub limit: Option<u64>,
    pub cursor: Option<String>,
}

impl RecipeListQuery {
    pub fn into_parts(self) -> (RecipeFilter, PageRequest) {
        let dietary_tags = self
            .dietary_tags
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let filter = RecipeFilter {
            author_id: self.author_id,
            cuisine: self.cuisine,
            difficulty: self.difficulty,
            dietary_tags,
        };
        (filter, PageRequest::new(self.limit, self.cursor))
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MealPlanListQuery {
    pub user_id: Option<String>,
    pub limit: Option<u64>,
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserIdQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TextSearchQuery {
    pub q: Option<String>,
    pub max_results: Option<usize>,
}

// ---------- request bodies ----------

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDaysReq {
    #[schema(value_type = std::collections::BTreeMap<String, crate::contract::model::DayMeals>)]
    pub days: Days,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchReq {
    pub query: String,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub max_results: Option<usize>,
}

impl From<SearchReq> for SearchRequest {
    fn from(r: SearchReq) -> Self {
        SearchRequest {
            query: r.query,
            cuisine: r.cuisine,
            difficulty: r.difficulty,
            max_results: r.max_results,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientSearchReq {
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub max_results: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatContextDto {
    #[serde(default)]
    pub recent_recipes: Vec<String>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub preferences: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatReq {
    pub message: String,
    #[serde(default)]
    pub context: Option<ChatContextDto>,
}

impl ChatReq {
    pub fn context(&mut self) -> ChatContext {
        let ctx = self.context.take().unwrap_or_default();
        ChatContext {
            recent_recipes: ctx.recent_recipes,
            preferences: ctx.preferences,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatSearchReq {
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestPreferencesDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
}

impl From<SuggestPreferencesDto> for SuggestPreferences {
    fn from(p: SuggestPreferencesDto) -> Self {
        SuggestPreferences {
            cuisine: p.cuisine,
            difficulty: p.difficulty,
            dietary_restrictions: p.dietary_restrictions,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestReq {
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub preferences: Option<SuggestPreferencesDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanPreferencesDto {
    #[serde(default)]
    pub cuisines: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories_per_day: Option<u32>,
    #[serde(default = "default_meals_per_day")]
    pub meals_per_day: u8,
}

fn default_meals_per_day() -> u8 {
    MealPlanPreferences::default().meals_per_day
}

impl Default for MealPlanPreferencesDto {
    fn default() -> Self {
        MealPlanPreferences::default().into()
    }
}

impl From<MealPlanPreferences> for MealPlanPreferencesDto {
    fn from(p: MealPlanPreferences) -> Self {
        Self {
            cuisines: p.cuisines,
            dietary_restrictions: p.dietary_restrictions,
            calories_per_day: p.calories_per_day,
            meals_per_day: p.meals_per_day,
        }
    }
}

impl From<MealPlanPreferencesDto> for MealPlanPreferences {
    fn from(p: MealPlanPreferencesDto) -> Self {
        Self {
            cuisines: p.cuisines,
            dietary_restrictions: p.dietary_restrictions,
            calories_per_day: p.calories_per_day,
            meals_per_day: p.meals_per_day,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanReq {
    #[serde(default)]
    pub preferences: Option<MealPlanPreferencesDto>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubstitutionsReq {
    pub ingredient: String,
    #[serde(default)]
    pub dietary_restriction: Option<String>,
}

// ---------- response bodies ----------

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultsDto {
    pub recipes: Vec<ScoredRecipe>,
    pub query: String,
    pub total_results: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientResultsDto {
    pub recipes: Vec<ScoredRecipe>,
    pub query: Vec<String>,
    pub total_results: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsDto {
    pub recipes: Vec<Recipe>,
    pub recommendations: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatReplyDto {
    pub response: String,
    pub message_id: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatSearchDto {
    pub recipes: Vec<Recipe>,
    pub summary: String,
    pub search_query: String,
    pub total_results: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsDto {
    pub suggestions: String,
    pub based_on_ingredients: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanSuggestionDto {
    pub meal_plan: String,
    pub preferences: MealPlanPreferencesDto,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubstitutionsDto {
    pub ingredient: String,
    pub substitutions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dietary_restriction: Option<String>,
}
