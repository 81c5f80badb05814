//! Recipe assistant: prompt construction around the language model.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::config::AssistantConfig;
use crate::contract::model::Recipe;
use crate::domain::error::DomainError;
use crate::domain::ports::{IdGenerator, Invocation, LanguageModel};
use crate::domain::repo::RecipesRepository;
use crate::domain::service::search::{SearchRequest, SearchService};
use crate::domain::validation::ValidationError;

pub const MESSAGE_MAX_CHARS: usize = 2000;
const CHAT_SEARCH_RESULTS: usize = 10;

const CHAT_SYSTEM: &str = "You are Krydd, a helpful recipe assistant.

Your expertise includes:
- Finding recipes based on ingredients
- Providing cooking tips and substitutions
- Creating meal plans
- Answering recipe questions

Be friendly, encouraging, and provide practical advice.
When suggesting recipes, be specific with measurements and instructions.";

const SUGGEST_SYSTEM: &str = "You are Krydd, a helpful recipe assistant.
Provide recipe suggestions with:
- Recipe name
- Brief description
- Key ingredients needed (besides the ones listed)
- Estimated cooking time
- Difficulty level

Format as a numbered list with clear sections.";

const MEAL_PLAN_SYSTEM: &str = "You are Krydd, a meal planning assistant.
Create a diverse weekly meal plan that:
- Varies cuisine types throughout the week
- Considers dietary restrictions
- Balances nutrition
- Includes breakfast, lunch, dinner (and snacks if 4+ meals)

Format by day with meal names and brief descriptions.";

const SUBSTITUTIONS_SYSTEM: &str = "You are Krydd, a recipe assistant.
Provide 3-5 substitution options with:
- The substitute ingredient
- Conversion ratio
- When it works best

Format as a concise list.";

#[derive(Debug, Clone, Default)]
pub struct ChatContext {
    /// Recipe ids the user has been looking at.
    pub recent_recipes: Vec<String>,
    pub preferences: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct ChatReply {
    pub response: String,
    pub message_id: String,
}

#[derive(Debug, Clone)]
pub struct ChatSearchReply {
    pub recipes: Vec<Recipe>,
    pub summary: String,
    pub search_query: String,
}

#[derive(Debug, Clone, Default)]
pub struct SuggestPreferences {
    pub cuisine: Option<String>,
    pub difficulty: Option<String>,
    pub dietary_restrictions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MealPlanPreferences {
    pub cuisines: Vec<String>,
    pub dietary_restrictions: Vec<String>,
    pub calories_per_day: Option<u32>,
    pub meals_per_day: u8,
}

impl MealPlanPreferences {
    pub const MIN_MEALS: u8 = 2;
    pub const MAX_MEALS: u8 = 6;
}

impl Default for MealPlanPreferences {
    fn default() -> Self {
        Self {
            cuisines: Vec::new(),
            dietary_restrictions: Vec::new(),
            calories_per_day: None,
            meals_per_day: 3,
        }
    }
}

fn list_or(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}

fn check_message(message: &str) -> Result<(), DomainError> {
    let chars = message.chars().count();
    if message.trim().is_empty() || chars > MESSAGE_MAX_CHARS {
        return Err(ValidationError::single(
            "/message",
            format!("must be between 1 and {MESSAGE_MAX_CHARS} characters"),
        )
        .into());
    }
    Ok(())
}

pub fn chat_system_prompt(preferences: Option<&serde_json::Value>) -> String {
    let context = preferences
        .map(|p| p.to_string())
        .unwrap_or_else(|| "No specific preferences".to_string());
    format!("{CHAT_SYSTEM}\n\nCurrent context: {context}")
}

pub fn chat_prompt(message: &str, context_recipes: &[Recipe]) -> String {
    if context_recipes.is_empty() {
        return message.to_string();
    }
    let titles: Vec<String> = context_recipes
        .iter()
        .map(|r| format!("- {}", r.title))
        .collect();
    format!(
        "Context: The user has been looking at these recipes:\n{}\n\nUser question: {message}",
        titles.join("\n")
    )
}

pub fn suggest_prompt(ingredients: &[String], prefs: &SuggestPreferences) -> String {
    let mut prompt = format!(
        "Suggest 5 recipes that can be made with these ingredients: {}.",
        ingredients.join(", ")
    );
    if let Some(cuisine) = &prefs.cuisine {
        prompt.push_str(&format!("\nPreferred cuisine: {cuisine}."));
    }
    if let Some(difficulty) = &prefs.difficulty {
        prompt.push_str(&format!("\nPreferred difficulty: {difficulty}."));
    }
    if !prefs.dietary_restrictions.is_empty() {
        prompt.push_str(&format!(
            "\nDietary restrictions: {}.",
            prefs.dietary_restrictions.join(", ")
        ));
    }
    prompt
}

pub fn meal_plan_prompt(prefs: &MealPlanPreferences) -> String {
    let calories = prefs
        .calories_per_day
        .map(|c| c.to_string())
        .unwrap_or_else(|| "not specified".to_string());
    format!(
        "Generate a weekly meal plan with {} meals per day.\nPreferences:\n- Cuisines: {}\n- Dietary restrictions: {}\n- Target calories: {calories} per day",
        prefs.meals_per_day,
        list_or(&prefs.cuisines, "any"),
        list_or(&prefs.dietary_restrictions, "none"),
    )
}

pub fn substitutions_prompt(ingredient: &str, dietary_restriction: Option<&str>) -> String {
    match dietary_restriction {
        Some(diet) => format!("Suggest substitutions for \"{ingredient}\" for {diet} diet."),
        None => format!("Suggest substitutions for \"{ingredient}\"."),
    }
}

fn search_summary_prompt(query: &str, recipes: &[Recipe]) -> String {
    if recipes.is_empty() {
        return format!(
            "The user searched for \"{query}\". No recipes found matching this search."
        );
    }
    let found: Vec<String> = recipes
        .iter()
        .map(|r| {
            format!(
                "{}: {}",
                r.title,
                r.description.as_deref().unwrap_or("No description")
            )
        })
        .collect();
    format!(
        "The user searched for \"{query}\". Here are the found recipes: {}",
        found.join("; ")
    )
}

#[derive(Clone)]
pub struct AssistantService {
    model: Arc<dyn LanguageModel>,
    recipes: Arc<dyn RecipesRepository>,
    search: Arc<SearchService>,
    ids: Arc<dyn IdGenerator>,
    config: AssistantConfig,
}

impl AssistantService {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        recipes: Arc<dyn RecipesRepository>,
        search: Arc<SearchService>,
        ids: Arc<dyn IdGenerator>,
        config: AssistantConfig,
    ) -> Self {
        Self {
            model,
            recipes,
            search,
            ids,
            config,
        }
    }

    async fn complete(&self, invocation: Invocation) -> Result<String, DomainError> {
        let completion = self
            .model
            .invoke(invocation)
            .await
            .map_err(DomainError::model)?;
        debug!(chars = completion.text.len(), "model replied");
        Ok(completion.text)
    }

    #[instrument(name = "krydd.assistant.chat", skip_all)]
    pub async fn chat(&self, message: &str, context: ChatContext) -> Result<ChatReply, DomainError> {
        check_message(message)?;
        let recent: Vec<String> = context
            .recent_recipes
            .into_iter()
            .take(self.config.context_recipes)
            .collect();
        let context_recipes = if recent.is_empty() {
            Vec::new()
        } else {
            self.recipes.batch_get(&recent).await?
        };

        let invocation = Invocation::new(chat_prompt(message, &context_recipes))
            .system(chat_system_prompt(context.preferences.as_ref()))
            .max_tokens(self.config.chat_max_tokens)
            .temperature(self.config.temperature);
        let response = self.complete(invocation).await?;
        info!("Chat reply generated");
        Ok(ChatReply {
            response,
            message_id: self.ids.new_id(),
        })
    }

    /// Semantic search followed by a short model-written summary of the hits.
    #[instrument(name = "krydd.assistant.chat_search", skip_all)]
    pub async fn chat_search(&self, message: &str) -> Result<ChatSearchReply, DomainError> {
        check_message(message)?;
        let results = self
            .search
            .semantic_search(SearchRequest {
                query: message.to_string(),
                max_results: Some(CHAT_SEARCH_RESULTS),
                ..Default::default()
            })
            .await?;
        let recipes: Vec<Recipe> = results.recipes.into_iter().map(|s| s.recipe).collect();

        let invocation = Invocation::new(search_summary_prompt(message, &recipes))
            .max_tokens(self.config.summary_max_tokens)
            .temperature(self.config.summary_temperature);
        let summary = self.complete(invocation).await?;
        Ok(ChatSearchReply {
            recipes,
            summary,
            search_query: results.query,
        })
    }

    #[instrument(name = "krydd.assistant.suggest", skip_all, fields(count = ingredients.len()))]
    pub async fn suggest_recipes(
        &self,
        ingredients: &[String],
        preferences: &SuggestPreferences,
    ) -> Result<String, DomainError> {
        if ingredients.is_empty() {
            return Err(
                ValidationError::single("/ingredients", "must contain at least one item").into(),
            );
        }
        let invocation = Invocation::new(suggest_prompt(ingredients, preferences))
            .system(SUGGEST_SYSTEM)
            .temperature(self.config.temperature);
        self.complete(invocation).await
    }

    #[instrument(name = "krydd.assistant.meal_plan", skip_all)]
    pub async fn generate_meal_plan(
        &self,
        preferences: &MealPlanPreferences,
    ) -> Result<String, DomainError> {
        let range = MealPlanPreferences::MIN_MEALS..=MealPlanPreferences::MAX_MEALS;
        if !range.contains(&preferences.meals_per_day) {
            return Err(ValidationError::single(
                "/preferences/mealsPerDay",
                format!(
                    "must be between {} and {}",
                    MealPlanPreferences::MIN_MEALS,
                    MealPlanPreferences::MAX_MEALS
                ),
            )
            .into());
        }
        let invocation = Invocation::new(meal_plan_prompt(preferences))
            .system(MEAL_PLAN_SYSTEM)
            .temperature(self.config.temperature);
        self.complete(invocation).await
    }

    #[instrument(name = "krydd.assistant.substitutions", skip(self))]
    pub async fn suggest_substitutions(
        &self,
        ingredient: &str,
        dietary_restriction: Option<&str>,
    ) -> Result<String, DomainError> {
        if ingredient.trim().is_empty() {
            return Err(ValidationError::single("/ingredient", "must not be empty").into());
        }
        let invocation = Invocation::new(substitutions_prompt(ingredient, dietary_restriction))
            .system(SUBSTITUTIONS_SYSTEM)
            .temperature(self.config.temperature);
        self.complete(invocation).await
    }
}
