//! Entity model shared by the storage, domain and REST layers.
//!
//! Field names serialize in camelCase; that shape is both the stored record
//! (next to its key attributes) and the JSON returned to clients.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// RFC 3339 UTC timestamps with millisecond precision (`2024-01-01T10:00:00.000Z`).
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

// ---------- users ----------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

pub type NewUser = User;

/// Partial user update. The email is the identity and cannot change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserPatch {
    #[serde(default)]
    pub name: Option<String>,
}

// ---------- recipes ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Ingredient {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: None,
            unit: None,
            notes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    /// Minutes.
    pub prep_time: i64,
    /// Minutes.
    pub cook_time: i64,
    pub servings: i64,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub dietary_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub author_id: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Recipe creation input: identifier and timestamps are generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewRecipe {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    pub prep_time: i64,
    pub cook_time: i64,
    pub servings: i64,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub dietary_tags: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub author_id: String,
}

/// Partial recipe update; omitted fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RecipePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ingredients: Option<Vec<Ingredient>>,
    #[serde(default)]
    pub instructions: Option<Vec<String>>,
    #[serde(default)]
    pub prep_time: Option<i64>,
    #[serde(default)]
    pub cook_time: Option<i64>,
    #[serde(default)]
    pub servings: Option<i64>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub dietary_tags: Option<Vec<String>>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub author_id: Option<String>,
}

impl RecipePatch {
    /// Apply every present field onto `recipe`.
    pub fn apply_to(self, recipe: &mut Recipe) {
        if let Some(v) = self.title {
            recipe.title = v;
        }
        if let Some(v) = self.description {
            recipe.description = Some(v);
        }
        if let Some(v) = self.ingredients {
            recipe.ingredients = v;
        }
        if let Some(v) = self.instructions {
            recipe.instructions = v;
        }
        if let Some(v) = self.prep_time {
            recipe.prep_time = v;
        }
        if let Some(v) = self.cook_time {
            recipe.cook_time = v;
        }
        if let Some(v) = self.servings {
            recipe.servings = v;
        }
        if let Some(v) = self.difficulty {
            recipe.difficulty = v;
        }
        if let Some(v) = self.cuisine {
            recipe.cuisine = Some(v);
        }
        if let Some(v) = self.dietary_tags {
            recipe.dietary_tags = v;
        }
        if let Some(v) = self.image_url {
            recipe.image_url = Some(v);
        }
        if let Some(v) = self.author_id {
            recipe.author_id = v;
        }
    }
}

// ---------- meal plans ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealEntry {
    pub recipe_id: String,
    pub meal_type: MealType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayMeals {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakfast: Option<Vec<MealEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lunch: Option<Vec<MealEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dinner: Option<Vec<MealEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snacks: Option<Vec<MealEntry>>,
}

impl DayMeals {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            breakfast: None,
            lunch: None,
            dinner: None,
            snacks: None,
        }
    }

    /// Every meal entry of the day with its bucket name.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, usize, &MealEntry)> + '_ {
        [
            ("breakfast", &self.breakfast),
            ("lunch", &self.lunch),
            ("dinner", &self.dinner),
            ("snacks", &self.snacks),
        ]
        .into_iter()
        .filter_map(|(bucket, entries)| entries.as_ref().map(|e| (bucket, e)))
        .flat_map(|(bucket, entries)| entries.iter().enumerate().map(move |(i, e)| (bucket, i, e)))
    }
}

/// Day key → meals of that day.
pub type Days = BTreeMap<NaiveDate, DayMeals>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Goals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisines: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary_restrictions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avoid_ingredients: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealPlan {
    pub id: String,
    pub user_id: String,
    pub week_start_date: NaiveDate,
    #[schema(value_type = BTreeMap<String, DayMeals>)]
    pub days: Days,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<Goals>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewMealPlan {
    pub user_id: String,
    pub week_start_date: NaiveDate,
    #[serde(default)]
    #[schema(value_type = BTreeMap<String, DayMeals>)]
    pub days: Days,
    #[serde(default)]
    pub goals: Option<Goals>,
    #[serde(default)]
    pub preferences: Option<Preferences>,
}

/// Partial meal plan update. Changing `userId` or `weekStartDate` moves the
/// plan to a new primary key; the target (user, week) must be free.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MealPlanPatch {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub week_start_date: Option<NaiveDate>,
    #[serde(default)]
    #[schema(value_type = Option<BTreeMap<String, DayMeals>>)]
    pub days: Option<Days>,
    #[serde(default)]
    pub goals: Option<Goals>,
    #[serde(default)]
    pub preferences: Option<Preferences>,
}

impl MealPlanPatch {
    pub fn apply_to(self, plan: &mut MealPlan) {
        if let Some(v) = self.user_id {
            plan.user_id = v;
        }
        if let Some(v) = self.week_start_date {
            plan.week_start_date = v;
        }
        if let Some(v) = self.days {
            plan.days = v;
        }
        if let Some(v) = self.goals {
            plan.goals = Some(v);
        }
        if let Some(v) = self.preferences {
            plan.preferences = Some(v);
        }
    }
}

// ---------- paging ----------

/// Page size and continuation cursor of a list request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: Option<u64>,
    pub cursor: Option<String>,
}

impl PageRequest {
    pub fn new(limit: Option<u64>, cursor: Option<String>) -> Self {
        Self { limit, cursor }
    }

    pub fn first(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            cursor: None,
        }
    }
}

// ---------- search ----------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoredRecipe {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub similarity_score: f32,
}

/// Stored embedding record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingRecord {
    pub recipe_id: String,
    pub embedding: Vec<f32>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}
