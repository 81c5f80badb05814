use async_trait::async_trait;
use chrono::NaiveDate;
use page_core::Page;

use crate::contract::model::{
    Days, MealPlan, MealPlanPatch, NewMealPlan, NewRecipe, PageRequest, Recipe, RecipePatch,
    User, UserPatch,
};
use crate::domain::error::DomainError;

/// Persistence port for users. Users are keyed by email.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Unconditional write; an existing user with the same email is overwritten.
    async fn create(&self, user: User) -> Result<User, DomainError>;
    async fn get(&self, email: &str) -> Result<Option<User>, DomainError>;
    /// `None` when the user does not exist.
    async fn update(&self, email: &str, patch: UserPatch) -> Result<Option<User>, DomainError>;
    /// Returns true if a user was deleted.
    async fn remove(&self, email: &str) -> Result<bool, DomainError>;
    async fn list(&self, page: PageRequest) -> Result<Page<User>, DomainError>;
}

/// Persistence port for recipes. The repository owns id and timestamp generation.
#[async_trait]
pub trait RecipesRepository: Send + Sync {
    async fn create(&self, recipe: NewRecipe) -> Result<Recipe, DomainError>;
    async fn get(&self, id: &str) -> Result<Option<Recipe>, DomainError>;
    async fn update(&self, id: &str, patch: RecipePatch) -> Result<Option<Recipe>, DomainError>;
    async fn remove(&self, id: &str) -> Result<bool, DomainError>;
    /// All recipes, ascending by id.
    async fn list(&self, page: PageRequest) -> Result<Page<Recipe>, DomainError>;
    async fn list_by_author(
        &self,
        author_id: &str,
        page: PageRequest,
    ) -> Result<Page<Recipe>, DomainError>;
    /// Recipes of one cuisine, oldest first. `None` selects recipes without a cuisine.
    async fn list_by_cuisine(
        &self,
        cuisine: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Recipe>, DomainError>;
    /// Point lookups in input order; missing ids are skipped.
    async fn batch_get(&self, ids: &[String]) -> Result<Vec<Recipe>, DomainError>;
}

/// Persistence port for meal plans: one plan per user and week.
#[async_trait]
pub trait MealPlansRepository: Send + Sync {
    /// Overwrites any plan stored for the same user and week.
    async fn create(&self, plan: NewMealPlan) -> Result<MealPlan, DomainError>;
    async fn get(&self, user_id: &str, week: NaiveDate) -> Result<Option<MealPlan>, DomainError>;
    async fn get_by_id(&self, id: &str) -> Result<Option<MealPlan>, DomainError>;
    async fn update(
        &self,
        user_id: &str,
        week: NaiveDate,
        patch: MealPlanPatch,
    ) -> Result<Option<MealPlan>, DomainError>;
    /// Merge `days` into the plan; an entry replaces the stored day of the same date.
    async fn update_days(
        &self,
        user_id: &str,
        week: NaiveDate,
        days: Days,
    ) -> Result<Option<MealPlan>, DomainError>;
    async fn remove(&self, user_id: &str, week: NaiveDate) -> Result<bool, DomainError>;
    async fn remove_by_id(&self, id: &str) -> Result<bool, DomainError>;
    /// Plans of one user, newest week first.
    async fn list_by_user(
        &self,
        user_id: &str,
        page: PageRequest,
    ) -> Result<Page<MealPlan>, DomainError>;
    /// Plans of every user for one week, ordered by user id.
    async fn list_by_week(
        &self,
        week: NaiveDate,
        page: PageRequest,
    ) -> Result<Page<MealPlan>, DomainError>;
}
