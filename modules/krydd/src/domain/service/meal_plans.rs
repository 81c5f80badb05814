use std::sync::Arc;

use chrono::NaiveDate;
use page_core::Page;
use tracing::{debug, info, instrument};

use crate::contract::model::{Days, MealPlan, MealPlanPatch, NewMealPlan, PageRequest};
use crate::domain::error::DomainError;
use crate::domain::repo::MealPlansRepository;

const ENTITY: &str = "meal plan";

fn plan_key(user_id: &str, week: NaiveDate) -> String {
    format!("{user_id}/{week}")
}

#[derive(Clone)]
pub struct MealPlansService {
    repo: Arc<dyn MealPlansRepository>,
}

impl MealPlansService {
    pub fn new(repo: Arc<dyn MealPlansRepository>) -> Self {
        Self { repo }
    }

    /// Saving a plan for a week that already has one replaces it.
    #[instrument(
        name = "krydd.service.create_meal_plan",
        skip_all,
        fields(user_id = %input.user_id, week = %input.week_start_date)
    )]
    pub async fn create_meal_plan(&self, input: NewMealPlan) -> Result<MealPlan, DomainError> {
        info!("Saving meal plan");
        let plan = self.repo.create(input).await?;
        info!("Successfully saved meal plan with id={}", plan.id);
        Ok(plan)
    }

    #[instrument(name = "krydd.service.get_meal_plan", skip(self))]
    pub async fn get_meal_plan(
        &self,
        user_id: &str,
        week: NaiveDate,
    ) -> Result<MealPlan, DomainError> {
        debug!("Getting meal plan");
        self.repo
            .get(user_id, week)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, plan_key(user_id, week)))
    }

    #[instrument(name = "krydd.service.get_meal_plan_by_id", skip(self))]
    pub async fn get_meal_plan_by_id(&self, id: &str) -> Result<MealPlan, DomainError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))
    }

    #[instrument(name = "krydd.service.update_meal_plan", skip(self, patch))]
    pub async fn update_meal_plan(
        &self,
        user_id: &str,
        week: NaiveDate,
        patch: MealPlanPatch,
    ) -> Result<MealPlan, DomainError> {
        info!("Updating meal plan");
        self.repo
            .update(user_id, week, patch)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, plan_key(user_id, week)))
    }

    /// Merge `days` into the plan; a day replaces the stored day of the same date.
    #[instrument(name = "krydd.service.update_meal_plan_days", skip(self, days), fields(days = days.len()))]
    pub async fn update_days(
        &self,
        user_id: &str,
        week: NaiveDate,
        days: Days,
    ) -> Result<MealPlan, DomainError> {
        info!("Updating meal plan days");
        self.repo
            .update_days(user_id, week, days)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, plan_key(user_id, week)))
    }

    #[instrument(name = "krydd.service.delete_meal_plan", skip(self))]
    pub async fn delete_meal_plan(&self, user_id: &str, week: NaiveDate) -> Result<(), DomainError> {
        info!("Deleting meal plan");
        if !self.repo.remove(user_id, week).await? {
            return Err(DomainError::not_found(ENTITY, plan_key(user_id, week)));
        }
        Ok(())
    }

    #[instrument(name = "krydd.service.delete_meal_plan_by_id", skip(self))]
    pub async fn delete_meal_plan_by_id(&self, id: &str) -> Result<(), DomainError> {
        info!("Deleting meal plan by id");
        if !self.repo.remove_by_id(id).await? {
            return Err(DomainError::not_found(ENTITY, id));
        }
        Ok(())
    }

    #[instrument(name = "krydd.service.list_meal_plans_by_user", skip(self, page))]
    pub async fn list_by_user(
        &self,
        user_id: &str,
        page: PageRequest,
    ) -> Result<Page<MealPlan>, DomainError> {
        self.repo.list_by_user(user_id, page).await
    }

    #[instrument(name = "krydd.service.list_meal_plans_by_week", skip(self, page))]
    pub async fn list_by_week(
        &self,
        week: NaiveDate,
        page: PageRequest,
    ) -> Result<Page<MealPlan>, DomainError> {
        self.repo.list_by_week(week, page).await
    }
}
