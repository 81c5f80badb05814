use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use page_core::Page;
use table_store::{key_attr, IndexName, PrimaryKey, QueryRequest, TableStore, PK, SK};
use tracing::{debug, instrument};

use crate::config::PaginationConfig;
use crate::contract::model::{Days, MealPlan, MealPlanPatch, NewMealPlan, PageRequest};
use crate::domain::error::DomainError;
use crate::domain::ports::{Clock, IdGenerator};
use crate::domain::repo::MealPlansRepository;
use crate::domain::validation::validate_meal_plan;

use super::keys::{
    encode_keys, meal_plan_id_partition, meal_plan_partition, meal_plan_sk, week_partition,
    MEALPLAN_PREFIX, USER_PREFIX,
};
use super::{from_item, next_updated_at, query_page, to_item, Listing};

const ENTITY: &str = "meal_plan";

/// Meal plans in the single table, one item per (user, week).
///
/// Primary `USER#{userId} / MEALPLAN#{week}`, GSI1 by week, GSI2 by plan id.
pub struct TableMealPlansRepository {
    store: Arc<dyn TableStore>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    limits: PaginationConfig,
}

impl TableMealPlansRepository {
    pub fn new(
        store: Arc<dyn TableStore>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        limits: PaginationConfig,
    ) -> Self {
        Self {
            store,
            clock,
            ids,
            limits,
        }
    }

    fn primary_key(user_id: &str, week: NaiveDate) -> PrimaryKey {
        PrimaryKey::new(meal_plan_partition(user_id), meal_plan_sk(week))
    }

    async fn put(&self, plan: &MealPlan) -> Result<(), DomainError> {
        validate_meal_plan(plan)?;
        let item = to_item(plan, &encode_keys(plan.into()))?;
        self.store.put(item).await?;
        Ok(())
    }

    /// Primary key of the plan with `id`, through the id index.
    async fn resolve_id(&self, id: &str) -> Result<Option<PrimaryKey>, DomainError> {
        let out = self
            .store
            .query(QueryRequest::new(IndexName::Gsi2, meal_plan_id_partition(id)).limit(1))
            .await?;
        Ok(out.items.first().and_then(|item| {
            Some(PrimaryKey::new(key_attr(item, PK)?, key_attr(item, SK)?))
        }))
    }

    /// Merge and persist. When the user or week changed, the plan moves to a
    /// new primary key and the old item is deleted; a move onto a (user, week)
    /// that already holds a plan is refused.
    async fn rewrite(
        &self,
        mut plan: MealPlan,
        change: impl FnOnce(&mut MealPlan),
    ) -> Result<MealPlan, DomainError> {
        let old_key = Self::primary_key(&plan.user_id, plan.week_start_date);
        let previous = plan.updated_at;
        change(&mut plan);
        plan.updated_at = next_updated_at(self.clock.now(), previous);

        let new_key = Self::primary_key(&plan.user_id, plan.week_start_date);
        let moved = new_key != old_key;
        if moved && self.store.get(&new_key).await?.is_some() {
            return Err(DomainError::already_exists(
                ENTITY,
                format!("{}/{}", plan.user_id, plan.week_start_date),
            ));
        }
        self.put(&plan).await?;

        if moved {
            debug!(from = ?old_key, to = ?new_key, "meal plan moved");
            self.store.delete(&old_key).await?;
        }
        Ok(plan)
    }
}

#[async_trait]
impl MealPlansRepository for TableMealPlansRepository {
    #[instrument(
        name = "krydd.repo.meal_plans.create",
        skip_all,
        fields(user_id = %input.user_id, week = %input.week_start_date)
    )]
    async fn create(&self, input: NewMealPlan) -> Result<MealPlan, DomainError> {
        let now = self.clock.now();
        let plan = MealPlan {
            id: self.ids.new_id(),
            user_id: input.user_id,
            week_start_date: input.week_start_date,
            days: input.days,
            goals: input.goals,
            preferences: input.preferences,
            created_at: now,
            updated_at: now,
        };
        self.put(&plan).await?;
        Ok(plan)
    }

    #[instrument(name = "krydd.repo.meal_plans.get", skip(self))]
    async fn get(&self, user_id: &str, week: NaiveDate) -> Result<Option<MealPlan>, DomainError> {
        Ok(self
            .store
            .get(&Self::primary_key(user_id, week))
            .await?
            .and_then(|item| from_item(item, ENTITY, validate_meal_plan)))
    }

    #[instrument(name = "krydd.repo.meal_plans.get_by_id", skip(self))]
    async fn get_by_id(&self, id: &str) -> Result<Option<MealPlan>, DomainError> {
        let Some(key) = self.resolve_id(id).await? else {
            return Ok(None);
        };
        Ok(self
            .store
            .get(&key)
            .await?
            .and_then(|item| from_item(item, ENTITY, validate_meal_plan)))
    }

    #[instrument(name = "krydd.repo.meal_plans.update", skip(self, patch))]
    async fn update(
        &self,
        user_id: &str,
        week: NaiveDate,
        patch: MealPlanPatch,
    ) -> Result<Option<MealPlan>, DomainError> {
        let Some(plan) = self.get(user_id, week).await? else {
            return Ok(None);
        };
        self.rewrite(plan, |p| patch.apply_to(p)).await.map(Some)
    }

    #[instrument(name = "krydd.repo.meal_plans.update_days", skip(self, days))]
    async fn update_days(
        &self,
        user_id: &str,
        week: NaiveDate,
        days: Days,
    ) -> Result<Option<MealPlan>, DomainError> {
        let Some(plan) = self.get(user_id, week).await? else {
            return Ok(None);
        };
        self.rewrite(plan, |p| p.days.extend(days)).await.map(Some)
    }

    #[instrument(name = "krydd.repo.meal_plans.remove", skip(self))]
    async fn remove(&self, user_id: &str, week: NaiveDate) -> Result<bool, DomainError> {
        Ok(self
            .store
            .delete(&Self::primary_key(user_id, week))
            .await?
            .is_some())
    }

    #[instrument(name = "krydd.repo.meal_plans.remove_by_id", skip(self))]
    async fn remove_by_id(&self, id: &str) -> Result<bool, DomainError> {
        let Some(key) = self.resolve_id(id).await? else {
            return Ok(false);
        };
        Ok(self.store.delete(&key).await?.is_some())
    }

    #[instrument(name = "krydd.repo.meal_plans.list_by_user", skip(self, page))]
    async fn list_by_user(
        &self,
        user_id: &str,
        page: PageRequest,
    ) -> Result<Page<MealPlan>, DomainError> {
        let listing = Listing::new(
            IndexName::Primary,
            meal_plan_partition(user_id),
            MEALPLAN_PREFIX,
            self.limits.meal_plans_by_user,
        )
        .descending();
        query_page(self.store.as_ref(), listing, page, ENTITY, validate_meal_plan).await
    }

    #[instrument(name = "krydd.repo.meal_plans.list_by_week", skip(self, page))]
    async fn list_by_week(
        &self,
        week: NaiveDate,
        page: PageRequest,
    ) -> Result<Page<MealPlan>, DomainError> {
        let listing = Listing::new(
            IndexName::Gsi1,
            week_partition(week),
            USER_PREFIX,
            self.limits.meal_plans_by_week,
        );
        query_page(self.store.as_ref(), listing, page, ENTITY, validate_meal_plan).await
    }
}
