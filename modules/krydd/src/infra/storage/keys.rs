//! Key encoder: derives the single-table key attributes of each entity.
//!
//! Every function here is pure. Re-encoding an entity after an update yields
//! the same primary key as long as its key-bearing fields are unchanged.

use chrono::{DateTime, NaiveDate, Utc};
use table_store::{Item, PrimaryKey, GSI1PK, GSI1SK, GSI2PK, GSI2SK, PK, SK};

use crate::contract::model::{timestamp, MealPlan, Recipe, User};

pub const USER_PARTITION: &str = "USER";
pub const RECIPE_PARTITION: &str = "RECIPE";

pub const USER_PREFIX: &str = "USER#";
pub const RECIPE_PREFIX: &str = "RECIPE#";
pub const MEALPLAN_PREFIX: &str = "MEALPLAN#";

/// Cuisine partition of recipes without a cuisine.
pub const CUISINE_UNKNOWN: &str = "UNKNOWN";

/// Natural key fields of one entity.
#[derive(Debug, Clone, Copy)]
pub enum EntityKey<'a> {
    User {
        email: &'a str,
    },
    Recipe {
        id: &'a str,
        author_id: &'a str,
        cuisine: Option<&'a str>,
        created_at: &'a DateTime<Utc>,
    },
    MealPlan {
        id: &'a str,
        user_id: &'a str,
        week_start_date: NaiveDate,
    },
}

impl<'a> From<&'a User> for EntityKey<'a> {
    fn from(u: &'a User) -> Self {
        EntityKey::User { email: &u.email }
    }
}

impl<'a> From<&'a Recipe> for EntityKey<'a> {
    fn from(r: &'a Recipe) -> Self {
        EntityKey::Recipe {
            id: &r.id,
            author_id: &r.author_id,
            cuisine: r.cuisine.as_deref(),
            created_at: &r.created_at,
        }
    }
}

impl<'a> From<&'a MealPlan> for EntityKey<'a> {
    fn from(p: &'a MealPlan) -> Self {
        EntityKey::MealPlan {
            id: &p.id,
            user_id: &p.user_id,
            week_start_date: p.week_start_date,
        }
    }
}

/// Full set of key attributes of one stored item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySet {
    pub pk: String,
    pub sk: String,
    pub gsi1: Option<(String, String)>,
    pub gsi2: Option<(String, String)>,
}

impl KeySet {
    pub fn primary(&self) -> PrimaryKey {
        PrimaryKey::new(self.pk.clone(), self.sk.clone())
    }

    /// Write the key attributes into `item`, dropping index attributes the
    /// entity does not populate.
    pub fn apply(&self, item: &mut Item) {
        item.insert(PK.into(), self.pk.clone().into());
        item.insert(SK.into(), self.sk.clone().into());
        for (attrs, value) in [((GSI1PK, GSI1SK), &self.gsi1), ((GSI2PK, GSI2SK), &self.gsi2)] {
            match value {
                Some((pk, sk)) => {
                    item.insert(attrs.0.into(), pk.clone().into());
                    item.insert(attrs.1.into(), sk.clone().into());
                }
                None => {
                    item.remove(attrs.0);
                    item.remove(attrs.1);
                }
            }
        }
    }
}

pub fn encode_keys(entity: EntityKey<'_>) -> KeySet {
    match entity {
        EntityKey::User { email } => KeySet {
            pk: USER_PARTITION.to_string(),
            sk: user_sk(email),
            gsi1: None,
            gsi2: None,
        },
        EntityKey::Recipe {
            id,
            author_id,
            cuisine,
            created_at,
        } => KeySet {
            pk: RECIPE_PARTITION.to_string(),
            sk: recipe_sk(id),
            gsi1: Some((author_partition(author_id), recipe_sk(id))),
            gsi2: Some((
                cuisine_partition(cuisine),
                format!("{RECIPE_PREFIX}{}", timestamp::format(created_at)),
            )),
        },
        EntityKey::MealPlan {
            id,
            user_id,
            week_start_date,
        } => KeySet {
            pk: meal_plan_partition(user_id),
            sk: meal_plan_sk(week_start_date),
            gsi1: Some((week_partition(week_start_date), user_sk(user_id))),
            gsi2: Some((meal_plan_id_partition(id), user_sk(user_id))),
        },
    }
}

pub fn user_sk(email_or_id: &str) -> String {
    format!("{USER_PREFIX}{email_or_id}")
}

pub fn recipe_sk(id: &str) -> String {
    format!("{RECIPE_PREFIX}{id}")
}

pub fn author_partition(author_id: &str) -> String {
    format!("AUTHOR#{author_id}")
}

pub fn cuisine_partition(cuisine: Option<&str>) -> String {
    format!("CUISINE#{}", cuisine.unwrap_or(CUISINE_UNKNOWN))
}

pub fn meal_plan_partition(user_id: &str) -> String {
    user_sk(user_id)
}

pub fn meal_plan_sk(week: NaiveDate) -> String {
    format!("{MEALPLAN_PREFIX}{week}")
}

pub fn week_partition(week: NaiveDate) -> String {
    meal_plan_sk(week)
}

pub fn meal_plan_id_partition(id: &str) -> String {
    format!("MEALPLAN_ID#{id}")
}
