//! Entity validation. Each validator walks the whole entity and reports every
//! violated constraint; values are never clamped or coerced.

use std::fmt;

use chrono::{Datelike, Days, Weekday};

use crate::contract::model::{Goals, MealPlan, Recipe, User};

pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

/// One violated constraint. `path` is a JSON pointer into the entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .violations
            .iter()
            .map(|v| format!("{}: {}", v.path, v.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violations: vec![Violation {
                path: path.into(),
                message: message.into(),
            }],
        }
    }
}

#[derive(Default)]
struct Collector {
    violations: Vec<Violation>,
}

impl Collector {
    fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation {
            path: path.into(),
            message: message.into(),
        });
    }

    fn check(&mut self, ok: bool, path: impl Into<String>, message: impl Into<String>) {
        if !ok {
            self.push(path, message);
        }
    }

    fn non_empty(&mut self, value: &str, path: impl Into<String>) {
        self.check(!value.is_empty(), path, "must not be empty");
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                violations: self.violations,
            })
        }
    }
}

/// Minimal structural email check: one `@`, non-empty local part, dotted
/// domain without empty labels, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

pub fn validate_user(user: &User) -> Result<(), ValidationError> {
    let mut c = Collector::default();
    c.check(is_valid_email(&user.email), "/email", "must be a valid email address");
    c.finish()
}

pub fn validate_recipe(r: &Recipe) -> Result<(), ValidationError> {
    let mut c = Collector::default();

    c.non_empty(&r.id, "/id");

    let title_len = r.title.chars().count();
    c.check(
        (1..=TITLE_MAX_CHARS).contains(&title_len),
        "/title",
        format!("must be between 1 and {TITLE_MAX_CHARS} characters"),
    );

    if let Some(desc) = &r.description {
        c.check(
            desc.chars().count() <= DESCRIPTION_MAX_CHARS,
            "/description",
            format!("must be at most {DESCRIPTION_MAX_CHARS} characters"),
        );
    }

    c.check(
        !r.ingredients.is_empty(),
        "/ingredients",
        "must contain at least one ingredient",
    );
    for (i, ing) in r.ingredients.iter().enumerate() {
        c.non_empty(&ing.name, format!("/ingredients/{i}/name"));
    }

    c.check(
        !r.instructions.is_empty(),
        "/instructions",
        "must contain at least one step",
    );
    for (i, step) in r.instructions.iter().enumerate() {
        c.non_empty(step, format!("/instructions/{i}"));
    }

    c.check(r.prep_time >= 0, "/prepTime", "must be >= 0");
    c.check(r.cook_time >= 0, "/cookTime", "must be >= 0");
    c.check(r.servings >= 1, "/servings", "must be >= 1");

    if let Some(url) = &r.image_url {
        c.check(
            url::Url::parse(url).is_ok(),
            "/imageUrl",
            "must be a valid URL",
        );
    }

    c.non_empty(&r.author_id, "/authorId");
    c.finish()
}

fn check_goals(c: &mut Collector, goals: &Goals) {
    for (name, value) in [
        ("calories", goals.calories),
        ("protein", goals.protein),
        ("carbs", goals.carbs),
        ("fat", goals.fat),
    ] {
        if let Some(v) = value {
            c.check(v >= 0, format!("/goals/{name}"), "must be >= 0");
        }
    }
}

pub fn validate_meal_plan(p: &MealPlan) -> Result<(), ValidationError> {
    let mut c = Collector::default();

    c.non_empty(&p.id, "/id");
    c.non_empty(&p.user_id, "/userId");
    c.check(
        p.week_start_date.weekday() == Weekday::Mon,
        "/weekStartDate",
        "must be a Monday",
    );

    let week_end = p.week_start_date.checked_add_days(Days::new(6));
    if week_end.is_none() {
        c.push("/weekStartDate", "week ends past the last supported date");
    }
    for (key, day) in &p.days {
        let path = format!("/days/{key}");
        if let Some(week_end) = week_end {
            c.check(
                *key >= p.week_start_date && *key <= week_end,
                path.clone(),
                "must fall within the plan's week",
            );
        }
        c.check(
            day.date == *key,
            format!("{path}/date"),
            "must equal the day key",
        );
        for (bucket, i, entry) in day.entries() {
            c.non_empty(&entry.recipe_id, format!("{path}/{bucket}/{i}/recipeId"));
        }
    }

    if let Some(goals) = &p.goals {
        check_goals(&mut c, goals);
    }
    c.finish()
}
