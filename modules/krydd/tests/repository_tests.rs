use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::json;

use krydd::config::PaginationConfig;
use krydd::domain::error::DomainError;
use krydd::domain::ports::{Clock, IdGenerator};
use krydd::domain::repo::{MealPlansRepository, RecipesRepository, UsersRepository};
use krydd::infra::storage::{
    TableMealPlansRepository, TableRecipesRepository, TableUsersRepository,
};
use krydd::model::{
    DayMeals, Difficulty, Ingredient, MealPlanPatch, NewMealPlan, NewRecipe, PageRequest,
    RecipePatch, User, UserPatch,
};
use page_core::LimitCfg;
use table_store::sql::SeaOrmTable;
use table_store::{InMemoryTable, TableStore};

/// Frozen unless advanced; repositories must still move `updatedAt` forward.
struct FixedClock(AtomicI64);

impl FixedClock {
    fn new() -> Self {
        Self(AtomicI64::new(0))
    }

    fn advance(&self, ms: i64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
            + chrono::Duration::milliseconds(self.0.load(Ordering::SeqCst))
    }
}

#[derive(Default)]
struct SeqIds(AtomicU64);

impl IdGenerator for SeqIds {
    fn new_id(&self) -> String {
        format!("id-{:03}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Every table backend the repositories run against.
async fn backends() -> Vec<(&'static str, Arc<dyn TableStore>)> {
    let sqlite = SeaOrmTable::connect("sqlite::memory:", 1)
        .await
        .expect("sqlite in-memory connect");
    vec![
        ("memory", Arc::new(InMemoryTable::new())),
        ("sqlite", Arc::new(sqlite)),
    ]
}

fn monday(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

fn new_recipe(title: &str, author: &str, cuisine: Option<&str>) -> NewRecipe {
    NewRecipe {
        title: title.to_string(),
        description: None,
        ingredients: vec![Ingredient::named("Salt")],
        instructions: vec!["Season".to_string()],
        prep_time: 5,
        cook_time: 10,
        servings: 2,
        difficulty: Difficulty::Medium,
        cuisine: cuisine.map(str::to_string),
        dietary_tags: vec![],
        image_url: None,
        author_id: author.to_string(),
    }
}

fn new_plan(user: &str, week: NaiveDate) -> NewMealPlan {
    NewMealPlan {
        user_id: user.to_string(),
        week_start_date: week,
        days: Default::default(),
        goals: None,
        preferences: None,
    }
}

#[tokio::test]
async fn users_round_trip_on_every_backend() -> Result<()> {
    for (name, store) in backends().await {
        let repo = TableUsersRepository::new(store, LimitCfg::new(2, 10));
        for email in ["c@example.com", "a@example.com", "b@example.com"] {
            repo.create(User {
                email: email.to_string(),
                name: None,
            })
            .await?;
        }

        let first = repo.list(PageRequest::default()).await?;
        let emails: Vec<_> = first.items.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, vec!["a@example.com", "b@example.com"], "{name}");
        let cursor = first.page_info.next_cursor.expect("second page");

        let second = repo.list(PageRequest::new(None, Some(cursor))).await?;
        assert_eq!(second.items.len(), 1, "{name}");
        assert_eq!(second.items[0].email, "c@example.com");
        assert!(second.page_info.next_cursor.is_none(), "{name}");

        let updated = repo
            .update(
                "a@example.com",
                UserPatch {
                    name: Some("Ada".into()),
                },
            )
            .await?
            .expect("user exists");
        assert_eq!(updated.name.as_deref(), Some("Ada"));
        assert!(repo.update("x@example.com", UserPatch::default()).await?.is_none());

        assert!(repo.remove("a@example.com").await?, "{name}");
        assert!(!repo.remove("a@example.com").await?, "{name}");
        assert!(repo.get("a@example.com").await?.is_none());
    }
    Ok(())
}

#[tokio::test]
async fn exact_page_size_has_no_cursor() -> Result<()> {
    for (name, store) in backends().await {
        let repo = TableUsersRepository::new(store, LimitCfg::new(2, 10));
        for email in ["a@example.com", "b@example.com"] {
            repo.create(User {
                email: email.to_string(),
                name: None,
            })
            .await?;
        }
        let page = repo.list(PageRequest::default()).await?;
        assert_eq!(page.items.len(), 2, "{name}");
        assert!(page.page_info.next_cursor.is_none(), "{name}");
    }
    Ok(())
}

#[tokio::test]
async fn soup_reads_back_exactly_as_created() -> Result<()> {
    for (name, store) in backends().await {
        let repo = TableRecipesRepository::new(
            store,
            Arc::new(FixedClock::new()),
            Arc::new(SeqIds::default()),
            LimitCfg::new(20, 100),
        );
        let input: NewRecipe = serde_json::from_value(json!({
            "title": "Soup",
            "ingredients": [{"name": "Salt"}],
            "instructions": ["Boil water"],
            "prepTime": 5,
            "cookTime": 10,
            "servings": 2,
            "difficulty": "easy",
            "authorId": "u1"
        }))?;

        let created = repo.create(input).await?;

        assert_eq!(created.title, "Soup", "{name}");
        assert_eq!(created.difficulty, Difficulty::Easy);
        assert!(created.dietary_tags.is_empty(), "{name}");
        assert!(created.cuisine.is_none());
        assert_eq!(created.created_at, created.updated_at, "{name}");
        assert_eq!(repo.get(&created.id).await?, Some(created), "{name}");
    }
    Ok(())
}

#[tokio::test]
async fn recipe_update_moves_index_entries() -> Result<()> {
    for (name, store) in backends().await {
        let clock = Arc::new(FixedClock::new());
        let repo = TableRecipesRepository::new(
            store,
            clock.clone(),
            Arc::new(SeqIds::default()),
            LimitCfg::new(20, 100),
        );

        let created = repo.create(new_recipe("Pad Thai", "u1", Some("thai"))).await?;
        assert_eq!(created.id, "id-001");
        assert_eq!(created.created_at, created.updated_at);

        // the clock does not move, updatedAt still does
        let updated = repo
            .update(
                &created.id,
                RecipePatch {
                    cuisine: Some("vietnamese".into()),
                    author_id: Some("u2".into()),
                    ..Default::default()
                },
            )
            .await?
            .expect("recipe exists");
        assert!(updated.updated_at > created.updated_at, "{name}");
        assert_eq!(updated.created_at, created.created_at);

        let thai = repo.list_by_cuisine(Some("thai"), PageRequest::default()).await?;
        assert!(thai.items.is_empty(), "{name}");
        let vietnamese = repo
            .list_by_cuisine(Some("vietnamese"), PageRequest::default())
            .await?;
        assert_eq!(vietnamese.items.len(), 1, "{name}");
        assert!(repo.list_by_author("u1", PageRequest::default()).await?.items.is_empty());
        assert_eq!(
            repo.list_by_author("u2", PageRequest::default()).await?.items[0].id,
            created.id
        );
    }
    Ok(())
}

#[tokio::test]
async fn cuisine_listing_is_ordered_by_creation() -> Result<()> {
    for (name, store) in backends().await {
        let clock = Arc::new(FixedClock::new());
        let repo = TableRecipesRepository::new(
            store,
            clock.clone(),
            Arc::new(SeqIds::default()),
            LimitCfg::new(20, 100),
        );
        for title in ["first", "second", "third"] {
            repo.create(new_recipe(title, "u1", None)).await?;
            clock.advance(1000);
        }

        let page = repo.list_by_cuisine(None, PageRequest::first(2)).await?;
        let titles: Vec<_> = page.items.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second"], "{name}");

        let rest = repo
            .list_by_cuisine(None, PageRequest::new(Some(2), page.page_info.next_cursor))
            .await?;
        assert_eq!(rest.items[0].title, "third", "{name}");

        let ids = vec!["id-003".to_string(), "missing".to_string(), "id-001".to_string()];
        let found: Vec<_> = repo
            .batch_get(&ids)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(found, vec!["id-003", "id-001"], "{name}");
    }
    Ok(())
}

#[tokio::test]
async fn meal_plans_list_newest_week_first() -> Result<()> {
    for (name, store) in backends().await {
        let repo = TableMealPlansRepository::new(
            store,
            Arc::new(FixedClock::new()),
            Arc::new(SeqIds::default()),
            PaginationConfig::default(),
        );
        for day in [1, 15, 8] {
            repo.create(new_plan("u1", monday(day))).await?;
        }
        repo.create(new_plan("u2", monday(8))).await?;

        let plans = repo.list_by_user("u1", PageRequest::default()).await?;
        let weeks: Vec<_> = plans.items.iter().map(|p| p.week_start_date).collect();
        assert_eq!(weeks, vec![monday(15), monday(8), monday(1)], "{name}");

        let week = repo.list_by_week(monday(8), PageRequest::default()).await?;
        let users: Vec<_> = week.items.iter().map(|p| p.user_id.as_str()).collect();
        assert_eq!(users, vec!["u1", "u2"], "{name}");
    }
    Ok(())
}

#[tokio::test]
async fn meal_plan_moving_weeks_drops_the_old_item() -> Result<()> {
    for (name, store) in backends().await {
        let repo = TableMealPlansRepository::new(
            store,
            Arc::new(FixedClock::new()),
            Arc::new(SeqIds::default()),
            PaginationConfig::default(),
        );
        let plan = repo.create(new_plan("u1", monday(1))).await?;

        let moved = repo
            .update(
                "u1",
                monday(1),
                MealPlanPatch {
                    week_start_date: Some(monday(8)),
                    ..Default::default()
                },
            )
            .await?
            .expect("plan exists");
        assert_eq!(moved.id, plan.id);
        assert!(repo.get("u1", monday(1)).await?.is_none(), "{name}");
        assert_eq!(repo.get_by_id(&plan.id).await?.map(|p| p.week_start_date), Some(monday(8)));

        let mut days = krydd::model::Days::new();
        days.insert(monday(9), DayMeals::empty(monday(9)));
        let with_day = repo
            .update_days("u1", monday(8), days)
            .await?
            .expect("plan exists");
        assert!(with_day.days.contains_key(&monday(9)), "{name}");

        // a day outside the week is rejected and nothing is written
        let mut outside = krydd::model::Days::new();
        outside.insert(monday(1), DayMeals::empty(monday(1)));
        assert!(repo.update_days("u1", monday(8), outside).await.is_err());
        assert_eq!(repo.get("u1", monday(8)).await?.map(|p| p.days.len()), Some(1));

        assert!(repo.remove_by_id(&plan.id).await?, "{name}");
        assert!(!repo.remove_by_id(&plan.id).await?, "{name}");
    }
    Ok(())
}

#[tokio::test]
async fn meal_plan_cannot_move_onto_an_occupied_week() -> Result<()> {
    for (name, store) in backends().await {
        let repo = TableMealPlansRepository::new(
            store,
            Arc::new(FixedClock::new()),
            Arc::new(SeqIds::default()),
            PaginationConfig::default(),
        );
        let first = repo.create(new_plan("u1", monday(1))).await?;
        let second = repo.create(new_plan("u1", monday(8))).await?;

        let result = repo
            .update(
                "u1",
                monday(1),
                MealPlanPatch {
                    week_start_date: Some(monday(8)),
                    ..Default::default()
                },
            )
            .await;

        assert!(
            matches!(result, Err(DomainError::AlreadyExists { .. })),
            "{name}"
        );
        assert_eq!(repo.get_by_id(&first.id).await?.map(|p| p.week_start_date), Some(monday(1)));
        assert_eq!(repo.get_by_id(&second.id).await?.map(|p| p.week_start_date), Some(monday(8)));
    }
    Ok(())
}

#[tokio::test]
async fn corrupt_items_read_as_absent() -> Result<()> {
    let table = Arc::new(InMemoryTable::new());
    let repo = TableUsersRepository::new(table.clone(), LimitCfg::new(50, 1000));

    table.insert_raw(
        json!({"PK": "USER", "SK": "USER#bad@example.com", "email": 42})
            .as_object()
            .cloned()
            .unwrap(),
    )?;
    repo.create(User {
        email: "good@example.com".into(),
        name: None,
    })
    .await?;

    assert!(repo.get("bad@example.com").await?.is_none());
    let page = repo.list(PageRequest::default()).await?;
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].email, "good@example.com");
    Ok(())
}
