use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Extension, Json, Router,
};
use utoipa::OpenApi;

use crate::api::rest::handlers;
use crate::api::rest::openapi::ApiDoc;
use crate::domain::service::{
    AssistantService, MealPlansService, RecipesService, SearchService, UsersService,
};

/// Services the REST handlers are wired to.
#[derive(Clone)]
pub struct KryddServices {
    pub users: Arc<UsersService>,
    pub recipes: Arc<RecipesService>,
    pub meal_plans: Arc<MealPlansService>,
    pub search: Arc<SearchService>,
    pub assistant: Arc<AssistantService>,
}

/// All `/api` routes plus `/api/openapi.json`.
pub fn router(services: KryddServices) -> Router {
    let api = Router::new()
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .route(
            "/users/{email}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route(
            "/recipes",
            get(handlers::list_recipes).post(handlers::create_recipe),
        )
        .route(
            "/recipes/{id}",
            get(handlers::get_recipe)
                .put(handlers::update_recipe)
                .delete(handlers::delete_recipe),
        )
        .route(
            "/recipes/author/{author_id}",
            get(handlers::list_recipes_by_author),
        )
        .route(
            "/recipes/cuisine/{cuisine}",
            get(handlers::list_recipes_by_cuisine),
        )
        .route(
            "/meal-plans",
            get(handlers::list_meal_plans).post(handlers::create_meal_plan),
        )
        // One route per position: the key is a week date or a plan id.
        .route(
            "/meal-plans/{key}",
            get(handlers::get_meal_plan)
                .put(handlers::update_meal_plan)
                .delete(handlers::delete_meal_plan),
        )
        .route(
            "/meal-plans/{key}/days",
            patch(handlers::update_meal_plan_days),
        )
        .route(
            "/meal-plans/week/{week_start}",
            get(handlers::list_meal_plans_by_week),
        )
        .route(
            "/search",
            get(handlers::text_search).post(handlers::semantic_search),
        )
        .route("/search/ingredients", post(handlers::search_by_ingredients))
        .route("/search/recommendations", get(handlers::recommendations))
        .route("/chat", post(handlers::chat))
        .route("/chat/search", post(handlers::chat_search))
        .route("/chat/suggest", post(handlers::suggest_recipes))
        .route("/chat/meal-plan", post(handlers::generate_meal_plan))
        .route("/chat/substitutions", post(handlers::suggest_substitutions))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .layer(Extension(services.users))
        .layer(Extension(services.recipes))
        .layer(Extension(services.meal_plans))
        .layer(Extension(services.search))
        .layer(Extension(services.assistant));

    Router::new().nest("/api", api)
}
