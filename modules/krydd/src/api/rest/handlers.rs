use std::sync::Arc;

use axum::{
    extract::Path,
    http::Uri,
    response::Response,
    Extension,
};
use chrono::{Datelike, NaiveDate, Weekday};
use krydd_http::{created, ok, ok_message, ok_page, Problem, ProblemResponse};
use tracing::{error, info};

use crate::api::rest::dto::{
    ChatReplyDto, ChatReq, ChatSearchDto, ChatSearchReq, IngredientResultsDto,
    IngredientSearchReq, ListQuery, MealPlanListQuery, MealPlanReq, MealPlanSuggestionDto,
    RecipeListQuery, RecommendationsDto, SearchReq, SearchResultsDto, SubstitutionsDto,
    SubstitutionsReq, SuggestReq, SuggestionsDto, TextSearchQuery, UpdateDaysReq, UserIdQuery,
};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::extract::{ApiJson, ApiQuery};
use crate::contract::model::{
    MealPlan, MealPlanPatch, NewMealPlan, NewRecipe, NewUser, PageRequest, Recipe, RecipePatch,
    User, UserPatch,
};
use crate::domain::error::DomainError;
use crate::domain::service::assistant::{MealPlanPreferences, SuggestPreferences};
use crate::domain::service::{
    AssistantService, MealPlansService, RecipesService, SearchRequest, SearchService,
    UsersService,
};
use crate::domain::validation::ValidationError;

/// Week start from a path segment: a `YYYY-MM-DD` Monday.
fn parse_week(raw: &str) -> Result<NaiveDate, DomainError> {
    let week = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        DomainError::from(ValidationError::single(
            "/weekStartDate",
            "must be a YYYY-MM-DD date",
        ))
    })?;
    if week.weekday() != Weekday::Mon {
        return Err(ValidationError::single("/weekStartDate", "must be a Monday").into());
    }
    Ok(week)
}

fn require_user(user_id: Option<String>) -> Result<String, DomainError> {
    user_id
        .filter(|u| !u.is_empty())
        .ok_or_else(|| DomainError::bad_request("userId query parameter is required"))
}

// ---------- users ----------

#[utoipa::path(
    get, path = "/api/users", tag = "users", operation_id = "krydd.list_users",
    params(ListQuery),
    responses(
        (status = 200, description = "Page of users", body = Vec<User>),
        (status = 400, description = "Invalid cursor", body = Problem),
    )
)]
pub async fn list_users(
    uri: Uri,
    Extension(svc): Extension<Arc<UsersService>>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Response, ProblemResponse> {
    info!("Listing users with query: {:?}", query);

    match svc.list_users(query.into()).await {
        Ok(page) => Ok(ok_page(page.items, page.page_info.next_cursor)),
        Err(e) => {
            error!("Failed to list users: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    get, path = "/api/users/{email}", tag = "users", operation_id = "krydd.get_user",
    params(("email" = String, Path, description = "User email")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "Not Found", body = Problem),
    )
)]
pub async fn get_user(
    uri: Uri,
    Extension(svc): Extension<Arc<UsersService>>,
    Path(email): Path<String>,
) -> Result<Response, ProblemResponse> {
    info!("Getting user: {}", email);

    match svc.get_user(&email).await {
        Ok(user) => Ok(ok(user)),
        Err(e) => {
            error!("Failed to get user {}: {}", email, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    post, path = "/api/users", tag = "users", operation_id = "krydd.create_user",
    request_body = User,
    responses(
        (status = 201, description = "Created user", body = User),
        (status = 400, description = "Validation failed", body = Problem),
        (status = 409, description = "Email already registered", body = Problem),
    )
)]
pub async fn create_user(
    uri: Uri,
    Extension(svc): Extension<Arc<UsersService>>,
    ApiJson(req): ApiJson<NewUser>,
) -> Result<Response, ProblemResponse> {
    info!("Creating user: {}", req.email);

    match svc.create_user(req).await {
        Ok(user) => Ok(created(user)),
        Err(e) => {
            error!("Failed to create user: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    put, path = "/api/users/{email}", tag = "users", operation_id = "krydd.update_user",
    params(("email" = String, Path, description = "User email")),
    request_body = UserPatch,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Validation failed", body = Problem),
        (status = 404, description = "Not Found", body = Problem),
    )
)]
pub async fn update_user(
    uri: Uri,
    Extension(svc): Extension<Arc<UsersService>>,
    Path(email): Path<String>,
    ApiJson(patch): ApiJson<UserPatch>,
) -> Result<Response, ProblemResponse> {
    info!("Updating user {} with: {:?}", email, patch);

    match svc.update_user(&email, patch).await {
        Ok(user) => Ok(ok(user)),
        Err(e) => {
            error!("Failed to update user {}: {}", email, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    delete, path = "/api/users/{email}", tag = "users", operation_id = "krydd.delete_user",
    params(("email" = String, Path, description = "User email")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "Not Found", body = Problem),
    )
)]
pub async fn delete_user(
    uri: Uri,
    Extension(svc): Extension<Arc<UsersService>>,
    Path(email): Path<String>,
) -> Result<Response, ProblemResponse> {
    info!("Deleting user: {}", email);

    match svc.delete_user(&email).await {
        Ok(()) => Ok(ok_message("User deleted successfully")),
        Err(e) => {
            error!("Failed to delete user {}: {}", email, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

// ---------- recipes ----------

#[utoipa::path(
    get, path = "/api/recipes", tag = "recipes", operation_id = "krydd.list_recipes",
    params(RecipeListQuery),
    responses(
        (status = 200, description = "Page of recipes", body = Vec<Recipe>),
        (status = 400, description = "Invalid query or cursor", body = Problem),
    )
)]
pub async fn list_recipes(
    uri: Uri,
    Extension(svc): Extension<Arc<RecipesService>>,
    ApiQuery(query): ApiQuery<RecipeListQuery>,
) -> Result<Response, ProblemResponse> {
    info!("Listing recipes with query: {:?}", query);
    let (filter, page) = query.into_parts();

    match svc.list_recipes(filter, page).await {
        Ok(page) => Ok(ok_page(page.items, page.page_info.next_cursor)),
        Err(e) => {
            error!("Failed to list recipes: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    get, path = "/api/recipes/{id}", tag = "recipes", operation_id = "krydd.get_recipe",
    params(("id" = String, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe found", body = Recipe),
        (status = 404, description = "Not Found", body = Problem),
    )
)]
pub async fn get_recipe(
    uri: Uri,
    Extension(svc): Extension<Arc<RecipesService>>,
    Path(id): Path<String>,
) -> Result<Response, ProblemResponse> {
    info!("Getting recipe with id: {}", id);

    match svc.get_recipe(&id).await {
        Ok(recipe) => Ok(ok(recipe)),
        Err(e) => {
            error!("Failed to get recipe {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    post, path = "/api/recipes", tag = "recipes", operation_id = "krydd.create_recipe",
    request_body = NewRecipe,
    responses(
        (status = 201, description = "Created recipe", body = Recipe),
        (status = 400, description = "Validation failed", body = Problem),
    )
)]
pub async fn create_recipe(
    uri: Uri,
    Extension(svc): Extension<Arc<RecipesService>>,
    ApiJson(req): ApiJson<NewRecipe>,
) -> Result<Response, ProblemResponse> {
    info!("Creating recipe: {}", req.title);

    match svc.create_recipe(req).await {
        Ok(recipe) => Ok(created(recipe)),
        Err(e) => {
            error!("Failed to create recipe: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    put, path = "/api/recipes/{id}", tag = "recipes", operation_id = "krydd.update_recipe",
    params(("id" = String, Path, description = "Recipe id")),
    request_body = RecipePatch,
    responses(
        (status = 200, description = "Updated recipe", body = Recipe),
        (status = 400, description = "Validation failed", body = Problem),
        (status = 404, description = "Not Found", body = Problem),
    )
)]
pub async fn update_recipe(
    uri: Uri,
    Extension(svc): Extension<Arc<RecipesService>>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<RecipePatch>,
) -> Result<Response, ProblemResponse> {
    info!("Updating recipe {}", id);

    match svc.update_recipe(&id, patch).await {
        Ok(recipe) => Ok(ok(recipe)),
        Err(e) => {
            error!("Failed to update recipe {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    delete, path = "/api/recipes/{id}", tag = "recipes", operation_id = "krydd.delete_recipe",
    params(("id" = String, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe deleted"),
        (status = 404, description = "Not Found", body = Problem),
    )
)]
pub async fn delete_recipe(
    uri: Uri,
    Extension(svc): Extension<Arc<RecipesService>>,
    Path(id): Path<String>,
) -> Result<Response, ProblemResponse> {
    info!("Deleting recipe: {}", id);

    match svc.delete_recipe(&id).await {
        Ok(()) => Ok(ok_message("Recipe deleted successfully")),
        Err(e) => {
            error!("Failed to delete recipe {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    get, path = "/api/recipes/author/{authorId}", tag = "recipes",
    operation_id = "krydd.list_recipes_by_author",
    params(("authorId" = String, Path, description = "Author id"), ListQuery),
    responses(
        (status = 200, description = "Page of recipes", body = Vec<Recipe>),
        (status = 400, description = "Invalid cursor", body = Problem),
    )
)]
pub async fn list_recipes_by_author(
    uri: Uri,
    Extension(svc): Extension<Arc<RecipesService>>,
    Path(author_id): Path<String>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Response, ProblemResponse> {
    info!("Listing recipes by author: {}", author_id);

    match svc.list_by_author(&author_id, query.into()).await {
        Ok(page) => Ok(ok_page(page.items, page.page_info.next_cursor)),
        Err(e) => {
            error!("Failed to list recipes by author {}: {}", author_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    get, path = "/api/recipes/cuisine/{cuisine}", tag = "recipes",
    operation_id = "krydd.list_recipes_by_cuisine",
    params(("cuisine" = String, Path, description = "Cuisine, or UNKNOWN for recipes without one"), ListQuery),
    responses(
        (status = 200, description = "Page of recipes, newest first", body = Vec<Recipe>),
        (status = 400, description = "Invalid cursor", body = Problem),
    )
)]
pub async fn list_recipes_by_cuisine(
    uri: Uri,
    Extension(svc): Extension<Arc<RecipesService>>,
    Path(cuisine): Path<String>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Response, ProblemResponse> {
    info!("Listing recipes by cuisine: {}", cuisine);

    match svc.list_by_cuisine(&cuisine, query.into()).await {
        Ok(page) => Ok(ok_page(page.items, page.page_info.next_cursor)),
        Err(e) => {
            error!("Failed to list recipes by cuisine {}: {}", cuisine, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

// ---------- meal plans ----------

#[utoipa::path(
    get, path = "/api/meal-plans", tag = "meal-plans", operation_id = "krydd.list_meal_plans",
    params(MealPlanListQuery),
    responses(
        (status = 200, description = "Page of the user's plans, newest week first", body = Vec<MealPlan>),
        (status = 400, description = "Missing userId or invalid cursor", body = Problem),
    )
)]
pub async fn list_meal_plans(
    uri: Uri,
    Extension(svc): Extension<Arc<MealPlansService>>,
    ApiQuery(query): ApiQuery<MealPlanListQuery>,
) -> Result<Response, ProblemResponse> {
    info!("Listing meal plans with query: {:?}", query);

    let result = match require_user(query.user_id) {
        Ok(user_id) => {
            svc.list_by_user(&user_id, PageRequest::new(query.limit, query.cursor))
                .await
        }
        Err(e) => Err(e),
    };
    match result {
        Ok(page) => Ok(ok_page(page.items, page.page_info.next_cursor)),
        Err(e) => {
            error!("Failed to list meal plans: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    post, path = "/api/meal-plans", tag = "meal-plans", operation_id = "krydd.create_meal_plan",
    request_body = NewMealPlan,
    responses(
        (status = 201, description = "Created or replaced plan", body = MealPlan),
        (status = 400, description = "Validation failed", body = Problem),
    )
)]
pub async fn create_meal_plan(
    uri: Uri,
    Extension(svc): Extension<Arc<MealPlansService>>,
    ApiJson(req): ApiJson<NewMealPlan>,
) -> Result<Response, ProblemResponse> {
    info!(
        "Creating meal plan for user {} week {}",
        req.user_id, req.week_start_date
    );

    match svc.create_meal_plan(req).await {
        Ok(plan) => Ok(created(plan)),
        Err(e) => {
            error!("Failed to create meal plan: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// With `userId` the key is the week start date; without it, the plan id.
#[utoipa::path(
    get, path = "/api/meal-plans/{key}", tag = "meal-plans", operation_id = "krydd.get_meal_plan",
    params(("key" = String, Path, description = "Week start date (with userId) or plan id"), UserIdQuery),
    responses(
        (status = 200, description = "Plan found", body = MealPlan),
        (status = 404, description = "Not Found", body = Problem),
    )
)]
pub async fn get_meal_plan(
    uri: Uri,
    Extension(svc): Extension<Arc<MealPlansService>>,
    Path(key): Path<String>,
    ApiQuery(query): ApiQuery<UserIdQuery>,
) -> Result<Response, ProblemResponse> {
    info!("Getting meal plan: {}", key);

    let result = match query.user_id {
        Some(user_id) => match parse_week(&key) {
            Ok(week) => svc.get_meal_plan(&user_id, week).await,
            Err(e) => Err(e),
        },
        None => svc.get_meal_plan_by_id(&key).await,
    };
    match result {
        Ok(plan) => Ok(ok(plan)),
        Err(e) => {
            error!("Failed to get meal plan {}: {}", key, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    put, path = "/api/meal-plans/{key}", tag = "meal-plans", operation_id = "krydd.update_meal_plan",
    params(("key" = String, Path, description = "Week start date"), UserIdQuery),
    request_body = MealPlanPatch,
    responses(
        (status = 200, description = "Updated plan", body = MealPlan),
        (status = 400, description = "Validation failed or userId missing", body = Problem),
        (status = 404, description = "Not Found", body = Problem),
        (status = 409, description = "Target week already has a plan", body = Problem),
    )
)]
pub async fn update_meal_plan(
    uri: Uri,
    Extension(svc): Extension<Arc<MealPlansService>>,
    Path(key): Path<String>,
    ApiQuery(query): ApiQuery<UserIdQuery>,
    ApiJson(patch): ApiJson<MealPlanPatch>,
) -> Result<Response, ProblemResponse> {
    info!("Updating meal plan for week {}", key);

    let result = match (require_user(query.user_id), parse_week(&key)) {
        (Ok(user_id), Ok(week)) => svc.update_meal_plan(&user_id, week, patch).await,
        (Err(e), _) | (_, Err(e)) => Err(e),
    };
    match result {
        Ok(plan) => Ok(ok(plan)),
        Err(e) => {
            error!("Failed to update meal plan {}: {}", key, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    patch, path = "/api/meal-plans/{key}/days", tag = "meal-plans",
    operation_id = "krydd.update_meal_plan_days",
    params(("key" = String, Path, description = "Week start date"), UserIdQuery),
    request_body = UpdateDaysReq,
    responses(
        (status = 200, description = "Plan with the days merged in", body = MealPlan),
        (status = 400, description = "Validation failed or userId missing", body = Problem),
        (status = 404, description = "Not Found", body = Problem),
    )
)]
pub async fn update_meal_plan_days(
    uri: Uri,
    Extension(svc): Extension<Arc<MealPlansService>>,
    Path(key): Path<String>,
    ApiQuery(query): ApiQuery<UserIdQuery>,
    ApiJson(req): ApiJson<UpdateDaysReq>,
) -> Result<Response, ProblemResponse> {
    info!("Updating {} days of meal plan for week {}", req.days.len(), key);

    let result = match (require_user(query.user_id), parse_week(&key)) {
        (Ok(user_id), Ok(week)) => svc.update_days(&user_id, week, req.days).await,
        (Err(e), _) | (_, Err(e)) => Err(e),
    };
    match result {
        Ok(plan) => Ok(ok(plan)),
        Err(e) => {
            error!("Failed to update days of meal plan {}: {}", key, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// With `userId` the key is the week start date; without it, the plan id.
#[utoipa::path(
    delete, path = "/api/meal-plans/{key}", tag = "meal-plans", operation_id = "krydd.delete_meal_plan",
    params(("key" = String, Path, description = "Plan id, or week start date with userId"), UserIdQuery),
    responses(
        (status = 200, description = "Plan deleted"),
        (status = 404, description = "Not Found", body = Problem),
    )
)]
pub async fn delete_meal_plan(
    uri: Uri,
    Extension(svc): Extension<Arc<MealPlansService>>,
    Path(key): Path<String>,
    ApiQuery(query): ApiQuery<UserIdQuery>,
) -> Result<Response, ProblemResponse> {
    info!("Deleting meal plan: {}", key);

    let result = match query.user_id {
        Some(user_id) => match parse_week(&key) {
            Ok(week) => svc.delete_meal_plan(&user_id, week).await,
            Err(e) => Err(e),
        },
        None => svc.delete_meal_plan_by_id(&key).await,
    };
    match result {
        Ok(()) => Ok(ok_message("Meal plan deleted successfully")),
        Err(e) => {
            error!("Failed to delete meal plan {}: {}", key, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    get, path = "/api/meal-plans/week/{weekStart}", tag = "meal-plans",
    operation_id = "krydd.list_meal_plans_by_week",
    params(("weekStart" = String, Path, description = "Week start date"), ListQuery),
    responses(
        (status = 200, description = "Page of plans for the week", body = Vec<MealPlan>),
        (status = 400, description = "Invalid date or cursor", body = Problem),
    )
)]
pub async fn list_meal_plans_by_week(
    uri: Uri,
    Extension(svc): Extension<Arc<MealPlansService>>,
    Path(week_start): Path<String>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Response, ProblemResponse> {
    info!("Listing meal plans for week {}", week_start);

    let result = match parse_week(&week_start) {
        Ok(week) => svc.list_by_week(week, query.into()).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(page) => Ok(ok_page(page.items, page.page_info.next_cursor)),
        Err(e) => {
            error!("Failed to list meal plans for week {}: {}", week_start, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

// ---------- search ----------

#[utoipa::path(
    post, path = "/api/search", tag = "search", operation_id = "krydd.semantic_search",
    request_body = SearchReq,
    responses(
        (status = 200, description = "Recipes ranked by similarity", body = SearchResultsDto),
        (status = 400, description = "Validation failed", body = Problem),
    )
)]
pub async fn semantic_search(
    uri: Uri,
    Extension(svc): Extension<Arc<SearchService>>,
    ApiJson(req): ApiJson<SearchReq>,
) -> Result<Response, ProblemResponse> {
    info!("Semantic search: {}", req.query);

    match svc.semantic_search(req.into()).await {
        Ok(results) => Ok(ok(SearchResultsDto {
            total_results: results.recipes.len(),
            recipes: results.recipes,
            query: results.query,
        })),
        Err(e) => {
            error!("Failed to search recipes: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    get, path = "/api/search", tag = "search", operation_id = "krydd.text_search",
    params(TextSearchQuery),
    responses(
        (status = 200, description = "Recipes ranked by similarity", body = SearchResultsDto),
        (status = 400, description = "Missing q", body = Problem),
    )
)]
pub async fn text_search(
    uri: Uri,
    Extension(svc): Extension<Arc<SearchService>>,
    ApiQuery(query): ApiQuery<TextSearchQuery>,
) -> Result<Response, ProblemResponse> {
    info!("Text search: {:?}", query.q);

    let result = match query.q.filter(|q| !q.is_empty()) {
        Some(q) => {
            svc.semantic_search(SearchRequest {
                query: q,
                max_results: query.max_results,
                ..Default::default()
            })
            .await
        }
        None => Err(DomainError::bad_request("Query parameter 'q' is required")),
    };
    match result {
        Ok(results) => Ok(ok(SearchResultsDto {
            total_results: results.recipes.len(),
            recipes: results.recipes,
            query: results.query,
        })),
        Err(e) => {
            error!("Failed to search recipes: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    post, path = "/api/search/ingredients", tag = "search",
    operation_id = "krydd.search_by_ingredients",
    request_body = IngredientSearchReq,
    responses(
        (status = 200, description = "Recipes ranked by ingredient similarity", body = IngredientResultsDto),
        (status = 400, description = "Validation failed", body = Problem),
    )
)]
pub async fn search_by_ingredients(
    uri: Uri,
    Extension(svc): Extension<Arc<SearchService>>,
    ApiJson(req): ApiJson<IngredientSearchReq>,
) -> Result<Response, ProblemResponse> {
    info!("Ingredient search: {:?}", req.ingredients);

    match svc
        .search_by_ingredients(&req.ingredients, req.max_results)
        .await
    {
        Ok(recipes) => Ok(ok(IngredientResultsDto {
            total_results: recipes.len(),
            recipes,
            query: req.ingredients,
        })),
        Err(e) => {
            error!("Failed to search by ingredients: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    get, path = "/api/search/recommendations", tag = "search",
    operation_id = "krydd.recommendations",
    params(UserIdQuery),
    responses((status = 200, description = "Recommended recipes", body = RecommendationsDto))
)]
pub async fn recommendations(
    uri: Uri,
    Extension(svc): Extension<Arc<SearchService>>,
    ApiQuery(query): ApiQuery<UserIdQuery>,
) -> Result<Response, ProblemResponse> {
    info!("Recommendations for user {:?}", query.user_id);

    match svc.recommendations(query.user_id.as_deref()).await {
        Ok(recipes) => Ok(ok(RecommendationsDto {
            recipes,
            recommendations: "Based on popular recipes".to_string(),
        })),
        Err(e) => {
            error!("Failed to build recommendations: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

// ---------- assistant ----------

#[utoipa::path(
    post, path = "/api/chat", tag = "chat", operation_id = "krydd.chat",
    request_body = ChatReq,
    responses(
        (status = 200, description = "Assistant reply", body = ChatReplyDto),
        (status = 400, description = "Validation failed", body = Problem),
    )
)]
pub async fn chat(
    uri: Uri,
    Extension(svc): Extension<Arc<AssistantService>>,
    ApiJson(mut req): ApiJson<ChatReq>,
) -> Result<Response, ProblemResponse> {
    info!("Chat message received ({} chars)", req.message.len());
    let context = req.context();

    match svc.chat(&req.message, context).await {
        Ok(reply) => Ok(ok(ChatReplyDto {
            response: reply.response,
            message_id: reply.message_id,
        })),
        Err(e) => {
            error!("Failed to chat: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    post, path = "/api/chat/search", tag = "chat", operation_id = "krydd.chat_search",
    request_body = ChatSearchReq,
    responses(
        (status = 200, description = "Found recipes with a summary", body = ChatSearchDto),
        (status = 400, description = "Validation failed", body = Problem),
    )
)]
pub async fn chat_search(
    uri: Uri,
    Extension(svc): Extension<Arc<AssistantService>>,
    ApiJson(req): ApiJson<ChatSearchReq>,
) -> Result<Response, ProblemResponse> {
    info!("Chat search: {}", req.message);

    match svc.chat_search(&req.message).await {
        Ok(reply) => Ok(ok(ChatSearchDto {
            total_results: reply.recipes.len(),
            recipes: reply.recipes,
            summary: reply.summary,
            search_query: reply.search_query,
        })),
        Err(e) => {
            error!("Failed to run chat search: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    post, path = "/api/chat/suggest", tag = "chat", operation_id = "krydd.suggest_recipes",
    request_body = SuggestReq,
    responses(
        (status = 200, description = "Recipe suggestions", body = SuggestionsDto),
        (status = 400, description = "Validation failed", body = Problem),
    )
)]
pub async fn suggest_recipes(
    uri: Uri,
    Extension(svc): Extension<Arc<AssistantService>>,
    ApiJson(req): ApiJson<SuggestReq>,
) -> Result<Response, ProblemResponse> {
    info!("Suggesting recipes for {} ingredients", req.ingredients.len());
    let preferences: SuggestPreferences = req.preferences.unwrap_or_default().into();

    match svc.suggest_recipes(&req.ingredients, &preferences).await {
        Ok(suggestions) => Ok(ok(SuggestionsDto {
            suggestions,
            based_on_ingredients: req.ingredients,
        })),
        Err(e) => {
            error!("Failed to suggest recipes: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    post, path = "/api/chat/meal-plan", tag = "chat", operation_id = "krydd.generate_meal_plan",
    request_body = MealPlanReq,
    responses(
        (status = 200, description = "Generated weekly plan", body = MealPlanSuggestionDto),
        (status = 400, description = "Validation failed", body = Problem),
    )
)]
pub async fn generate_meal_plan(
    uri: Uri,
    Extension(svc): Extension<Arc<AssistantService>>,
    ApiJson(req): ApiJson<MealPlanReq>,
) -> Result<Response, ProblemResponse> {
    let preferences = req.preferences.unwrap_or_default();
    info!("Generating meal plan with {} meals per day", preferences.meals_per_day);

    let requested: MealPlanPreferences = preferences.clone().into();

    match svc.generate_meal_plan(&requested).await {
        Ok(meal_plan) => Ok(ok(MealPlanSuggestionDto {
            meal_plan,
            preferences,
        })),
        Err(e) => {
            error!("Failed to generate meal plan: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    post, path = "/api/chat/substitutions", tag = "chat",
    operation_id = "krydd.suggest_substitutions",
    request_body = SubstitutionsReq,
    responses(
        (status = 200, description = "Ingredient substitutions", body = SubstitutionsDto),
        (status = 400, description = "Validation failed", body = Problem),
    )
)]
pub async fn suggest_substitutions(
    uri: Uri,
    Extension(svc): Extension<Arc<AssistantService>>,
    ApiJson(req): ApiJson<SubstitutionsReq>,
) -> Result<Response, ProblemResponse> {
    info!("Suggesting substitutions for {}", req.ingredient);

    match svc
        .suggest_substitutions(&req.ingredient, req.dietary_restriction.as_deref())
        .await
    {
        Ok(substitutions) => Ok(ok(SubstitutionsDto {
            ingredient: req.ingredient,
            substitutions,
            dietary_restriction: req.dietary_restriction,
        })),
        Err(e) => {
            error!("Failed to suggest substitutions: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
