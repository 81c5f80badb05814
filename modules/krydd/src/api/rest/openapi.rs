use utoipa::OpenApi;

use crate::api::rest::{dto, handlers};
use crate::contract::model;

#[derive(OpenApi)]
#[openapi(
    info(title = "Krydd API", description = "Recipes, meal plans, search and the cooking assistant"),
    paths(
        handlers::list_users,
        handlers::get_user,
        handlers::create_user,
        handlers::update_user,
        handlers::delete_user,
        handlers::list_recipes,
        handlers::get_recipe,
        handlers::create_recipe,
        handlers::update_recipe,
        handlers::delete_recipe,
        handlers::list_recipes_by_author,
        handlers::list_recipes_by_cuisine,
        handlers::list_meal_plans,
        handlers::create_meal_plan,
        handlers::get_meal_plan,
        handlers::update_meal_plan,
        handlers::update_meal_plan_days,
        handlers::delete_meal_plan,
        handlers::list_meal_plans_by_week,
        handlers::semantic_search,
        handlers::text_search,
        handlers::search_by_ingredients,
        handlers::recommendations,
        handlers::chat,
        handlers::chat_search,
        handlers::suggest_recipes,
        handlers::generate_meal_plan,
        handlers::suggest_substitutions,
    ),
    components(schemas(
        model::User,
        model::Recipe,
        model::MealPlan,
        model::ScoredRecipe,
        dto::SearchResultsDto,
        dto::ChatReplyDto,
        krydd_http::Problem,
        krydd_http::ValidationError,
    )),
    tags(
        (name = "users"),
        (name = "recipes"),
        (name = "meal-plans"),
        (name = "search"),
        (name = "chat"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route_group() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/users/{email}",
            "/api/recipes/cuisine/{cuisine}",
            "/api/meal-plans/{key}/days",
            "/api/search/ingredients",
            "/api/chat/substitutions",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
