//! Domain services with the business rules on top of the repository ports.
//! They depend only on ports, never on infra types.

pub mod assistant;
pub mod meal_plans;
pub mod recipes;
pub mod search;
pub mod users;

pub use assistant::AssistantService;
pub use meal_plans::MealPlansService;
pub use recipes::{RecipeFilter, RecipesService};
pub use search::{SearchRequest, SearchResults, SearchService};
pub use users::UsersService;
