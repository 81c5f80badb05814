use std::sync::Arc;

use table_store::TableStore;
use tracing::{debug, info};

use crate::api::rest::{self, KryddServices};
use crate::config::KryddConfig;
use crate::domain::ports::{Clock, IdGenerator, LanguageModel, ObjectStore};
use crate::domain::search::EmbeddingIndex;
use crate::domain::service::{
    AssistantService, MealPlansService, RecipesService, SearchService, UsersService,
};
use crate::infra::storage::{
    TableMealPlansRepository, TableRecipesRepository, TableUsersRepository,
};

/// Backends the module is built on. The server picks the implementations.
#[derive(Clone)]
pub struct KryddDeps {
    pub table: Arc<dyn TableStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub model: Arc<dyn LanguageModel>,
    pub clock: Arc<dyn Clock>,
    pub ids: Arc<dyn IdGenerator>,
}

/// Wired Krydd module: repositories and services over one table.
pub struct Krydd {
    services: KryddServices,
}

impl Krydd {
    pub fn init(deps: KryddDeps, cfg: &KryddConfig) -> Self {
        info!("Initializing krydd module");
        debug!(
            "Loaded krydd config: recipes page={}/{}, embeddings enabled={}",
            cfg.pagination.recipes.default, cfg.pagination.recipes.max, cfg.embeddings.enabled
        );

        let users_repo = Arc::new(TableUsersRepository::new(
            deps.table.clone(),
            cfg.pagination.users,
        ));
        let recipes_repo = Arc::new(TableRecipesRepository::new(
            deps.table.clone(),
            deps.clock.clone(),
            deps.ids.clone(),
            cfg.pagination.recipes,
        ));
        let meal_plans_repo = Arc::new(TableMealPlansRepository::new(
            deps.table,
            deps.clock.clone(),
            deps.ids.clone(),
            cfg.pagination,
        ));

        let index = EmbeddingIndex::new(
            deps.objects,
            deps.model.clone(),
            deps.clock,
            cfg.embeddings.prefix.clone(),
        );
        let search = Arc::new(SearchService::new(
            recipes_repo.clone(),
            index.clone(),
            cfg.search,
        ));
        let embeddings = cfg.embeddings.enabled.then_some(index);

        let services = KryddServices {
            users: Arc::new(UsersService::new(users_repo)),
            recipes: Arc::new(RecipesService::new(recipes_repo.clone(), embeddings)),
            meal_plans: Arc::new(MealPlansService::new(meal_plans_repo)),
            assistant: Arc::new(AssistantService::new(
                deps.model,
                recipes_repo,
                search.clone(),
                deps.ids,
                cfg.assistant,
            )),
            search,
        };
        info!("Krydd module initialized");
        Self { services }
    }

    pub fn services(&self) -> &KryddServices {
        &self.services
    }

    /// `/api` routes backed by this module's services.
    pub fn router(&self) -> axum::Router {
        info!("Registering krydd REST routes");
        rest::router(self.services.clone())
    }
}
