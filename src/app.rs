//! Application state and router assembly.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::TokenService;
use crate::criteria::{
    DistrictSearchCriteria, FamilySearchCriteria, MunicipalitySearchCriteria, ProvinceSearchCriteria,
    SearchCriteria, UserSearchCriteria, WardSearchCriteria,
};
use crate::database::models::{District, Family, Municipality, Province, User, Ward};
use crate::database::{DatabaseError, Entity, EntityStore, MemoryStore, Repository};
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::SearchService;

/// One store per searchable entity.
pub struct Stores {
    pub users: Arc<dyn EntityStore<User>>,
    pub families: Arc<dyn EntityStore<Family>>,
    pub provinces: Arc<dyn EntityStore<Province>>,
    pub districts: Arc<dyn EntityStore<District>>,
    pub municipalities: Arc<dyn EntityStore<Municipality>>,
    pub wards: Arc<dyn EntityStore<Ward>>,
}

impl Stores {
    /// Empty in-memory stores.
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryStore::<User>::default()),
            families: Arc::new(MemoryStore::<Family>::default()),
            provinces: Arc::new(MemoryStore::<Province>::default()),
            districts: Arc::new(MemoryStore::<District>::default()),
            municipalities: Arc::new(MemoryStore::<Municipality>::default()),
            wards: Arc::new(MemoryStore::<Ward>::default()),
        }
    }

    /// Postgres-backed stores sharing one pool.
    pub fn postgres(pool: PgPool, log_queries: bool, slow_query_threshold: Option<Duration>) -> Self {
        Self {
            users: Arc::new(Repository::<User>::new(pool.clone()).with_logging(log_queries, slow_query_threshold)),
            families: Arc::new(Repository::<Family>::new(pool.clone()).with_logging(log_queries, slow_query_threshold)),
            provinces: Arc::new(Repository::<Province>::new(pool.clone()).with_logging(log_queries, slow_query_threshold)),
            districts: Arc::new(Repository::<District>::new(pool.clone()).with_logging(log_queries, slow_query_threshold)),
            municipalities: Arc::new(
                Repository::<Municipality>::new(pool.clone()).with_logging(log_queries, slow_query_threshold),
            ),
            wards: Arc::new(Repository::<Ward>::new(pool).with_logging(log_queries, slow_query_threshold)),
        }
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        tokio::try_join!(
            self.users.health_check(),
            self.families.health_check(),
            self.provinces.health_check(),
            self.districts.health_check(),
            self.municipalities.health_check(),
            self.wards.health_check(),
        )?;
        Ok(())
    }
}

/// Binds an entity to its criteria type, route segment and store.
pub trait Searchable: Entity {
    type Criteria: SearchCriteria<Entity = Self>;

    /// Route segment under `/api`, e.g. `users`.
    const PATH: &'static str;

    fn store(stores: &Stores) -> &Arc<dyn EntityStore<Self>>;
}

macro_rules! searchable {
    ($entity:ty, $criteria:ty, $path:literal, $store:ident) => {
        impl Searchable for $entity {
            type Criteria = $criteria;
            const PATH: &'static str = $path;

            fn store(stores: &Stores) -> &Arc<dyn EntityStore<Self>> {
                &stores.$store
            }
        }
    };
}

searchable!(User, UserSearchCriteria, "users", users);
searchable!(Family, FamilySearchCriteria, "families", families);
searchable!(Province, ProvinceSearchCriteria, "provinces", provinces);
searchable!(District, DistrictSearchCriteria, "districts", districts);
searchable!(Municipality, MunicipalitySearchCriteria, "municipalities", municipalities);
searchable!(Ward, WardSearchCriteria, "wards", wards);

#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub stores: Arc<Stores>,
    pub search: SearchService,
    /// Per-request bound on store queries.
    pub query_timeout: Duration,
    /// Per-request bound on revocation store round trips.
    pub revocation_timeout: Duration,
}

impl AppState {
    pub fn new(
        tokens: Arc<TokenService>,
        stores: Stores,
        search: SearchService,
        query_timeout: Duration,
        revocation_timeout: Duration,
    ) -> Self {
        Self { tokens, stores: Arc::new(stores), search, query_timeout, revocation_timeout }
    }
}

/// Full router: public routes plus the bearer-protected `/api` tree.
pub fn app(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/auth/refresh", post(public::auth::refresh_post))
        // Protected
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/whoami", get(protected::auth::whoami_get))
        .route("/api/auth/logout", post(protected::auth::logout_post))
        .merge(entity_routes::<User>())
        .merge(entity_routes::<Family>())
        .merge(entity_routes::<Province>())
        .merge(entity_routes::<District>())
        .merge(entity_routes::<Municipality>())
        .merge(entity_routes::<Ward>())
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn entity_routes<E: Searchable>() -> Router<AppState> {
    Router::new()
        .route(&format!("/api/{}/search", E::PATH), post(protected::search::search_post::<E>))
        .route(&format!("/api/{}/fields", E::PATH), get(protected::fields::fields_get::<E>))
}
