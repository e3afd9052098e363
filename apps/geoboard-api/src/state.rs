//! Application state - shared across all handlers.

use std::sync::Arc;

use geoboard_core::geofence::{GeofenceConfig, GeofenceEvaluator};
use geoboard_core::lifecycle::LifecyclePolicy;
use geoboard_core::ports::{BoardRepository, PostRepository, ThreadRepository};
use geoboard_core::service::{BoardService, LifecycleService, ThreadService};
use geoboard_infra::{InMemoryStore, seed_boards};

#[cfg(feature = "postgres")]
use geoboard_infra::database::{
    DatabaseConnections, PostgresBoardRepository, PostgresPostRepository, PostgresThreadRepository,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub boards: BoardService,
    pub threads: ThreadService,
    pub lifecycle: LifecycleService,
    pub cron_secret: Option<Arc<str>>,
    /// `postgres` or `memory`, reported by the health endpoint.
    pub storage: &'static str,
}

/// The three repositories the services are built from.
pub struct Repositories {
    pub boards: Arc<dyn BoardRepository>,
    pub threads: Arc<dyn ThreadRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub storage: &'static str,
}

impl Repositories {
    pub fn in_memory(store: InMemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            boards: store.clone(),
            threads: store.clone(),
            posts: store,
            storage: "memory",
        }
    }

    /// In-memory repositories preloaded with the seed boards.
    pub fn seeded() -> Self {
        let boards = seed_boards();
        tracing::info!(boards = boards.len(), "Loaded seed boards into in-memory store");
        Self::in_memory(InMemoryStore::with_boards(boards))
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(connections: &DatabaseConnections) -> Self {
        Self {
            boards: Arc::new(PostgresBoardRepository::shared(connections.main.clone())),
            threads: Arc::new(PostgresThreadRepository::shared(connections.main.clone())),
            posts: Arc::new(PostgresPostRepository::shared(connections.main.clone())),
            storage: "postgres",
        }
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let repositories = Self::connect(config).await;
        let state = Self::from_repositories(repositories, config);
        tracing::info!(storage = state.storage, "Application state initialized");
        state
    }

    #[cfg(feature = "postgres")]
    async fn connect(config: &AppConfig) -> Repositories {
        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Repositories::seeded();
        };

        match DatabaseConnections::init(db_config).await {
            Ok(connections) => Repositories::postgres(&connections),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Failed to connect to database. Using in-memory fallback."
                );
                Repositories::seeded()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn connect(_config: &AppConfig) -> Repositories {
        tracing::info!("Running without postgres feature - using in-memory repositories");
        Repositories::seeded()
    }

    pub fn from_repositories(repositories: Repositories, config: &AppConfig) -> Self {
        let policy = LifecyclePolicy::from_hours(config.thread_lifetime_hours);
        let geofence = GeofenceEvaluator::new(GeofenceConfig {
            fallback_viewpoint: config.fallback_viewpoint,
            ..GeofenceConfig::default()
        });

        let boards = BoardService::new(repositories.boards, geofence);
        let threads = ThreadService::new(
            boards.clone(),
            repositories.threads.clone(),
            repositories.posts,
            policy,
        );
        let lifecycle = LifecycleService::new(repositories.threads, policy);

        Self {
            boards,
            threads,
            lifecycle,
            cron_secret: config.cron_secret.as_deref().map(Arc::from),
            storage: repositories.storage,
        }
    }
}
