//! Application state - shared across all handlers.

use std::sync::Arc;

use forum_core::ForumServices;
use forum_core::ports::Repositories;
use forum_infra::{Argon2PasswordService, InMemoryStore, JwtConfig, JwtTokenService};

#[cfg(feature = "postgres")]
use forum_infra::{DatabaseConnections, PostgresStore};

use crate::config::{AppConfig, SessionConfig};

/// Which store backs the running server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Postgres => "postgres",
            StoreKind::Memory => "memory",
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub services: ForumServices,
    pub session: SessionConfig,
    pub store: StoreKind,
}

impl AppState {
    /// Build the application state, falling back to the in-memory store when
    /// no database is configured or reachable.
    pub async fn new(config: &AppConfig) -> Self {
        let (repos, store) = Self::repositories(config).await;
        let state = Self::with_repositories(
            repos,
            store,
            config.session.clone(),
            config.legacy_identity.clone(),
        );
        tracing::info!(store = store.as_str(), "Application state initialized");
        state
    }

    /// Self-contained state over a fresh in-memory store.
    pub fn in_memory(session: SessionConfig, legacy_identity: JwtConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::with_repositories(
            store.repositories(),
            StoreKind::Memory,
            session,
            legacy_identity,
        )
    }

    fn with_repositories(
        repos: Repositories,
        store: StoreKind,
        session: SessionConfig,
        legacy_identity: JwtConfig,
    ) -> Self {
        let services = ForumServices::new(
            repos,
            Arc::new(Argon2PasswordService::new()),
            Arc::new(JwtTokenService::new(legacy_identity)),
        );
        Self {
            services,
            session,
            store,
        }
    }

    #[cfg(feature = "postgres")]
    async fn repositories(config: &AppConfig) -> (Repositories, StoreKind) {
        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return (Arc::new(InMemoryStore::new()).repositories(), StoreKind::Memory);
        };

        match DatabaseConnections::init(db_config).await {
            Ok(connections) => (
                PostgresStore::new(connections.main).repositories(),
                StoreKind::Postgres,
            ),
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                (Arc::new(InMemoryStore::new()).repositories(), StoreKind::Memory)
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn repositories(_config: &AppConfig) -> (Repositories, StoreKind) {
        tracing::info!("Running without postgres feature - using in-memory store");
        (Arc::new(InMemoryStore::new()).repositories(), StoreKind::Memory)
    }
}
