use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::config::AppConfig;
use crate::memory::MemoryStore;
use crate::profiles::repo::{PgProfileRepo, ProfileRepo};
use crate::users::repo::{PgUserRepo, UserRepo};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub profiles: Arc<dyn ProfileRepo>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let Some(database_url) = config.database_url.clone() else {
            tracing::warn!("DATABASE_URL not set; using in-memory store, data is lost on restart");
            return Ok(Self::in_memory(config));
        };

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&database_url)
            .await
            .context("connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;

        Ok(Self::from_parts(
            config,
            Arc::new(PgUserRepo::new(db.clone())),
            Arc::new(PgProfileRepo::new(db)),
        ))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepo>,
        profiles: Arc<dyn ProfileRepo>,
    ) -> Self {
        Self {
            config,
            users,
            profiles,
        }
    }

    pub fn in_memory(config: Arc<AppConfig>) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::from_parts(config, store.clone(), store)
    }

    /// In-memory state with the test JWT settings.
    pub fn fake() -> Self {
        Self::in_memory(Arc::new(AppConfig::for_tests()))
    }
}
