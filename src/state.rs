use crate::config::AppConfig;
use crate::storage::{ObjectStorage, StorageClient};
use crate::users::repo::{PgUserStore, UserStore};
use anyhow::Context;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub config: Arc<AppConfig>,
    pub storage: Arc<dyn StorageClient>,
}

impl AppState {
    /// Connects the pool and wires the production backends. The pool is
    /// returned too so the caller can run migrations on it.
    pub async fn init(config: AppConfig) -> anyhow::Result<(Self, PgPool)> {
        let config = Arc::new(config);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let users = Arc::new(PgUserStore::new(db.clone())) as Arc<dyn UserStore>;
        let storage = Arc::new(ObjectStorage::new(&config.storage)) as Arc<dyn StorageClient>;

        Ok((Self::from_parts(users, config, storage), db))
    }

    pub fn from_parts(
        users: Arc<dyn UserStore>,
        config: Arc<AppConfig>,
        storage: Arc<dyn StorageClient>,
    ) -> Self {
        Self {
            users,
            config,
            storage,
        }
    }
}
