use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, Clock, SeaOrmAuthService, SystemClock, TaskService};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    /// Credential store.
    pub users: Store,

    /// Task store. Same pool as `users` when both URLs match.
    pub tasks_db: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub task_service: Arc<TaskService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock)).await
    }

    pub async fn with_clock(config: Config, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let db = &config.database;

        let users =
            Store::with_pool_options(&db.users_url, db.max_connections, db.min_connections)
                .await?;

        let tasks_db = if config.shares_database() {
            users.clone()
        } else {
            info!("Tasks use a separate database");
            Store::with_pool_options(&db.tasks_url, db.max_connections, db.min_connections)
                .await?
        };

        let auth_service = Arc::new(SeaOrmAuthService::new(
            users.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let task_service = Arc::new(TaskService::new(Arc::new(tasks_db.task_repo()), clock));

        Ok(Self {
            config: Arc::new(config),
            users,
            tasks_db,
            auth_service,
            task_service,
        })
    }
}
