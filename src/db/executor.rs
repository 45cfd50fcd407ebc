use crate::db::{DbConfig, EngineError};

use sqlx::MySqlPool;


/// Runs raw SQL against one database instance.
#[async_trait::async_trait]
pub trait SqlExecutor: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<(), EngineError>;
}

/// Hands out an executor for a [`DbConfig`].
#[async_trait::async_trait]
pub trait DbProvider: Send + Sync {
    async fn apply(&self, cfg: &DbConfig) -> Result<Box<dyn SqlExecutor>, EngineError>;
}


pub struct MySqlExecutor {
    pool: MySqlPool,
}

impl MySqlExecutor {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlExecutor { pool }
    }

    pub async fn connect(cfg: &DbConfig) -> Result<Self, EngineError> {
        let pool = MySqlPool::connect_with(cfg.connect_options()).await?;
        Ok(MySqlExecutor { pool })
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl SqlExecutor for MySqlExecutor {
    async fn execute(&self, sql: &str) -> Result<(), EngineError> {
        tracing::debug!("Executing: {sql}");

        // Session and DDL statements cannot go through the prepared statement protocol
        sqlx::raw_sql(sql)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}


/// Connects to MySQL-compatible instances with a fresh pool per config.
#[derive(Clone, Copy, Debug, Default)]
pub struct MySqlProvider;

#[async_trait::async_trait]
impl DbProvider for MySqlProvider {
    async fn apply(&self, cfg: &DbConfig) -> Result<Box<dyn SqlExecutor>, EngineError> {
        tracing::debug!("Connecting to {cfg}");
        Ok(Box::new(MySqlExecutor::connect(cfg).await?))
    }
}
