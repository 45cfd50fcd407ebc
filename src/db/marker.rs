use crate::db::{EngineError, EngineErrorKind, MySqlExecutor};

use semver::Version;
use sqlx::MySqlPool;
use tokio::sync::Mutex;


/// Persisted indicator of the currently applied version.
///
/// Only upgrade and rollback actions write to it.
#[async_trait::async_trait]
pub trait VersionMarker: Send + Sync {
    async fn load(&self) -> Result<Option<Version>, EngineError>;

    /// `None` clears the marker.
    async fn store(&self, version: Option<&Version>) -> Result<(), EngineError>;
}


#[derive(Debug, Default)]
pub struct MemoryMarker {
    inner: Mutex<Option<Version>>,
}

impl MemoryMarker {
    pub fn new(initial: Option<Version>) -> Self {
        MemoryMarker { inner: Mutex::new(initial) }
    }
}

#[async_trait::async_trait]
impl VersionMarker for MemoryMarker {
    async fn load(&self) -> Result<Option<Version>, EngineError> {
        Ok(self.inner.lock().await.clone())
    }

    async fn store(&self, version: Option<&Version>) -> Result<(), EngineError> {
        *self.inner.lock().await = version.cloned();
        Ok(())
    }
}


const MARKER_TABLE: &str = "dm_bootstrap_version";

// SQLSTATE of "Table doesn't exist"
const NO_SUCH_TABLE: &str = "42S02";

fn is_missing_table(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(e) => e.code().as_deref() == Some(NO_SUCH_TABLE),
        _ => false,
    }
}

/// Single-row marker table in the job-master metadata database.
pub struct MySqlMarker {
    pool: MySqlPool,
}

impl MySqlMarker {
    pub fn from_executor(executor: &MySqlExecutor) -> Self {
        MySqlMarker { pool: executor.pool().clone() }
    }

    pub async fn ensure_table(&self) -> Result<(), EngineError> {
        sqlx::query(&format!(r#"
            CREATE TABLE IF NOT EXISTS {MARKER_TABLE} (
                id TINYINT UNSIGNED NOT NULL PRIMARY KEY,
                version VARCHAR(128) NOT NULL,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
            )
        "#))
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl VersionMarker for MySqlMarker {
    async fn load(&self) -> Result<Option<Version>, EngineError> {
        let result: Result<Option<String>, sqlx::Error> = sqlx::query_scalar(
            &format!("SELECT version FROM {MARKER_TABLE} WHERE id = 1")
        )
            .fetch_optional(&self.pool)
            .await;

        // Before ensure_table has run nothing can have been stored
        let value = match result {
            Err(e) if is_missing_table(&e) => {
                tracing::debug!("Marker table {MARKER_TABLE} does not exist yet");
                None
            }
            other => other?,
        };

        value
            .map(|value| {
                Version::parse(&value).map_err(|source| EngineError {
                    kind: EngineErrorKind::InvalidStoredVersion { value, source },
                })
            })
            .transpose()
    }

    async fn store(&self, version: Option<&Version>) -> Result<(), EngineError> {
        match version {
            Some(version) => {
                sqlx::query(&format!(r#"
                    INSERT INTO {MARKER_TABLE} (id, version)
                    VALUES (1, ?)
                    ON DUPLICATE KEY UPDATE version = VALUES(version)
                "#))
                    .bind(version.to_string())
                    .execute(&self.pool)
                    .await?;
            }
            None => {
                sqlx::query(&format!("DELETE FROM {MARKER_TABLE} WHERE id = 1"))
                    .execute(&self.pool)
                    .await?;
            }
        }

        Ok(())
    }
}
