use crate::bootstrap::{StepAction, StepSource, UpgradeStep};
use crate::context::UpgradeContext;
use crate::db::{SqlExecutor, VersionMarker};
use crate::parser::{self, StatementCollection};

use anyhow::Context;
use semver::Version;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;


pub const UPGRADE_FILE: &str = "up.sql";
pub const ROLLBACK_FILE: &str = "down.sql";


/// Step source backed by a directory of SQL scripts:
///
/// ```text
/// upgrades/
///   6.1.0_create_task_table/up.sql
///   6.2.1_add_status_index/up.sql
///   6.2.1_add_status_index/down.sql
/// ```
///
/// The directory is read again on every call, so editing it between runs
/// changes what the next run does.
pub struct DirectoryStepSource {
    directory: PathBuf,
    executor: Arc<dyn SqlExecutor>,
    marker: Arc<dyn VersionMarker>,
}

impl DirectoryStepSource {
    pub fn new(
        directory: impl Into<PathBuf>,
        executor: Arc<dyn SqlExecutor>,
        marker: Arc<dyn VersionMarker>,
    ) -> Self {
        DirectoryStepSource { directory: directory.into(), executor, marker }
    }

    fn load_step(&self, version: Version, path: &Path) -> anyhow::Result<UpgradeStep> {
        let upgrade = StatementCollection::from_file(&path.join(UPGRADE_FILE))?;

        let rollback_path = path.join(ROLLBACK_FILE);
        let rollback = if rollback_path.is_file() {
            Some(StatementCollection::from_file(&rollback_path)?)
        } else {
            None
        };
        tracing::debug!(
            "Loaded step v{version} from {path:?}: {} upgrade / {} rollback statement(s)",
            upgrade.len(),
            rollback.as_ref().map_or(0, |r| r.len()),
        );

        // Marker value the upgrade action replaced, restored by the rollback action.
        let previous: Arc<Mutex<Option<Option<Version>>>> = Arc::default();

        let step = UpgradeStep::new(
            version.clone(),
            ScriptAction {
                version: version.clone(),
                statements: Arc::new(upgrade),
                executor: self.executor.clone(),
                marker: self.marker.clone(),
                previous: previous.clone(),
            }.upgrade(),
        );

        Ok(match rollback {
            Some(statements) => step.with_rollback(
                ScriptAction {
                    version,
                    statements: Arc::new(statements),
                    executor: self.executor.clone(),
                    marker: self.marker.clone(),
                    previous,
                }.rollback(),
            ),
            None => step,
        })
    }
}

impl StepSource for DirectoryStepSource {
    fn upgrade_steps(&self) -> anyhow::Result<Vec<UpgradeStep>> {
        tracing::info!("Loading upgrade steps from {:?}", self.directory);

        parser::collect_versions_from_directory(&self.directory)?
            .into_iter()
            .map(|(version, path)| {
                self.load_step(version.clone(), &path)
                    .with_context(|| format!("Failed to load upgrade step v{version} from {path:?}"))
            })
            .collect()
    }
}


/// Runs one SQL script and keeps the version marker in step with it.
struct ScriptAction {
    version: Version,
    statements: Arc<StatementCollection>,
    executor: Arc<dyn SqlExecutor>,
    marker: Arc<dyn VersionMarker>,
    previous: Arc<Mutex<Option<Option<Version>>>>,
}

impl ScriptAction {
    fn upgrade(self) -> ScriptUpgrade {
        ScriptUpgrade(self)
    }

    fn rollback(self) -> ScriptRollback {
        ScriptRollback(self)
    }

    async fn execute(&self, ctx: &UpgradeContext) -> anyhow::Result<()> {
        for statement in self.statements.iter() {
            if let Some(reason) = ctx.err() {
                return Err(reason.into());
            }
            self.executor.execute(statement).await?;
        }
        Ok(())
    }
}

struct ScriptUpgrade(ScriptAction);

#[async_trait::async_trait]
impl StepAction for ScriptUpgrade {
    async fn run(&self, ctx: UpgradeContext) -> anyhow::Result<()> {
        let action = &self.0;
        let version = &action.version;

        async {
            let current = action.marker.load().await?;
            *action.previous.lock().await = Some(current);

            action.execute(&ctx).await?;
            action.marker.store(Some(version)).await?;
            anyhow::Ok(())
        }
            .await
            .with_context(|| format!("failed to upgrade to v{version}"))
    }
}

struct ScriptRollback(ScriptAction);

#[async_trait::async_trait]
impl StepAction for ScriptRollback {
    async fn run(&self, ctx: UpgradeContext) -> anyhow::Result<()> {
        let action = &self.0;
        let version = &action.version;

        async {
            action.execute(&ctx).await?;

            // Nothing to restore if the upgrade never got to read the marker
            let previous = action.previous.lock().await.take();
            if let Some(previous) = previous {
                action.marker.store(previous.as_ref()).await?;
            }
            anyhow::Ok(())
        }
            .await
            .with_context(|| format!("failed to rollback v{version}"))
    }
}
