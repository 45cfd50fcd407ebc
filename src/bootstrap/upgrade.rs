use crate::bootstrap::{Baseline, StepSource, UpgradeError, UpgradeErrorKind, UpgradePlan, UpgradeStep};
use crate::context::UpgradeContext;
use crate::db::{EngineError, VersionMarker};

use semver::Version;
use std::sync::Arc;
use tracing::Instrument;


/// Owner of the version marker and the step source of one job-master process.
///
/// [`Upgradable::upgrade`] takes `&mut self`: runs on the same upgradable are
/// never concurrent. Share it behind an async mutex if several tasks need it.
pub struct Upgradable {
    marker: Arc<dyn VersionMarker>,
    source: Arc<dyn StepSource>,
    logger: Option<tracing::Span>,
}

impl Upgradable {
    pub fn new(marker: Arc<dyn VersionMarker>, source: Arc<dyn StepSource>) -> Self {
        Upgradable { marker, source, logger: None }
    }

    /// Records every upgrade run under `logger` instead of a fresh `upgrade` span.
    pub fn with_logger(mut self, logger: tracing::Span) -> Self {
        self.logger = Some(logger);
        self
    }

    pub async fn current_version(&self) -> Result<Option<Version>, EngineError> {
        self.marker.load().await
    }

    /// Baseline that continues after the stored version, or starts from
    /// 0.0.0 when nothing is stored yet.
    pub async fn stored_baseline(&self) -> Result<Baseline, UpgradeError> {
        let stored = self
            .current_version()
            .await
            .map_err(|e| UpgradeError { kind: UpgradeErrorKind::Marker(e) })?;

        Ok(match stored {
            Some(version) => Baseline::After(version),
            None => Baseline::From(Version::new(0, 0, 0)),
        })
    }

    /// Fetches a fresh snapshot from the step source and selects the steps
    /// that an upgrade from `from_version` would run.
    pub fn plan(&self, from_version: &Version) -> Result<UpgradePlan, UpgradeError> {
        self.plan_with(&Baseline::From(from_version.clone()))
    }

    pub fn plan_with(&self, baseline: &Baseline) -> Result<UpgradePlan, UpgradeError> {
        let steps = self.source
            .upgrade_steps()
            .map_err(|e| UpgradeError { kind: UpgradeErrorKind::Source(e) })?;

        UpgradePlan::with_baseline(baseline.clone(), steps)
    }

    /// Runs every step with a version at or above `from_version`, in ascending order.
    ///
    /// On the first failure, forward progress stops and every step whose
    /// upgrade action ran, the failing one included, is rolled back in
    /// reverse order. Rollback failures are logged and skipped. The error
    /// of the failing step is returned as-is.
    pub async fn upgrade(&mut self, ctx: &UpgradeContext, from_version: &Version) -> Result<(), UpgradeError> {
        self.upgrade_with(ctx, &Baseline::From(from_version.clone())).await
    }

    /// Runs only the steps above the stored version, so the step that is
    /// already applied is not run again.
    pub async fn resume(&mut self, ctx: &UpgradeContext) -> Result<(), UpgradeError> {
        let baseline = self.stored_baseline().await?;
        self.upgrade_with(ctx, &baseline).await
    }

    pub async fn upgrade_with(&mut self, ctx: &UpgradeContext, baseline: &Baseline) -> Result<(), UpgradeError> {
        let logger = self
            .logger
            .clone()
            .unwrap_or_else(|| tracing::info_span!("upgrade"));
        self.run(ctx, baseline)
            .instrument(logger)
            .await
    }

    async fn run(&self, ctx: &UpgradeContext, baseline: &Baseline) -> Result<(), UpgradeError> {
        tracing::info!(%baseline, "Start upgrading");

        let plan = self.plan_with(baseline)?;
        if plan.is_empty() {
            tracing::info!("No upgrade steps to run");
            return Ok(());
        }

        let mut applied: Vec<&UpgradeStep> = Vec::with_capacity(plan.len());
        let mut failure = None;

        for step in plan.iter() {
            if let Some(reason) = ctx.err() {
                tracing::warn!(version = %step.version, %reason, "Upgrade interrupted");
                failure = Some(UpgradeError {
                    kind: UpgradeErrorKind::Cancelled { version: step.version.clone(), reason },
                });
                break;
            }

            tracing::info!(version = %step.version, "Upgrading...");
            let result = step.upgrade(ctx.clone()).await;
            // A failed step may have partially applied, so it is rolled back too.
            applied.push(step);

            if let Err(source) = result {
                tracing::error!(version = %step.version, error = %source, "Upgrade step failed");
                failure = Some(UpgradeError {
                    kind: UpgradeErrorKind::Step { version: step.version.clone(), source },
                });
                break;
            }
        }

        match failure {
            None => {
                tracing::info!(steps = plan.len(), "Upgrade completed");
                Ok(())
            }
            Some(error) => {
                self.rollback(ctx, applied).await;
                Err(error)
            }
        }
    }

    async fn rollback(&self, ctx: &UpgradeContext, applied: Vec<&UpgradeStep>) {
        tracing::info!(steps = applied.len(), "Rolling back applied steps");

        for step in applied.into_iter().rev() {
            match step.rollback(ctx.clone()).await {
                None => {
                    tracing::debug!(version = %step.version, "No rollback defined");
                }
                Some(Ok(())) => {
                    tracing::info!(version = %step.version, "Rolled back");
                }
                Some(Err(error)) => {
                    tracing::warn!(version = %step.version, error = %error, "Failed to roll back upgrade step");
                }
            }
        }
    }
}
