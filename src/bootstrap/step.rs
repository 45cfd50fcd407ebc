use crate::context::UpgradeContext;

use semver::Version;
use std::fmt;
use std::future::Future;


/// One forward or compensating action of an upgrade step.
///
/// Implemented for any `Fn(UpgradeContext) -> impl Future<Output = anyhow::Result<()>>`,
/// so steps are usually built from closures.
#[async_trait::async_trait]
pub trait StepAction: Send + Sync {
    async fn run(&self, ctx: UpgradeContext) -> anyhow::Result<()>;
}

#[async_trait::async_trait]
impl<F, Fut> StepAction for F
where
    F: Fn(UpgradeContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn run(&self, ctx: UpgradeContext) -> anyhow::Result<()> {
        (self)(ctx).await
    }
}


/// A versioned unit of upgrade logic with an optional rollback.
pub struct UpgradeStep {
    pub version: Version,
    upgrade: Box<dyn StepAction>,
    rollback: Option<Box<dyn StepAction>>,
}

impl UpgradeStep {
    pub fn new(version: Version, upgrade: impl StepAction + 'static) -> Self {
        UpgradeStep { version, upgrade: Box::new(upgrade), rollback: None }
    }

    pub fn with_rollback(mut self, rollback: impl StepAction + 'static) -> Self {
        self.rollback = Some(Box::new(rollback));
        self
    }

    pub fn has_rollback(&self) -> bool {
        self.rollback.is_some()
    }

    pub async fn upgrade(&self, ctx: UpgradeContext) -> anyhow::Result<()> {
        self.upgrade.run(ctx).await
    }

    /// Returns `None` if the step has no rollback.
    pub async fn rollback(&self, ctx: UpgradeContext) -> Option<anyhow::Result<()>> {
        match &self.rollback {
            Some(rollback) => Some(rollback.run(ctx).await),
            None => None,
        }
    }
}

impl fmt::Debug for UpgradeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpgradeStep")
            .field("version", &self.version)
            .field("rollback", &self.has_rollback())
            .finish()
    }
}


/// Supplies the current set of upgrade steps.
///
/// Queried once at the start of every upgrade run and never cached,
/// so the set may change between runs.
pub trait StepSource: Send + Sync {
    fn upgrade_steps(&self) -> anyhow::Result<Vec<UpgradeStep>>;
}

impl<F> StepSource for F
where
    F: Fn() -> anyhow::Result<Vec<UpgradeStep>> + Send + Sync,
{
    fn upgrade_steps(&self) -> anyhow::Result<Vec<UpgradeStep>> {
        (self)()
    }
}
