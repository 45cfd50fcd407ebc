//! Versioned upgrade orchestration run while a job-master bootstraps.
//!
//! An [`Upgradable`] asks its [`StepSource`] for the current set of
//! [`UpgradeStep`]s on every run, applies the ones at or above the baseline
//! version in ascending order, and rolls back what it applied if a step fails.
mod directory;
mod error;
mod plan;
mod step;
mod upgrade;

pub use directory::{DirectoryStepSource, ROLLBACK_FILE, UPGRADE_FILE};
pub use error::{UpgradeError, UpgradeErrorKind};
pub use plan::{Baseline, UpgradePlan};
pub use step::{StepAction, StepSource, UpgradeStep};
pub use upgrade::Upgradable;
