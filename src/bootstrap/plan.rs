use crate::bootstrap::{UpgradeError, UpgradeErrorKind, UpgradeStep};

use semver::Version;
use std::collections::BTreeMap;
use std::fmt;


/// Lower bound of an upgrade run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Baseline {
    /// Steps at or above the version run.
    From(Version),
    /// Only steps strictly above the version run, e.g. the one already applied.
    After(Version),
}

impl Baseline {
    pub fn version(&self) -> &Version {
        match self {
            Self::From(version) | Self::After(version) => version,
        }
    }
}

impl fmt::Display for Baseline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::From(version) => write!(f, "from v{version}"),
            Self::After(version) => write!(f, "after v{version}"),
        }
    }
}


/// The steps of one upgrade run, in execution order.
///
/// Built from one snapshot of the step source: versions must be unique across
/// the whole snapshot, and only steps within the baseline are kept.
pub struct UpgradePlan {
    baseline: Baseline,
    inner: BTreeMap<Version, UpgradeStep>,
}

impl UpgradePlan {
    /// Keeps every step with version >= `from_version`.
    pub fn new(from_version: &Version, steps: Vec<UpgradeStep>) -> Result<Self, UpgradeError> {
        Self::with_baseline(Baseline::From(from_version.clone()), steps)
    }

    pub fn with_baseline(baseline: Baseline, steps: Vec<UpgradeStep>) -> Result<Self, UpgradeError> {
        let mut all = BTreeMap::new();
        for step in steps {
            let version = step.version.clone();
            if all.insert(version.clone(), step).is_some() {
                return Err(UpgradeError { kind: UpgradeErrorKind::DuplicateVersion(version) });
            }
        }

        let mut inner = all.split_off(baseline.version());
        if let Baseline::After(version) = &baseline {
            if inner.remove(version).is_some() {
                tracing::debug!("Skipping step v{version} (already applied)");
            }
        }
        for skipped in all.keys() {
            tracing::debug!("Skipping step v{skipped} (below baseline v{})", baseline.version());
        }

        Ok(UpgradePlan { baseline, inner })
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn versions(&self) -> impl Iterator<Item = &Version> {
        self.inner.keys()
    }

    /// Steps in ascending version order.
    pub fn iter(&self) -> impl Iterator<Item = &UpgradeStep> {
        self.inner.values()
    }
}
