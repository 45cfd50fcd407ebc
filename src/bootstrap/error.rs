use crate::context::ContextError;
use crate::db::EngineError;

use semver::Version;
use std::error::Error;
use std::fmt;


/// Failure of one upgrade run.
///
/// A failing step's error is displayed verbatim, so callers can match on
/// the exact message the step produced.
#[derive(Debug)]
#[non_exhaustive]
pub struct UpgradeError {
    pub kind: UpgradeErrorKind
}

impl UpgradeError {
    /// Version of the step that failed or was interrupted.
    pub fn version(&self) -> Option<&Version> {
        match &self.kind {
            UpgradeErrorKind::Cancelled { version, .. } => Some(version),
            UpgradeErrorKind::Step { version, .. } => Some(version),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, UpgradeErrorKind::Cancelled { .. })
    }
}

impl fmt::Display for UpgradeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl Error for UpgradeError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		self.kind.source()
	}
}

#[derive(Debug)]
pub enum UpgradeErrorKind {
    Cancelled { version: Version, reason: ContextError },
    DuplicateVersion(Version),
    Marker(EngineError),
    Source(anyhow::Error),
    Step { version: Version, source: anyhow::Error },
}

impl fmt::Display for UpgradeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled { reason, .. } => write!(f, "{reason}"),
            Self::DuplicateVersion(version) => write!(f, "Duplicate upgrade step version: v{version}"),
            Self::Marker(error) => write!(f, "Failed to read version marker: {error}"),
            Self::Source(error) => write!(f, "Failed to fetch upgrade steps: {error}"),
            Self::Step { source, .. } => write!(f, "{source}"),
        }
    }
}

impl Error for UpgradeErrorKind {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			Self::Cancelled { reason, .. } => Some(reason),
			Self::Marker(source) => Some(source),
			Self::Source(source) => Some(&**source),
			// The step error is already the message; expose what it wraps.
			Self::Step { source, .. } => source.source(),
			_ => None,
		}
	}
}


#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::error::Error;

    #[test]
    fn step_error_is_displayed_verbatim() {
        let err = UpgradeError {
            kind: UpgradeErrorKind::Step {
                version: Version::new(6, 3, 0),
                source: anyhow::anyhow!("failed to upgrade to v6.3.0"),
            },
        };
        assert_eq!(err.to_string(), "failed to upgrade to v6.3.0");
        assert_eq!(err.version(), Some(&Version::new(6, 3, 0)));
        assert!(err.source().is_none());
    }

    #[test]
    fn step_error_exposes_wrapped_cause() {
        let source = Err::<(), _>(std::io::Error::other("disk full"))
            .context("failed to upgrade to v6.2.1")
            .unwrap_err();
        let err = UpgradeError {
            kind: UpgradeErrorKind::Step { version: Version::new(6, 2, 1), source },
        };
        assert_eq!(err.to_string(), "failed to upgrade to v6.2.1");
        assert_eq!(err.source().unwrap().to_string(), "disk full");
    }

    #[test]
    fn cancellation_displays_reason() {
        let err = UpgradeError {
            kind: UpgradeErrorKind::Cancelled {
                version: Version::new(6, 2, 1),
                reason: ContextError::DeadlineExceeded,
            },
        };
        assert!(err.is_cancelled());
        assert_eq!(err.to_string(), "context deadline exceeded");
    }

    #[test]
    fn duplicate_version_has_no_step() {
        let err = UpgradeError { kind: UpgradeErrorKind::DuplicateVersion(Version::new(6, 2, 1)) };
        assert_eq!(err.to_string(), "Duplicate upgrade step version: v6.2.1");
        assert_eq!(err.version(), None);
    }

    #[test]
    fn marker_failure_keeps_engine_error_as_source() {
        let err = UpgradeError {
            kind: UpgradeErrorKind::Marker(sqlx::Error::PoolTimedOut.into()),
        };
        assert!(err.to_string().starts_with("Failed to read version marker: "));
        assert!(err.source().unwrap().to_string().starts_with("EngineError: "));
        assert_eq!(err.version(), None);
    }
}
