use crate::context::ContextError;

use std::error::Error;
use std::fmt;


#[derive(Debug)]
#[non_exhaustive]
pub struct EngineError {
    pub kind: EngineErrorKind
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EngineError: {}", self.kind)
    }
}

impl Error for EngineError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		Some(&self.kind)
	}
}

#[derive(Debug)]
pub enum EngineErrorKind {
    Context(ContextError),
    InvalidConfig(String),
    InvalidStoredVersion { value: String, source: semver::Error },
    SQLX(sqlx::Error),
}

impl fmt::Display for EngineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Context(e) => write!(f, "{e}"),
            Self::InvalidConfig(reason) => write!(f, "Invalid database config: {reason}"),
            Self::InvalidStoredVersion { value, .. } => write!(f, "Stored version is not a semantic version: '{value}'"),
            Self::SQLX(e) => write!(f, "{e}"),
        }
    }
}

impl Error for EngineErrorKind {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			Self::Context(source) => Some(source),
			Self::InvalidStoredVersion { source, .. } => Some(source),
			Self::SQLX(source) => Some(source),
			_ => None,
		}
	}
}

impl From<sqlx::Error> for EngineError {
    fn from(error: sqlx::Error) -> Self {
        EngineError { kind: EngineErrorKind::SQLX(error) }
    }
}

impl From<ContextError> for EngineError {
    fn from(error: ContextError) -> Self {
        EngineError { kind: EngineErrorKind::Context(error) }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn engine_error_display_formats_correctly() {
        let cases: Vec<(EngineErrorKind, &str)> = vec![
            (EngineErrorKind::Context(ContextError::Cancelled), "context canceled"),
            (EngineErrorKind::InvalidConfig("missing host".into()), "Invalid database config: missing host"),
            (
                EngineErrorKind::InvalidStoredVersion {
                    value: "six".into(),
                    source: semver::Version::parse("six").unwrap_err(),
                },
                "Stored version is not a semantic version: 'six'",
            ),
            (EngineErrorKind::SQLX(sqlx::Error::RowNotFound), "no rows returned"),
        ];

        for (kind, expect) in cases {
            let text = kind.to_string();
            assert!(
                text.contains(expect),
                "Expected `{}` in `{}`",
                expect,
                text
            );
        }
    }

    #[test]
    fn engine_error_source_is_accessible() {
        let e: EngineError = ContextError::DeadlineExceeded.into();
        let src = e.kind.source().unwrap().to_string();
        assert_eq!(src, "context deadline exceeded");
    }

    #[test]
    fn engine_error_from_sqlx() {
        let e: EngineError = sqlx::Error::RowNotFound.into();
        assert!(matches!(e.kind, EngineErrorKind::SQLX(_)));
    }
}
