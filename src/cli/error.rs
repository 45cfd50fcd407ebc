use crate::bootstrap::UpgradeError;
use crate::db::EngineError;
use crate::parser::ParseError;

use std::error::Error;
use std::fmt;
use tracing::subscriber::SetGlobalDefaultError;


#[derive(Debug)]
pub struct BootstrapError {
    pub kind: BootstrapErrorKind
}

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BootstrapError: {}", self.kind)
    }
}

impl Error for BootstrapError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.kind)
	}
}

#[derive(Debug)]
pub enum BootstrapErrorKind {
    Engine(EngineError),
    Parse(ParseError),
    SetGlobalDefault(SetGlobalDefaultError),
    Upgrade(UpgradeError),
}

impl fmt::Display for BootstrapErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Engine(error) => write!(f, "{}", error.kind),
            Self::Parse(error) => write!(f, "{}", error.kind),
            Self::SetGlobalDefault(error) => write!(f, "Failed to set global default subscriber: {}", error),
            Self::Upgrade(error) => write!(f, "Upgrade failed: {}", error),
        }
    }
}

impl Error for BootstrapErrorKind {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			Self::Engine(source) => Some(source),
			Self::Parse(source) => Some(source),
			Self::SetGlobalDefault(source) => Some(source),
			Self::Upgrade(source) => Some(source),
		}
	}
}

impl From<EngineError> for BootstrapError {
    fn from(error: EngineError) -> Self {
        BootstrapError { kind: BootstrapErrorKind::Engine(error) }
    }
}

impl From<ParseError> for BootstrapError {
    fn from(error: ParseError) -> Self {
        BootstrapError { kind: BootstrapErrorKind::Parse(error) }
    }
}

impl From<SetGlobalDefaultError> for BootstrapError {
    fn from(error: SetGlobalDefaultError) -> Self {
        BootstrapError { kind: BootstrapErrorKind::SetGlobalDefault(error) }
    }
}

impl From<UpgradeError> for BootstrapError {
    fn from(error: UpgradeError) -> Self {
        BootstrapError { kind: BootstrapErrorKind::Upgrade(error) }
    }
}
