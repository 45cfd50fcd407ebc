use sqlparser::tokenizer::TokenizerError;
use std::error::Error;
use std::fmt;
use std::path::PathBuf;


#[derive(Debug)]
#[non_exhaustive]
pub struct ParseError {
    pub kind: ParseErrorKind
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParseError: {}", self.kind)
    }
}

impl Error for ParseError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		Some(&self.kind)
	}
}

#[derive(Debug)]
pub enum ParseErrorKind {
    FileNotFound(PathBuf),
    InvalidDirectory(PathBuf),
    InvalidVersionFormat(String),
    InvalidVersionNumber { name: String, source: semver::Error },
    Io { path: PathBuf, source: std::io::Error },
    Tokenizer(TokenizerError),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileNotFound(path) => write!(f, "File not found: '{path:?}'"),
            Self::InvalidDirectory(path) => write!(f, "Directory does not exist or is not a directory: '{path:?}'"),
            Self::InvalidVersionFormat(name) => write!(f, "Invalid version format: '{name}'"),
            Self::InvalidVersionNumber { name, .. } => write!(f, "Invalid version number: '{name}'"),
            Self::Io { path, .. } => write!(f, "Failed to read: '{path:?}'"),
            Self::Tokenizer(error) => write!(f, "Failed to tokenize SQL: {error}"),
        }
    }
}

impl Error for ParseErrorKind {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			Self::InvalidVersionNumber { source, .. } => Some(source),
			Self::Io { source, .. } => Some(source),
			Self::Tokenizer(source) => Some(source),
			_ => None,
		}
	}
}

impl From<TokenizerError> for ParseError {
    fn from(error: TokenizerError) -> Self {
        ParseError { kind: ParseErrorKind::Tokenizer(error) }
    }
}
