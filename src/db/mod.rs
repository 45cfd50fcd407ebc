mod config;
mod error;
mod executor;
mod instance;
mod marker;

pub use config::{DbConfig, DEFAULT_PORT};
pub use error::{EngineError, EngineErrorKind};
pub use executor::{DbProvider, MySqlExecutor, MySqlProvider, SqlExecutor};
pub use instance::{InstanceStateSetter, SESSION_STATEMENTS};
pub use marker::{MemoryMarker, MySqlMarker, VersionMarker};
