pub mod bootstrap;
pub mod cli;
pub mod context;
pub mod db;
pub mod parser;

pub use bootstrap::{Upgradable, UpgradeError, UpgradeStep};
pub use context::UpgradeContext;
