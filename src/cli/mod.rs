pub mod commands;
pub mod error;
pub mod output;
pub mod ux;

use crate::db::DbConfig;
pub use clap::{Parser, Subcommand};

use semver::Version;
use std::path::PathBuf;


#[derive(Parser)]
#[command(name = "dm-bootstrap", version, about = "Versioned upgrade and rollback of job-master metadata, run at bootstrap.")]
pub struct Cli {
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        global = true,
        help = "Set level of verbosity. [default: INFO]\n\t-v: DEBUG\n\t-vv: TRACE\n--quiet takes precedence over --verbose."
    )]
    pub verbose: u8,

    #[arg(
        short,
        long,
        action = clap::ArgAction::SetTrue,
        global = true,
        help = "Disable all information logs (only ERROR level logs are shown).\n--quiet takes precedence over --verbose."
    )]
    pub quiet: bool,

    #[arg(
        long,
        action = clap::ArgAction::SetTrue,
        global = true,
        help = "Enable JSON output format. Human readable output is disabled when this flag is set."
    )]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Args)]
pub struct MetaArgs {
    #[arg(
        long = "db",
        help = "Metadata database holding the version marker, formatted as:
    [mysql://]<user>[:<password>]@<host>[:<port>][/<database>]\n",
        env = "DB_CONNECTION_STRING",
        hide_env_values = true
    )]
    pub db: DbConfig,

    #[arg(
        long = "dir",
        help = "Directory with one '<version>_<name>' subdirectory per upgrade step, each holding up.sql and an optional down.sql",
        env = "UPGRADE_DIRECTORY",
    )]
    pub directory: PathBuf,

    #[arg(
        long,
        help = "Version to upgrade from. Steps at or above this version are run.
If not set, only steps above the version stored in the metadata database run.
If no version is stored, every step from 0.0.0 runs.",
    )]
    pub from_version: Option<Version>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Test connection to the metadata database and create the version marker table.")]
    Check {
        #[arg(
            long = "db",
            help = "Metadata database, formatted as [mysql://]<user>[:<password>]@<host>[:<port>][/<database>]",
            env = "DB_CONNECTION_STRING",
            hide_env_values = true
        )]
        db: DbConfig,
    },

    #[command(about = "Show which upgrade steps would run, without running them.")]
    Plan {
        #[command(flatten)]
        args: MetaArgs,
    },

    #[command(about = "Run the upgrade steps, rolling back applied steps if one fails.")]
    Upgrade {
        #[command(flatten)]
        args: MetaArgs,

        #[arg(
            long,
            help = "Give up after this many seconds. Steps still pending are not started and applied steps are rolled back.",
        )]
        timeout: Option<u64>,
    },

    #[command(about = "Apply session settings (e.g. a relaxed SQL mode) to the downstream and upstream instances.")]
    SetState {
        #[arg(
            long,
            help = "Downstream instance, set first.",
            env = "TARGET_DB",
            hide_env_values = true
        )]
        target: DbConfig,

        #[arg(
            long = "source",
            help = "Upstream instance, set in the order given. May be repeated.",
            env = "SOURCE_DBS",
            value_delimiter = ',',
            hide_env_values = true
        )]
        sources: Vec<DbConfig>,

        #[arg(
            long,
            help = "SQL file replacing the default statements.",
        )]
        statements: Option<PathBuf>,
    },
}

impl std::fmt::Display for Commands {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Commands::Check { .. } => "check",
            Commands::Plan { .. } => "plan",
            Commands::Upgrade { .. } => "upgrade",
            Commands::SetState { .. } => "set-state",
        };
        write!(f, "{name}")
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upgrade_arguments() {
        let cli = Cli::try_parse_from([
            "dm-bootstrap", "-v", "upgrade",
            "--db", "root:pw@127.0.0.1:4000/dm_meta",
            "--dir", "./upgrades",
            "--from-version", "6.1.0",
            "--timeout", "30",
        ]).unwrap();

        assert_eq!(cli.verbose, 1);
        assert_eq!(cli.command.to_string(), "upgrade");
        let Commands::Upgrade { args, timeout } = cli.command else {
            panic!("expected the upgrade command");
        };
        assert_eq!(args.db.port, 4000);
        assert_eq!(args.directory, PathBuf::from("./upgrades"));
        assert_eq!(args.from_version, Some(Version::new(6, 1, 0)));
        assert_eq!(timeout, Some(30));
    }

    #[test]
    fn parses_repeated_sources_in_order() {
        let cli = Cli::try_parse_from([
            "dm-bootstrap", "set-state",
            "--target", "root@tidb",
            "--source", "root@mysql-1",
            "--source", "root@mysql-2:3307",
        ]).unwrap();

        let Commands::SetState { target, sources, statements } = cli.command else {
            panic!("expected the set-state command");
        };
        assert_eq!(target.host, "tidb");
        let hosts: Vec<&str> = sources.iter().map(|s| s.host.as_str()).collect();
        assert_eq!(hosts, ["mysql-1", "mysql-2"]);
        assert_eq!(statements, None);
    }

    #[test]
    fn parses_check_command() {
        let cli = Cli::try_parse_from(["dm-bootstrap", "check", "--db", "root@dm-meta"]).unwrap();

        assert_eq!(cli.command.to_string(), "check");
        let Commands::Check { db } = cli.command else {
            panic!("expected the check command");
        };
        assert_eq!(db.port, 3306);
    }

    #[test]
    fn rejects_invalid_version_and_config() {
        assert!(Cli::try_parse_from([
            "dm-bootstrap", "plan", "--db", "root@db", "--dir", ".", "--from-version", "six",
        ]).is_err());
        assert!(Cli::try_parse_from(["dm-bootstrap", "check", "--db", "db-without-user"]).is_err());
    }
}
