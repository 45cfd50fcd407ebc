use clap::Parser;
use dm_bootstrap::cli::{self, commands, error::BootstrapError, output, ux};
use dm_bootstrap::UpgradeContext;


async fn run_command(command: cli::Commands, ctx: UpgradeContext) -> Result<serde_json::Value, BootstrapError> {
    match command {
        cli::Commands::Check { db } => commands::check(&db).await,
        cli::Commands::Plan { args } => commands::plan(&args).await,
        cli::Commands::Upgrade { args, timeout } => commands::upgrade(ctx, &args, timeout).await,
        cli::Commands::SetState { target, sources, statements } => {
            commands::set_state(ctx, &target, &sources, statements.as_deref()).await
        }
    }
}


/// Entry point for the dm-bootstrap CLI.
///
/// - `check`: Verify connectivity to the metadata database.
/// - `plan`: Show the upgrade steps that would run.
/// - `upgrade`: Run the upgrade steps, rolling back on failure.
/// - `set-state`: Normalise session settings on the target and source instances.
#[tokio::main]
async fn main() {
    let args: cli::Cli = cli::Cli::parse();

    if let Err(e) = ux::setup_logging(args.verbose, args.quiet, args.json) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let ctx = UpgradeContext::new();
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted! Stopping before the next step...");
            interrupt.cancel();
        }
    });

    let command_name = args.command.to_string();
    let result = run_command(args.command, ctx).await;
    let output = output::BootstrapOutput::new(command_name, result);

    if args.json {
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Failed to serialize output: {e}"),
        }
    } else {
        ux::render_human_output(&output);
    }

    if let output::BootstrapStatus::Error = output.status {
        std::process::exit(1);
    }
}
