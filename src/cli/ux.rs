use crate::bootstrap::UpgradePlan;
use crate::cli::error::BootstrapError;
use crate::cli::output::{BootstrapOutput, BootstrapStatus};
use serde::Serialize;
use std::fmt::Write;


pub fn setup_logging(verbose: u8, quiet: bool, json: bool) -> Result<(), BootstrapError> {
    if json {
        // Mute all logging if JSON output is enabled
        tracing::subscriber::set_global_default(tracing::subscriber::NoSubscriber::default())?;
        return Ok(());
    }

    let level = if quiet {
        tracing::Level::ERROR
    } else { match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }};

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}


pub fn show_upgrade_plan(plan: &UpgradePlan) {
    if plan.is_empty() {
        tracing::info!("No upgrade steps {}. Nothing to do.", plan.baseline());
        return;
    }

    let mut output = format!("--- Upgrade plan ({}) ---", plan.baseline());
    for step in plan.iter() {
        let rollback = if step.has_rollback() { "with rollback" } else { "no rollback" };
        // Writing to a String cannot fail
        let _ = write!(&mut output, "\n-> v{} ({})", step.version, rollback);
    }

    let unguarded = plan.iter().filter(|step| !step.has_rollback()).count();
    if unguarded > 0 {
        tracing::warn!("{unguarded} step(s) cannot be rolled back if a later step fails!");
    }

    tracing::info!("{}\n--- End of upgrade plan ---", output);
}


pub fn render_human_output<T: Serialize>(output: &BootstrapOutput<T>) {
    match (&output.status, &output.error) {
        (BootstrapStatus::Error, Some(error)) => {
            tracing::error!("{} failed: {}", output.command, error.message);
            for cause in &error.causes {
                tracing::error!("  caused by: {cause}");
            }
        }
        _ => tracing::info!("{} completed.", output.command),
    }
}
