use crate::bootstrap::{Baseline, DirectoryStepSource, Upgradable};
use crate::cli::{error::BootstrapError, ux, MetaArgs};
use crate::context::UpgradeContext;
use crate::db::{DbConfig, InstanceStateSetter, MySqlExecutor, MySqlMarker, MySqlProvider, VersionMarker};
use crate::parser::StatementCollection;

use semver::Version;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;


/// Connects without changing anything in the metadata database.
async fn connect(db: &DbConfig) -> Result<(MySqlExecutor, MySqlMarker), BootstrapError> {
    tracing::info!("Connecting to metadata database {db}...");
    let executor = MySqlExecutor::connect(db).await?;
    let marker = MySqlMarker::from_executor(&executor);

    Ok((executor, marker))
}

/// Connects and creates the marker table if it is missing.
async fn connect_for_write(db: &DbConfig) -> Result<(MySqlExecutor, MySqlMarker), BootstrapError> {
    let (executor, marker) = connect(db).await?;
    marker.ensure_table().await?;

    Ok((executor, marker))
}

fn upgradable(directory: &Path, executor: MySqlExecutor, marker: MySqlMarker) -> Upgradable {
    let marker = Arc::new(marker);
    let source = DirectoryStepSource::new(directory, Arc::new(executor), marker.clone());

    Upgradable::new(marker, Arc::new(source))
}

/// The user's version is upgraded from inclusively; without one, the run
/// continues after the stored version.
async fn resolve_baseline(
    upgradable: &Upgradable,
    from_version: Option<&Version>,
) -> Result<Baseline, BootstrapError> {
    let baseline = match from_version {
        Some(version) => Baseline::From(version.clone()),
        None => upgradable.stored_baseline().await?,
    };
    tracing::info!("Upgrade baseline: {baseline}");

    Ok(baseline)
}


pub async fn check(db: &DbConfig) -> Result<Value, BootstrapError> {
    let (_, marker) = connect_for_write(db).await?;
    let current = marker.load().await?;

    match &current {
        Some(version) => tracing::info!("Metadata database reachable. Stored version: v{version}"),
        None => tracing::info!("Metadata database reachable. No version stored yet"),
    }

    Ok(json!({ "current_version": current.map(|v| v.to_string()) }))
}


pub async fn plan(args: &MetaArgs) -> Result<Value, BootstrapError> {
    let (executor, marker) = connect(&args.db).await?;
    let upgradable = upgradable(&args.directory, executor, marker);
    let baseline = resolve_baseline(&upgradable, args.from_version.as_ref()).await?;

    let plan = upgradable.plan_with(&baseline)?;
    ux::show_upgrade_plan(&plan);

    let steps: Vec<Value> = plan
        .iter()
        .map(|step| json!({
            "version": step.version.to_string(),
            "rollback": step.has_rollback(),
        }))
        .collect();

    Ok(json!({
        "baseline": baseline.to_string(),
        "steps": steps,
    }))
}


pub async fn upgrade(
    ctx: UpgradeContext,
    args: &MetaArgs,
    timeout: Option<u64>,
) -> Result<Value, BootstrapError> {
    let (executor, marker) = connect_for_write(&args.db).await?;
    let mut upgradable = upgradable(&args.directory, executor, marker);
    let baseline = resolve_baseline(&upgradable, args.from_version.as_ref()).await?;

    let ctx = match timeout {
        Some(secs) => {
            tracing::debug!("Upgrade times out in {secs}s");
            ctx.with_timeout(Duration::from_secs(secs))
        }
        None => ctx,
    };

    upgradable.upgrade_with(&ctx, &baseline).await?;

    let current = upgradable.current_version().await?;
    tracing::info!(
        "Upgrade complete. Current version: {}",
        current.as_ref().map_or("none".to_string(), |v| format!("v{v}"))
    );

    Ok(json!({
        "baseline": baseline.to_string(),
        "current_version": current.map(|v| v.to_string()),
    }))
}


pub async fn set_state(
    ctx: UpgradeContext,
    target: &DbConfig,
    sources: &[DbConfig],
    statements: Option<&Path>,
) -> Result<Value, BootstrapError> {
    let mut setter = InstanceStateSetter::new(MySqlProvider);

    if let Some(path) = statements {
        tracing::info!("Loading session statements from {path:?}");
        let collection = StatementCollection::from_file(path)?;
        if collection.is_empty() {
            tracing::warn!("{path:?} contains no statements; instances will only be connected to");
        }
        setter = setter.with_statements(collection.to_vec());
    }

    setter.set_instances_state(&ctx, target, sources).await?;

    Ok(json!({
        "target": target.to_string(),
        "sources": sources.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "statements": setter.statements(),
    }))
}
