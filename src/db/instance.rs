use crate::context::UpgradeContext;
use crate::db::{DbConfig, DbProvider, EngineError};


/// Relax strict SQL modes so that generated workloads are tolerated.
pub const SESSION_STATEMENTS: &[&str] = &[
    r#"SET @@GLOBAL.SQL_MODE="NO_ENGINE_SUBSTITUTION""#,
];


/// Applies a flat, fail-fast batch of session statements to the downstream
/// instance and then to every upstream instance, in the order given.
///
/// Nothing is compensated: statements already applied stay applied when a
/// later connection or statement fails.
pub struct InstanceStateSetter<P> {
    provider: P,
    statements: Vec<String>,
}

impl<P: DbProvider> InstanceStateSetter<P> {
    pub fn new(provider: P) -> Self {
        InstanceStateSetter {
            provider,
            statements: SESSION_STATEMENTS.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn with_statements(mut self, statements: Vec<String>) -> Self {
        self.statements = statements;
        self
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub async fn set_instances_state(
        &self,
        ctx: &UpgradeContext,
        target: &DbConfig,
        sources: &[DbConfig],
    ) -> Result<(), EngineError> {
        tracing::info!("Setting state of target instance {target}...");
        self.apply(ctx, target).await?;

        for (i, source) in sources.iter().enumerate() {
            tracing::info!("Setting state of source instance #{i} {source}...");
            self.apply(ctx, source).await?;
        }

        Ok(())
    }

    async fn apply(&self, ctx: &UpgradeContext, cfg: &DbConfig) -> Result<(), EngineError> {
        if let Some(reason) = ctx.err() {
            return Err(reason.into());
        }
        let db = self.provider.apply(cfg).await?;

        for statement in &self.statements {
            if let Some(reason) = ctx.err() {
                return Err(reason.into());
            }
            db.execute(statement).await?;
        }

        Ok(())
    }
}
