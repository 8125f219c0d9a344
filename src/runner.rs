//! Load, tick, save and log under the plan lock

use anyhow::{Context, Result};

use crate::config::{AppPaths, GridConfig, TickOverrides};
use crate::engine::run_tick;
use crate::gateway::ExchangeGateway;
use crate::store::{PlanLock, PlanStore, TickLog};
use crate::TickResult;

/// One persisted tick.
///
/// The plan file is only rewritten when the tick produced a result; an
/// aborted tick (for example an unavailable cap) leaves it as it was.
pub async fn run_persisted_tick(
    gateway: &dyn ExchangeGateway,
    paths: &AppPaths,
    config: &GridConfig,
    overrides: TickOverrides,
) -> Result<TickResult> {
    let _lock = PlanLock::acquire(paths.plan_lock())?;

    let store = PlanStore::new(paths.plan());
    let mut plan = store.load_or_empty(&config.symbol)?;
    if plan.levels().is_empty() {
        tracing::warn!(symbol = %config.symbol, "Plan has no levels; run make-plan first");
    }

    let result = run_tick(gateway, config, &mut plan, overrides)
        .await
        .context("Tick aborted")?;

    store
        .save(&plan)
        .with_context(|| format!("Failed to save plan to {}", store.path().display()))?;

    if let Err(e) = TickLog::new(paths.tick_log()).append(&result, &plan) {
        tracing::warn!(error = %e, "Failed to append tick log");
    }

    Ok(result)
}
