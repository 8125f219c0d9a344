//! Plan commands: make-plan, status, export
//!
//! None of these talk to the exchange.

use anyhow::{bail, Result};
use tracing::info;

use grid_ladder::config::AppPaths;
use grid_ladder::engine::generate;
use grid_ladder::store::{export_snapshot, PlanLock, PlanStore};
use grid_ladder::{Money, Plan};

use super::load_config;

#[derive(Debug)]
pub struct MakePlanArgs {
    pub lowest_buy: Money,
    pub highest_buy: Money,
    /// Falls back to the configured highest sell
    pub highest_sell: Option<Money>,
    pub levels: usize,
    pub buy_fraction: f64,
    /// Replace a plan that still has working or filled levels
    pub force: bool,
}

pub fn make_plan(paths: AppPaths, args: MakePlanArgs) -> Result<()> {
    let config = load_config(&paths)?;
    let highest_sell = args.highest_sell.unwrap_or(config.highest_sell);

    let _lock = PlanLock::acquire(paths.plan_lock())?;
    let store = PlanStore::new(paths.plan());

    if store.exists() {
        let stats = store.load()?.stats();
        if stats.placed + stats.filled > 0 && !args.force {
            bail!(
                "Existing plan has {} placed and {} filled levels; cancel orders first or pass --force",
                stats.placed,
                stats.filled
            );
        }
    }

    let plan = generate(
        &config.symbol,
        args.lowest_buy,
        args.highest_buy,
        highest_sell,
        args.levels,
        args.buy_fraction,
    )?;
    store.save(&plan)?;

    info!(
        symbol = %plan.symbol,
        buys = plan.meta.buy_levels.unwrap_or_default(),
        sells = plan.meta.sell_levels.unwrap_or_default(),
        "Plan saved to {}",
        store.path().display()
    );
    println!("Plan saved: {}", plan.stats());
    Ok(())
}

/// Render the plan as a fixed-width table
pub fn render_status(plan: &Plan) -> String {
    let mut out = format!("Plan {} | {}\n", plan.symbol, plan.stats());
    out.push_str(&format!(
        "{:>4}  {:<4}  {:>14}  {:<7}  {}\n",
        "Idx", "Side", "Price", "Status", "OrderId"
    ));
    for (i, level) in plan.levels().iter().enumerate() {
        out.push_str(&format!(
            "{:>4}  {:<4}  {:>14}  {:<7}  {}\n",
            i,
            level.side(),
            level.price().to_string(),
            level.status(),
            level.order_id().unwrap_or("-")
        ));
    }
    out
}

pub fn status(paths: AppPaths) -> Result<()> {
    let config = load_config(&paths)?;
    let plan = PlanStore::new(paths.plan()).load_or_empty(&config.symbol)?;
    print!("{}", render_status(&plan));
    Ok(())
}

pub fn export(paths: AppPaths) -> Result<()> {
    let config = load_config(&paths)?;
    let plan = PlanStore::new(paths.plan()).load_or_empty(&config.symbol)?;
    let target = paths.snapshot();
    let rows = export_snapshot(&plan, &target)?;
    println!("Snapshot written: {} ({} levels)", target.display(), rows);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_ladder::Symbol;

    #[test]
    fn test_render_status() {
        let mut plan = generate(
            &Symbol::new("BTCUSDT"),
            Money::from_i64(90000),
            Money::from_i64(100000),
            Money::from_i64(110000),
            10,
            0.6,
        )
        .unwrap();
        plan.level_mut(0).unwrap().mark_placed("42");

        let text = render_status(&plan);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Plan BTCUSDT | total 10 placed 1 filled 0 pending 9");
        assert_eq!(lines.len(), 12);
        assert!(lines[2].contains("PLACED") && lines[2].ends_with("42"));
        assert!(lines[11].contains("110000"));
    }
}
