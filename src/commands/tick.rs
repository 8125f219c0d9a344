//! Tick execution: a single `tick` or a repeating `loop`

use anyhow::Result;
use std::time::Duration;
use tracing::info;

use grid_ladder::config::{AppPaths, TickOverrides};
use grid_ladder::runner::run_persisted_tick;
use grid_ladder::scheduler::{ctrl_c_shutdown, Scheduler, SystemClock};
use grid_ladder::store::ConfigStore;
use grid_ladder::TickResult;

use super::{connect, load_config, runtime};

fn print_result(result: &TickResult) {
    println!(
        "cap {} | window {} .. {} | qty {} | buys {} sells {} filled {} | margin {} x{}",
        result.cap,
        result.low_bound,
        result.high_bound,
        result.quantity,
        result.placed_buys,
        result.placed_sells,
        result.filled_this_tick,
        result.available_margin,
        result.leverage
    );
}

pub fn run_once(paths: AppPaths, overrides: TickOverrides) -> Result<()> {
    dotenv::dotenv().ok();
    runtime()?.block_on(run_once_async(paths, overrides))
}

async fn run_once_async(paths: AppPaths, overrides: TickOverrides) -> Result<()> {
    let config = load_config(&paths)?;
    let session = connect(&paths, &config).await?;

    let result = run_persisted_tick(session.gateway(), &paths, &config, overrides).await?;
    print_result(&result);
    Ok(())
}

pub fn run_loop(
    paths: AppPaths,
    overrides: TickOverrides,
    interval_secs: u64,
    max_ticks: Option<u64>,
) -> Result<()> {
    dotenv::dotenv().ok();
    runtime()?.block_on(run_loop_async(paths, overrides, interval_secs, max_ticks))
}

async fn run_loop_async(
    paths: AppPaths,
    overrides: TickOverrides,
    interval_secs: u64,
    max_ticks: Option<u64>,
) -> Result<()> {
    let config = load_config(&paths)?;
    let session = connect(&paths, &config).await?;
    let config_store = ConfigStore::new(paths.config());

    info!(
        symbol = %config.symbol,
        interval_secs,
        max_ticks = ?max_ticks,
        "Starting tick loop"
    );

    let scheduler = Scheduler::new(SystemClock, Duration::from_secs(interval_secs))
        .with_max_ticks(max_ticks);

    let summary = scheduler
        .run(ctrl_c_shutdown(), |_| {
            let paths = &paths;
            let config_store = &config_store;
            let gateway = session.gateway();
            async move {
                // pick up config edits between ticks
                let config = config_store.load_or_init()?;
                let result = run_persisted_tick(gateway, paths, &config, overrides).await?;
                print_result(&result);
                Ok::<(), anyhow::Error>(())
            }
        })
        .await;

    info!(
        ticks = summary.ticks,
        failed = summary.failed,
        reason = ?summary.reason,
        "Tick loop ended"
    );
    Ok(())
}
