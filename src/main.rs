//! grid-ladder - command line entry point
//!
//! Subcommands:
//! - test-api / configure / positions / cancel: talk to the exchange
//! - make-plan / status / export: work on the local plan file only
//! - tick / loop: run the grid engine once or on a fixed interval

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use grid_ladder::config::{AppPaths, TickOverrides};
use grid_ladder::gateway::{MarginMode, PositionMode, TimeInForce};
use grid_ladder::Money;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "grid-ladder")]
#[command(about = "Static price-ladder grid trading for Bitunix perpetual futures", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Application directory (default: ~/.bitunix_grid_bot)
    #[arg(long, global = true)]
    home: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify API credentials against the exchange
    TestApi,

    /// Update the saved config and apply leverage / margin / position mode
    Configure {
        #[arg(long)]
        symbol: Option<String>,

        #[arg(long)]
        leverage: Option<u32>,

        /// ISOLATION or CROSS
        #[arg(long)]
        margin_mode: Option<MarginMode>,

        /// ONE_WAY or HEDGE
        #[arg(long)]
        position_mode: Option<PositionMode>,

        /// GTC, IOC, FOK or POST_ONLY
        #[arg(long)]
        tif: Option<TimeInForce>,

        /// Default level count for new plans
        #[arg(long)]
        levels: Option<usize>,

        /// Buy window width below the cap, percent
        #[arg(long)]
        band_pct: Option<f64>,

        #[arg(long)]
        highest_sell: Option<Money>,

        /// Max new orders per tick
        #[arg(long)]
        max_place: Option<usize>,
    },

    /// Create the ladder and write plan.yaml
    MakePlan {
        #[arg(long)]
        lowest_buy: Money,

        #[arg(long)]
        highest_buy: Money,

        /// Defaults to the configured highest sell
        #[arg(long)]
        highest_sell: Option<Money>,

        /// Total number of levels
        #[arg(long, default_value = "50")]
        levels: usize,

        /// Share of levels that are buys
        #[arg(long, default_value = "0.67")]
        buy_fraction: f64,

        /// Overwrite a plan that has placed or filled levels
        #[arg(long)]
        force: bool,
    },

    /// Run one tick now
    Tick {
        /// Band % for this tick (overrides config)
        #[arg(long)]
        band_pct: Option<f64>,

        /// Max new orders this tick (overrides config)
        #[arg(long)]
        max_place: Option<usize>,
    },

    /// Run ticks on a fixed interval until Ctrl+C
    Loop {
        #[arg(long)]
        band_pct: Option<f64>,

        #[arg(long)]
        max_place: Option<usize>,

        /// Seconds between ticks
        #[arg(long, default_value = "3600")]
        interval: u64,

        /// Stop after this many ticks
        #[arg(long)]
        max_ticks: Option<u64>,
    },

    /// Show plan status
    Status,

    /// Show positions and pending orders
    Positions,

    /// Cancel all pending orders on the configured symbol
    Cancel,

    /// Export plan snapshot CSV
    Export,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::TestApi => "test-api",
            Commands::Configure { .. } => "configure",
            Commands::MakePlan { .. } => "make-plan",
            Commands::Tick { .. } => "tick",
            Commands::Loop { .. } => "loop",
            Commands::Status => "status",
            Commands::Positions => "positions",
            Commands::Cancel => "cancel",
            Commands::Export => "export",
        }
    }
}

fn setup_logging(verbose: bool, command_name: &str, logs_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(logs_dir)?;

    // {command}_{date}.log
    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = logs_dir.join(&log_filename);

    let level = if verbose { "debug" } else { "info" };
    let filter_str = format!(
        "{},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn,h2=warn",
        level
    );
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let file_appender = tracing_appender::rolling::never(logs_dir, &log_filename);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_line_number(verbose)
        .with_file(verbose)
        .with_ansi(true);

    // same format without ANSI colors
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Log file: {}", log_path.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = AppPaths::resolve(cli.home.as_deref());

    setup_logging(cli.verbose, cli.command.name(), &paths.logs())?;

    match cli.command {
        Commands::TestApi => commands::account::test_api(paths),

        Commands::Configure {
            symbol,
            leverage,
            margin_mode,
            position_mode,
            tif,
            levels,
            band_pct,
            highest_sell,
            max_place,
        } => commands::account::configure(
            paths,
            commands::account::ConfigureArgs {
                symbol,
                leverage,
                margin_mode,
                position_mode,
                time_in_force: tif,
                levels,
                band_pct,
                highest_sell,
                max_place,
            },
        ),

        Commands::MakePlan {
            lowest_buy,
            highest_buy,
            highest_sell,
            levels,
            buy_fraction,
            force,
        } => commands::plan::make_plan(
            paths,
            commands::plan::MakePlanArgs {
                lowest_buy,
                highest_buy,
                highest_sell,
                levels,
                buy_fraction,
                force,
            },
        ),

        Commands::Tick {
            band_pct,
            max_place,
        } => commands::tick::run_once(
            paths,
            TickOverrides {
                band_pct,
                max_place,
            },
        ),

        Commands::Loop {
            band_pct,
            max_place,
            interval,
            max_ticks,
        } => commands::tick::run_loop(
            paths,
            TickOverrides {
                band_pct,
                max_place,
            },
            interval,
            max_ticks,
        ),

        Commands::Status => commands::plan::status(paths),
        Commands::Positions => commands::account::positions(paths),
        Commands::Cancel => commands::account::cancel(paths),
        Commands::Export => commands::plan::export(paths),
    }
}
