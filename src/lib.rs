//! Grid Ladder
//!
//! Places a static ladder of limit orders on a perpetual-futures exchange,
//! a slice at a time. Each tick probes the exchange's current maximum buy
//! price, picks the pending buy levels in a band just below it, sizes them
//! against available margin, places them, detects fills and, once a long
//! exists, releases reduce-only sells.
//!
//! ## Example
//! ```no_run
//! use grid_ladder::bitunix::{BitunixClient, Credentials};
//! use grid_ladder::config::{GridConfig, TickOverrides};
//! use grid_ladder::engine::{generate, run_tick};
//! use grid_ladder::{Money, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = BitunixClient::new(Credentials::from_env()?)?;
//!     let config = GridConfig::default();
//!     let mut plan = generate(
//!         &Symbol::new("BTCUSDT"),
//!         Money::from_i64(90_000),
//!         Money::from_i64(100_000),
//!         Money::from_i64(110_000),
//!         50,
//!         0.67,
//!     )?;
//!     let result = run_tick(&client, &config, &mut plan, TickOverrides::default()).await?;
//!     println!("placed {} buys below {}", result.placed_buys, result.cap);
//!     Ok(())
//! }
//! ```

pub mod bitunix;
pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod runner;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod types;

pub use config::GridConfig;
pub use types::*;
