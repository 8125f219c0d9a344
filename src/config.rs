//! Configuration management
//!
//! Per-symbol trading parameters stored as YAML in the application
//! directory, plus the layout of that directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::gateway::{MarginMode, PositionMode, TimeInForce};
use crate::{Money, Symbol};

/// Name of the application directory under the user's home
pub const APP_DIR_NAME: &str = ".bitunix_grid_bot";

/// Trading parameters for the configured symbol
///
/// Keys are snake_case; the camelCase keys of older config files are
/// accepted on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub symbol: Symbol,
    pub leverage: u32,
    #[serde(alias = "marginMode")]
    pub margin_mode: MarginMode,
    #[serde(alias = "positionMode")]
    pub position_mode: PositionMode,
    #[serde(alias = "tif")]
    pub time_in_force: TimeInForce,
    /// Default level count for new plans
    #[serde(alias = "levels")]
    pub level_count: usize,
    /// Width of the buy window below the cap, percent
    #[serde(alias = "bandPct")]
    pub band_pct: f64,
    #[serde(alias = "highestSell")]
    pub highest_sell: Money,
    #[serde(alias = "maxPlacePerTick")]
    pub max_place_per_tick: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            symbol: Symbol::new("BTCUSDT"),
            leverage: 3,
            margin_mode: MarginMode::Isolation,
            position_mode: PositionMode::OneWay,
            time_in_force: TimeInForce::Gtc,
            level_count: 16,
            band_pct: 3.0,
            highest_sell: Money::from_i64(200_000),
            max_place_per_tick: 12,
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.symbol.as_str().is_empty() {
            return Err(StoreError::InvalidConfig("symbol must not be empty".into()));
        }
        if self.leverage == 0 {
            return Err(StoreError::InvalidConfig("leverage must be >= 1".into()));
        }
        if !(self.band_pct > 0.0 && self.band_pct < 100.0) {
            return Err(StoreError::InvalidConfig(format!(
                "band_pct must be in (0, 100), got {}",
                self.band_pct
            )));
        }
        if self.max_place_per_tick == 0 {
            return Err(StoreError::InvalidConfig(
                "max_place_per_tick must be >= 1".into(),
            ));
        }
        if self.level_count < 4 {
            return Err(StoreError::InvalidConfig(format!(
                "level_count must be >= 4, got {}",
                self.level_count
            )));
        }
        if !self.highest_sell.is_positive() {
            return Err(StoreError::InvalidConfig(
                "highest_sell must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Per-tick values that override the config when given on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickOverrides {
    pub band_pct: Option<f64>,
    pub max_place: Option<usize>,
}

impl TickOverrides {
    pub fn band_pct(&self, config: &GridConfig) -> f64 {
        self.band_pct.unwrap_or(config.band_pct)
    }

    pub fn max_place(&self, config: &GridConfig) -> usize {
        self.max_place.unwrap_or(config.max_place_per_tick)
    }
}

/// File layout of the application directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub root: PathBuf,
}

impl AppPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `--home` if given, else `$HOME/.bitunix_grid_bot`
    pub fn resolve(home_override: Option<&Path>) -> Self {
        match home_override {
            Some(path) => Self::new(path),
            None => {
                let home = std::env::var_os("HOME")
                    .or_else(|| std::env::var_os("USERPROFILE"))
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("."));
                Self::new(home.join(APP_DIR_NAME))
            }
        }
    }

    pub fn secrets(&self) -> PathBuf {
        self.root.join("secrets.json")
    }

    pub fn config(&self) -> PathBuf {
        self.root.join("config.yaml")
    }

    pub fn plan(&self) -> PathBuf {
        self.root.join("plan.yaml")
    }

    pub fn plan_lock(&self) -> PathBuf {
        self.root.join("plan.yaml.lock")
    }

    pub fn logs(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn tick_log(&self) -> PathBuf {
        self.logs().join("ticks.csv")
    }

    pub fn snapshot(&self) -> PathBuf {
        self.logs().join("plan_snapshot.csv")
    }

    /// Create the directory tree
    pub fn ensure(&self) -> Result<(), StoreError> {
        let logs = self.logs();
        std::fs::create_dir_all(&logs).map_err(|e| StoreError::io(&logs, e))
    }
}
