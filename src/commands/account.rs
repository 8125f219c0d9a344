//! Exchange-facing commands: test-api, configure, positions, cancel

use anyhow::Result;
use tracing::{info, warn};

use grid_ladder::config::{AppPaths, GridConfig};
use grid_ladder::engine::cancel_all;
use grid_ladder::gateway::{MarginMode, PositionMode, TimeInForce};
use grid_ladder::store::ConfigStore;
use grid_ladder::{Money, Symbol};

use super::{connect, load_config, runtime};

pub fn test_api(paths: AppPaths) -> Result<()> {
    dotenv::dotenv().ok();
    let config = load_config(&paths)?;
    runtime()?.block_on(test_api_async(paths, config))
}

async fn test_api_async(paths: AppPaths, config: GridConfig) -> Result<()> {
    let session = connect(&paths, &config).await?;
    println!("API connection successful!");
    println!("Symbol:           {}", session.symbol());
    println!("Available margin: {} USDT", session.available_margin());
    println!(
        "Leverage/margin:  {}",
        serde_json::to_string(session.leverage_margin_mode())?
    );
    Ok(())
}

/// Values changed by `configure`; `None` keeps the stored value
#[derive(Debug, Default)]
pub struct ConfigureArgs {
    pub symbol: Option<String>,
    pub leverage: Option<u32>,
    pub margin_mode: Option<MarginMode>,
    pub position_mode: Option<PositionMode>,
    pub time_in_force: Option<TimeInForce>,
    pub levels: Option<usize>,
    pub band_pct: Option<f64>,
    pub highest_sell: Option<Money>,
    pub max_place: Option<usize>,
}

impl ConfigureArgs {
    fn apply(self, config: &mut GridConfig) {
        if let Some(symbol) = self.symbol {
            config.symbol = Symbol::new(symbol.to_ascii_uppercase());
        }
        if let Some(v) = self.leverage {
            config.leverage = v;
        }
        if let Some(v) = self.margin_mode {
            config.margin_mode = v;
        }
        if let Some(v) = self.position_mode {
            config.position_mode = v;
        }
        if let Some(v) = self.time_in_force {
            config.time_in_force = v;
        }
        if let Some(v) = self.levels {
            config.level_count = v;
        }
        if let Some(v) = self.band_pct {
            config.band_pct = v;
        }
        if let Some(v) = self.highest_sell {
            config.highest_sell = v;
        }
        if let Some(v) = self.max_place {
            config.max_place_per_tick = v;
        }
    }
}

/// Save the updated config, then push leverage and modes to the exchange
pub fn configure(paths: AppPaths, args: ConfigureArgs) -> Result<()> {
    dotenv::dotenv().ok();
    let mut config = load_config(&paths)?;
    args.apply(&mut config);

    ConfigStore::new(paths.config()).save(&config)?;
    info!("Config saved to {}", paths.config().display());
    print!("{}", serde_yaml::to_string(&config)?);

    runtime()?.block_on(apply_exchange_settings(paths, config))
}

async fn apply_exchange_settings(paths: AppPaths, config: GridConfig) -> Result<()> {
    let session = connect(&paths, &config).await?;
    let gateway = session.gateway();

    match gateway.change_leverage(&config.symbol, config.leverage).await {
        Ok(()) => info!(leverage = config.leverage, "Leverage applied"),
        Err(e) => warn!(error = %e, "Failed to change leverage"),
    }
    match gateway
        .change_margin_mode(&config.symbol, config.margin_mode)
        .await
    {
        Ok(()) => info!(mode = ?config.margin_mode, "Margin mode applied"),
        Err(e) => warn!(error = %e, "Failed to change margin mode"),
    }
    match gateway.change_position_mode(config.position_mode).await {
        Ok(()) => info!(mode = ?config.position_mode, "Position mode applied"),
        Err(e) => warn!(error = %e, "Failed to change position mode"),
    }
    Ok(())
}

pub fn positions(paths: AppPaths) -> Result<()> {
    dotenv::dotenv().ok();
    let config = load_config(&paths)?;
    runtime()?.block_on(positions_async(paths, config))
}

fn or_dash(value: Option<impl ToString>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

async fn positions_async(paths: AppPaths, config: GridConfig) -> Result<()> {
    let session = connect(&paths, &config).await?;
    let gateway = session.gateway();

    let positions = gateway.positions(&config.symbol).await?;
    println!("Positions on {} ({}):", config.symbol, positions.len());
    for p in &positions {
        println!(
            "  {:<6} qty {:<12} id {}",
            p.side,
            or_dash(p.open_qty),
            or_dash(p.position_id.as_deref())
        );
    }

    let orders = gateway.pending_orders(&config.symbol).await?;
    println!("Pending orders on {} ({}):", config.symbol, orders.len());
    for o in &orders {
        println!(
            "  {:<20} {:<5} price {:<12} qty {}",
            o.order_id,
            or_dash(o.side.as_deref()),
            or_dash(o.price),
            or_dash(o.qty)
        );
    }
    Ok(())
}

pub fn cancel(paths: AppPaths) -> Result<()> {
    dotenv::dotenv().ok();
    let config = load_config(&paths)?;
    runtime()?.block_on(cancel_async(paths, config))
}

async fn cancel_async(paths: AppPaths, config: GridConfig) -> Result<()> {
    let session = connect(&paths, &config).await?;
    let count = cancel_all(session.gateway(), &config.symbol).await?;
    if count == 0 {
        println!("No pending orders on {}", config.symbol);
    } else {
        println!("Cancel submitted for {} orders on {}", count, config.symbol);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_args_apply() {
        let mut config = GridConfig::default();
        ConfigureArgs {
            symbol: Some("ethusdt".into()),
            leverage: Some(5),
            band_pct: Some(2.0),
            ..ConfigureArgs::default()
        }
        .apply(&mut config);

        assert_eq!(config.symbol.as_str(), "ETHUSDT");
        assert_eq!(config.leverage, 5);
        assert_eq!(config.band_pct, 2.0);
        assert_eq!(config.max_place_per_tick, 12);
    }
}
