//! One tick of the grid: probe, window, size, place, reconcile, release sells

use chrono::Utc;

use crate::config::{GridConfig, TickOverrides};
use crate::error::TickError;
use crate::gateway::ExchangeGateway;
use crate::{Money, Plan, TickResult};

use super::cap::{detect_cap, PROBE_PRICE};
use super::placer::{place_buy_window, place_sells};
use super::position_gate::{should_release_sells, SellGate};
use super::reconcile::reconcile_with_exchange;
use super::sizing::size;
use super::window::select_buy_window;

/// Run one tick against `plan`, mutating level statuses in place.
///
/// Nothing is persisted here; the caller saves the plan afterwards. When the
/// cap cannot be detected the plan is left untouched. A plan built for a
/// different symbol than the config is refused before any exchange call.
pub async fn run_tick(
    gateway: &dyn ExchangeGateway,
    config: &GridConfig,
    plan: &mut Plan,
    overrides: TickOverrides,
) -> Result<TickResult, TickError> {
    let symbol = config.symbol.clone();
    let band_pct = overrides.band_pct(config);
    let max_place = overrides.max_place(config);

    if plan.symbol != symbol {
        return Err(TickError::SymbolMismatch {
            plan: plan.symbol.to_string(),
            config: symbol.to_string(),
        });
    }

    let rules = gateway.trading_rules(&symbol).await?;
    let available = gateway.available_margin().await?;
    tracing::debug!(
        %symbol,
        base_precision = rules.base_precision,
        min_volume = %rules.min_volume,
        %available,
        "Tick inputs"
    );

    let cap = detect_cap(gateway, &symbol, Money::from_i64(PROBE_PRICE), rules.min_volume)
        .await
        .ok_or_else(|| TickError::CapUnavailable(symbol.to_string()))?;

    let window = select_buy_window(plan, cap, band_pct, max_place);
    let window_prices = window.prices(plan);
    let sum_buy_prices: Money = window_prices.iter().sum();
    let quantity = size(
        available,
        config.leverage,
        &window_prices,
        rules.base_precision,
        rules.min_volume,
    );
    tracing::info!(
        %symbol,
        %cap,
        hb = %window.high_bound,
        lb = %window.low_bound,
        levels = window.len(),
        %quantity,
        "Buy window selected"
    );

    let buys = place_buy_window(
        gateway,
        plan,
        &window,
        quantity,
        config.time_in_force,
        &rules,
    )
    .await;

    let filled = reconcile_with_exchange(gateway, &symbol, plan).await;

    let placed_sells = match gateway.positions(&symbol).await {
        Ok(positions) => match should_release_sells(&positions, &symbol) {
            SellGate::Release { position_id } => {
                place_sells(
                    gateway,
                    plan,
                    &symbol,
                    max_place,
                    buys.quantity,
                    config.time_in_force,
                    position_id,
                )
                .await
            }
            SellGate::Hold => 0,
        },
        Err(e) => {
            tracing::warn!(%symbol, error = %e, "Position query failed, holding sells");
            0
        }
    };

    let result = TickResult {
        timestamp: Utc::now(),
        symbol,
        cap,
        high_bound: window.high_bound,
        low_bound: window.low_bound,
        band_pct,
        quantity: buys.quantity,
        placed_buys: buys.placed,
        placed_sells,
        filled_this_tick: filled,
        available_margin: available,
        leverage: config.leverage,
        sum_buy_prices,
    };

    tracing::info!(
        symbol = %result.symbol,
        placed_buys = result.placed_buys,
        placed_sells = result.placed_sells,
        filled = result.filled_this_tick,
        stats = %plan.stats(),
        "Tick complete"
    );

    Ok(result)
}
