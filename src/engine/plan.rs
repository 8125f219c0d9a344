//! Ladder generation
//!
//! Buys are spread linearly from `lowest_buy` to `highest_buy`, sells from
//! `highest_buy` to `highest_sell`. Both ends are inclusive, so `highest_buy`
//! is both the top buy and the bottom sell.

use chrono::Utc;

use crate::error::PlanError;
use crate::{Level, Money, Plan, PlanMeta, Side, Symbol};

/// Minimum number of levels a plan may have
pub const MIN_TOTAL_LEVELS: usize = 4;

/// Split `total_levels` into (buy_count, sell_count). Each side gets at least two.
///
/// The two-per-side floor wins over the requested total: a skewed fraction
/// such as `(4, 0.9)` yields 3 buys and 2 sells, one level more than asked.
pub fn split_levels(total_levels: usize, buy_fraction: f64) -> (usize, usize) {
    let buy_count = ((total_levels as f64 * buy_fraction).floor() as usize).max(2);
    let sell_count = total_levels.saturating_sub(buy_count).max(2);
    (buy_count, sell_count)
}

/// `count` prices from `low` to `high` inclusive, rounded to cents
fn interpolate(low: Money, high: Money, count: usize) -> Vec<Money> {
    let steps = Money::from_i64(count as i64 - 1);
    let span = high - low;
    (0..count)
        .map(|i| (low + span * Money::from_i64(i as i64) / steps).round_dp(2))
        .collect()
}

/// Build a fresh all-PENDING plan
pub fn generate(
    symbol: &Symbol,
    lowest_buy: Money,
    highest_buy: Money,
    highest_sell: Money,
    total_levels: usize,
    buy_fraction: f64,
) -> Result<Plan, PlanError> {
    if !(lowest_buy < highest_buy && highest_buy < highest_sell) {
        return Err(PlanError::InvalidBounds {
            lowest_buy: lowest_buy.to_string(),
            highest_buy: highest_buy.to_string(),
            highest_sell: highest_sell.to_string(),
        });
    }
    if total_levels < MIN_TOTAL_LEVELS {
        return Err(PlanError::TooFewLevels(total_levels));
    }
    if !(buy_fraction > 0.0 && buy_fraction < 1.0) {
        return Err(PlanError::InvalidBuyFraction(buy_fraction));
    }

    let (buy_count, sell_count) = split_levels(total_levels, buy_fraction);

    let levels: Vec<Level> = interpolate(lowest_buy, highest_buy, buy_count)
        .into_iter()
        .map(|p| Level::new(Side::Buy, p))
        .chain(
            interpolate(highest_buy, highest_sell, sell_count)
                .into_iter()
                .map(|p| Level::new(Side::Sell, p)),
        )
        .collect();

    let meta = PlanMeta {
        created: Utc::now().timestamp(),
        lowest_buy: Some(lowest_buy),
        highest_buy: Some(highest_buy),
        highest_sell: Some(highest_sell),
        total: Some(total_levels),
        buy_levels: Some(buy_count),
        sell_levels: Some(sell_count),
        buy_fraction: Some(buy_fraction),
    };

    Ok(Plan::new(symbol.clone(), levels, meta))
}
