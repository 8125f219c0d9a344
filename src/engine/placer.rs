//! Order submission for ladder levels

use crate::gateway::{ExchangeGateway, OrderRequest, TimeInForce, TradingRules};
use crate::{Money, Plan, Symbol};

use super::sizing::reduce_for_retry;
use super::window::BuyWindow;

/// Outcome of placing one batch of levels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub placed: usize,
    /// Quantity in force after the batch; lower than requested if a
    /// margin rejection forced a reduction
    pub quantity: Money,
}

/// Submit `order`; on an insufficient-margin rejection retry once with a
/// reduced quantity. Returns the order id (if accepted) and the quantity that
/// should be used from here on.
async fn submit_with_margin_retry(
    gateway: &dyn ExchangeGateway,
    order: OrderRequest,
    rules: &TradingRules,
) -> (Option<String>, Money) {
    match gateway.place_order(&order).await {
        Ok(id) => (Some(id), order.qty),
        Err(e) if e.is_insufficient_margin() => {
            let reduced = reduce_for_retry(order.qty, rules.base_precision, rules.min_volume);
            tracing::info!(
                price = %order.price,
                from = %order.qty,
                to = %reduced,
                "Insufficient margin, retrying once with reduced quantity"
            );
            let retry = order.resubmit_with_qty(reduced);
            match gateway.place_order(&retry).await {
                Ok(id) => (Some(id), reduced),
                Err(e) => {
                    tracing::warn!(price = %retry.price, error = %e, "Retry rejected");
                    (None, reduced)
                }
            }
        }
        Err(e) => {
            tracing::warn!(price = %order.price, side = %order.side, error = %e, "Order rejected");
            (None, order.qty)
        }
    }
}

/// Place LIMIT BUY OPEN orders for every level in the window.
///
/// Successful levels move to PLACED with their order id; failures stay
/// PENDING for a later tick.
pub async fn place_buy_window(
    gateway: &dyn ExchangeGateway,
    plan: &mut Plan,
    window: &BuyWindow,
    quantity: Money,
    effect: TimeInForce,
    rules: &TradingRules,
) -> Placement {
    let symbol = plan.symbol.clone();
    let mut qty = quantity;
    let mut placed = 0;

    for &idx in &window.indices {
        let Some(level) = plan.level_mut(idx) else {
            continue;
        };
        let order = OrderRequest::open_buy(&symbol, level.price(), qty, effect);
        let (order_id, next_qty) = submit_with_margin_retry(gateway, order, rules).await;
        qty = next_qty;

        if let Some(id) = order_id {
            tracing::info!(%symbol, price = %level.price(), %qty, order_id = %id, "BUY placed");
            if level.mark_placed(id) {
                placed += 1;
            }
        }
    }

    Placement {
        placed,
        quantity: qty,
    }
}

/// Indices of PENDING SELL levels, lowest price first, at most `max_place`
pub fn select_sells(plan: &Plan, max_place: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = plan
        .levels()
        .iter()
        .enumerate()
        .filter(|(_, l)| l.side() == crate::Side::Sell && l.is_pending())
        .map(|(i, _)| i)
        .collect();
    indices.sort_by_key(|&i| plan.levels()[i].price());
    indices.truncate(max_place);
    indices
}

/// Place reduce-only LIMIT SELL CLOSE orders against `position_id`
pub async fn place_sells(
    gateway: &dyn ExchangeGateway,
    plan: &mut Plan,
    symbol: &Symbol,
    max_place: usize,
    quantity: Money,
    effect: TimeInForce,
    position_id: Option<String>,
) -> usize {
    let mut placed = 0;

    for idx in select_sells(plan, max_place) {
        let Some(level) = plan.level_mut(idx) else {
            continue;
        };
        let order =
            OrderRequest::close_sell(symbol, level.price(), quantity, effect, position_id.clone());

        match gateway.place_order(&order).await {
            Ok(id) => {
                tracing::info!(%symbol, price = %level.price(), qty = %quantity, order_id = %id, "SELL placed");
                if level.mark_placed(id) {
                    placed += 1;
                }
            }
            Err(e) => {
                tracing::warn!(%symbol, price = %level.price(), error = %e, "SELL rejected");
            }
        }
    }

    placed
}
