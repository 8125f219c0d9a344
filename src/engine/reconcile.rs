//! Fill detection by diffing against the exchange's open orders
//!
//! A level that has an order id but whose order is no longer open is treated
//! as filled. Cancellations made outside this tool look the same and are
//! classified the same way.

use std::collections::HashSet;

use crate::gateway::ExchangeGateway;
use crate::{LevelStatus, Plan, Symbol};

/// Mark every PLACED/PENDING level with an order id missing from
/// `live_order_ids` as FILLED. Returns how many levels changed.
pub fn reconcile(plan: &mut Plan, live_order_ids: &HashSet<String>) -> usize {
    let mut filled = 0;
    for level in plan.levels_mut() {
        let stale = matches!(level.status(), LevelStatus::Placed | LevelStatus::Pending)
            && level
                .order_id()
                .is_some_and(|id| !live_order_ids.contains(id));
        if stale && level.mark_filled() {
            tracing::info!(side = %level.side(), price = %level.price(), order_id = ?level.order_id(), "Level filled");
            filled += 1;
        }
    }
    filled
}

/// Fetch open orders and reconcile. A failed query leaves the plan untouched.
pub async fn reconcile_with_exchange(
    gateway: &dyn ExchangeGateway,
    symbol: &Symbol,
    plan: &mut Plan,
) -> usize {
    match gateway.pending_orders(symbol).await {
        Ok(orders) => {
            let live: HashSet<String> = orders.into_iter().map(|o| o.order_id).collect();
            reconcile(plan, &live)
        }
        Err(e) => {
            tracing::warn!(%symbol, error = %e, "Open-order query failed, skipping fill reconciliation");
            0
        }
    }
}
