//! Bulk cancellation of open orders on a symbol

use crate::error::GatewayResult;
use crate::gateway::ExchangeGateway;
use crate::Symbol;

/// Cancel every open order on `symbol` in one batch request.
///
/// Returns how many orders were submitted for cancellation. The plan is not
/// touched here.
pub async fn cancel_all(gateway: &dyn ExchangeGateway, symbol: &Symbol) -> GatewayResult<usize> {
    let ids: Vec<String> = gateway
        .pending_orders(symbol)
        .await?
        .into_iter()
        .map(|o| o.order_id)
        .collect();

    if ids.is_empty() {
        tracing::info!(%symbol, "No pending orders to cancel");
        return Ok(0);
    }

    gateway.cancel_orders(symbol, &ids).await?;
    tracing::info!(%symbol, count = ids.len(), "Cancel request submitted");
    Ok(ids.len())
}
