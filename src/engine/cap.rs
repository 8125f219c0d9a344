//! Maximum buy price discovery
//!
//! The exchange rejects buy orders priced above a moving ceiling and names
//! that ceiling in the rejection message. Submitting a deliberately absurd
//! maker-only buy therefore reveals it.

use crate::error::CODE_PRICE_LIMIT;
use crate::gateway::{client_id, ExchangeGateway, OrderRequest, TimeInForce, TradeSide};
use crate::{Money, Side, Symbol};

/// Price used for the probe order
pub const PROBE_PRICE: i64 = 1_000_000_000;

const MAX_BUY_MARKER: &str = "Max Buy Order Price";

/// Extract `<number>` from a message containing `Max Buy Order Price <number>`
pub fn parse_max_buy_price(msg: &str) -> Option<Money> {
    let start = msg.find(MAX_BUY_MARKER)? + MAX_BUY_MARKER.len();
    let rest = &msg[start..];

    // at least one whitespace character separates marker and number
    let trimmed = rest.trim_start();
    if trimmed.len() == rest.len() {
        return None;
    }

    let int_len = trimmed.find(|c: char| !c.is_ascii_digit()).unwrap_or(trimmed.len());
    if int_len == 0 {
        return None;
    }
    let mut end = int_len;
    if let Some(frac) = trimmed[int_len..].strip_prefix('.') {
        let frac_len = frac.find(|c: char| !c.is_ascii_digit()).unwrap_or(frac.len());
        if frac_len > 0 {
            end += 1 + frac_len;
        }
    }

    trimmed[..end].parse().ok()
}

/// Probe the current maximum acceptable buy price.
///
/// Returns `None` when the ceiling cannot be determined, including when the
/// probe is unexpectedly accepted (it is cancelled straight away).
pub async fn detect_cap(
    gateway: &dyn ExchangeGateway,
    symbol: &Symbol,
    probe_price: Money,
    min_volume: Money,
) -> Option<Money> {
    let probe = OrderRequest {
        symbol: symbol.clone(),
        side: Side::Buy,
        trade_side: TradeSide::Open,
        price: probe_price,
        qty: min_volume,
        effect: TimeInForce::PostOnly,
        reduce_only: false,
        client_id: client_id("probe", 6),
        position_id: None,
    };

    match gateway.place_order(&probe).await {
        Ok(order_id) => {
            tracing::warn!(%symbol, %order_id, "Cap probe was accepted, cancelling it");
            if let Err(e) = gateway.cancel_orders(symbol, &[order_id]).await {
                tracing::error!(%symbol, error = %e, "Failed to cancel accepted cap probe");
            }
            None
        }
        Err(e) => match e.rejection_code() {
            Some(CODE_PRICE_LIMIT) => {
                let cap = match &e {
                    crate::error::GatewayError::Rejected { msg, .. } => parse_max_buy_price(msg),
                    _ => None,
                };
                if cap.is_none() {
                    tracing::warn!(%symbol, error = %e, "Price-limit rejection without a readable cap");
                }
                cap
            }
            _ => {
                tracing::warn!(%symbol, error = %e, "Cap probe failed");
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_decimal_cap() {
        assert_eq!(
            parse_max_buy_price("Max Buy Order Price 98765.4"),
            Some(Money::new(dec!(98765.4)))
        );
    }

    #[test]
    fn test_parse_embedded_cap() {
        assert_eq!(
            parse_max_buy_price("Order price error: Max Buy Order Price  101234, please retry"),
            Some(Money::from_i64(101234))
        );
        assert_eq!(
            parse_max_buy_price("Max Buy Order Price 99000. end"),
            Some(Money::from_i64(99000))
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_max_buy_price("Max Buy Order Price"), None);
        assert_eq!(parse_max_buy_price("Max Buy Order Price98765"), None);
        assert_eq!(parse_max_buy_price("Max Buy Order Price abc"), None);
        assert_eq!(parse_max_buy_price("Price limit exceeded"), None);
    }
}
