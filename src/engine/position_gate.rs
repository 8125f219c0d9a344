//! Whether closing sells may go out this tick

use crate::gateway::ExchangePosition;
use crate::Symbol;

/// Decision of the position gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SellGate {
    /// No long to close against
    Hold,
    /// Release sells against this position
    Release { position_id: Option<String> },
}

impl SellGate {
    pub fn is_release(&self) -> bool {
        matches!(self, SellGate::Release { .. })
    }
}

/// First LONG position on `symbol` with positive open quantity releases sells.
///
/// Positions that do not report a symbol are assumed to belong to the queried one.
pub fn should_release_sells(positions: &[ExchangePosition], symbol: &Symbol) -> SellGate {
    positions
        .iter()
        .filter(|p| p.symbol.as_deref().map_or(true, |s| s == symbol.as_str()))
        .find(|p| p.side == "LONG" && p.open_qty.is_some_and(|q| q.is_positive()))
        .map(|p| SellGate::Release {
            position_id: p.position_id.clone(),
        })
        .unwrap_or(SellGate::Hold)
}
