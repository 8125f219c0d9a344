//! Credential verification before trading
//!
//! Commands that touch the exchange take a [`VerifiedSession`], which can only
//! be obtained by a successful [`Session::verify`].

use std::sync::Arc;

use crate::error::GatewayResult;
use crate::gateway::ExchangeGateway;
use crate::{Money, Symbol};

/// A gateway whose credentials have not been checked yet
pub struct Session {
    gateway: Arc<dyn ExchangeGateway>,
}

/// A gateway that answered both verification queries with code 0
pub struct VerifiedSession {
    gateway: Arc<dyn ExchangeGateway>,
    symbol: Symbol,
    available_margin: Money,
    leverage_margin_mode: serde_json::Value,
}

impl Session {
    pub fn new(gateway: Arc<dyn ExchangeGateway>) -> Self {
        Self { gateway }
    }

    /// Query leverage/margin mode for `symbol` and the account balance
    pub async fn verify(self, symbol: &Symbol) -> GatewayResult<VerifiedSession> {
        let leverage_margin_mode = self.gateway.leverage_margin_mode(symbol).await?;
        let available_margin = self.gateway.available_margin().await?;

        tracing::info!(
            exchange = self.gateway.name(),
            %symbol,
            %available_margin,
            "API connection verified"
        );

        Ok(VerifiedSession {
            gateway: self.gateway,
            symbol: symbol.clone(),
            available_margin,
            leverage_margin_mode,
        })
    }
}

impl VerifiedSession {
    pub fn gateway(&self) -> &dyn ExchangeGateway {
        self.gateway.as_ref()
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Margin reported at verification time
    pub fn available_margin(&self) -> Money {
        self.available_margin
    }

    pub fn leverage_margin_mode(&self) -> &serde_json::Value {
        &self.leverage_margin_mode
    }
}
