//! Exchange abstraction consumed by the grid engine
//!
//! The engine only ever talks to an [`ExchangeGateway`]; the Bitunix REST
//! client is one implementation and the integration tests supply another.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GatewayResult;
use crate::{Money, Side, Symbol};

/// Opening or closing leg of a futures order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Open,
    Close,
}

/// Time-in-force ("effect" on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good till cancelled
    #[default]
    #[serde(rename = "GTC")]
    Gtc,
    /// Immediate or cancel
    #[serde(rename = "IOC")]
    Ioc,
    /// Fill or kill
    #[serde(rename = "FOK")]
    Fok,
    /// Maker only; rejected instead of crossing the book
    #[serde(rename = "POST_ONLY")]
    PostOnly,
}

impl std::str::FromStr for TimeInForce {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GTC" => Ok(Self::Gtc),
            "IOC" => Ok(Self::Ioc),
            "FOK" => Ok(Self::Fok),
            "POST_ONLY" => Ok(Self::PostOnly),
            other => Err(format!("unknown time-in-force '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarginMode {
    #[default]
    Isolation,
    Cross,
}

impl std::str::FromStr for MarginMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ISOLATION" => Ok(Self::Isolation),
            "CROSS" => Ok(Self::Cross),
            other => Err(format!("unknown margin mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionMode {
    #[default]
    OneWay,
    Hedge,
}

impl std::str::FromStr for PositionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ONE_WAY" => Ok(Self::OneWay),
            "HEDGE" => Ok(Self::Hedge),
            other => Err(format!("unknown position mode '{}'", other)),
        }
    }
}

/// A limit order as the engine wants it placed
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub symbol: Symbol,
    pub side: Side,
    pub trade_side: TradeSide,
    pub price: Money,
    pub qty: Money,
    pub effect: TimeInForce,
    pub reduce_only: bool,
    pub client_id: String,
    pub position_id: Option<String>,
}

impl OrderRequest {
    /// LIMIT BUY that opens or adds to a long
    pub fn open_buy(symbol: &Symbol, price: Money, qty: Money, effect: TimeInForce) -> Self {
        Self {
            symbol: symbol.clone(),
            side: Side::Buy,
            trade_side: TradeSide::Open,
            price,
            qty,
            effect,
            reduce_only: false,
            client_id: client_id("pbuy", 8),
            position_id: None,
        }
    }

    /// Reduce-only LIMIT SELL closing against an existing long
    pub fn close_sell(
        symbol: &Symbol,
        price: Money,
        qty: Money,
        effect: TimeInForce,
        position_id: Option<String>,
    ) -> Self {
        Self {
            symbol: symbol.clone(),
            side: Side::Sell,
            trade_side: TradeSide::Close,
            price,
            qty,
            effect,
            reduce_only: true,
            client_id: client_id("psell", 8),
            position_id,
        }
    }

    /// Same order with a new quantity and a fresh client id
    pub fn resubmit_with_qty(&self, qty: Money) -> Self {
        let prefix = self.client_id.split('-').next().unwrap_or("order");
        Self {
            qty,
            client_id: client_id(prefix, 8),
            ..self.clone()
        }
    }
}

/// `<prefix>-<hex>` client order id, unique per submission
pub fn client_id(prefix: &str, hex_len: usize) -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, &hex[..hex_len.min(hex.len())])
}

/// Instrument rules needed for sizing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradingRules {
    /// Decimal places allowed in order quantity
    pub base_precision: u32,
    pub min_volume: Money,
}

impl Default for TradingRules {
    fn default() -> Self {
        Self {
            base_precision: 4,
            min_volume: Money::new(rust_decimal::Decimal::new(1, 4)),
        }
    }
}

/// An order the exchange still reports as open
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOrder {
    pub order_id: String,
    pub side: Option<String>,
    pub price: Option<Money>,
    pub qty: Option<Money>,
}

/// An open position as reported by the exchange
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangePosition {
    pub position_id: Option<String>,
    pub symbol: Option<String>,
    /// "LONG" or "SHORT"
    pub side: String,
    pub open_qty: Option<Money>,
}

/// Core exchange connector used by the engine and the CLI commands
#[async_trait]
pub trait ExchangeGateway: Send + Sync {
    /// Exchange name for logs
    fn name(&self) -> &str;

    /// Current leverage / margin mode for a symbol, raw payload
    async fn leverage_margin_mode(&self, symbol: &Symbol) -> GatewayResult<serde_json::Value>;

    async fn change_leverage(&self, symbol: &Symbol, leverage: u32) -> GatewayResult<()>;

    async fn change_margin_mode(&self, symbol: &Symbol, mode: MarginMode) -> GatewayResult<()>;

    async fn change_position_mode(&self, mode: PositionMode) -> GatewayResult<()>;

    /// Available margin in the settlement coin
    async fn available_margin(&self) -> GatewayResult<Money>;

    async fn trading_rules(&self, symbol: &Symbol) -> GatewayResult<TradingRules>;

    /// Submit an order, returning the exchange order id
    async fn place_order(&self, order: &OrderRequest) -> GatewayResult<String>;

    async fn pending_orders(&self, symbol: &Symbol) -> GatewayResult<Vec<PendingOrder>>;

    async fn cancel_orders(&self, symbol: &Symbol, order_ids: &[String]) -> GatewayResult<()>;

    async fn positions(&self, symbol: &Symbol) -> GatewayResult<Vec<ExchangePosition>>;
}
