//! Bitunix futures REST client
//!
//! Signed GET/POST over `reqwest` with a fixed request timeout. Requests are
//! sent exactly once: placing an order is not idempotent, so a transport
//! failure is reported to the caller instead of being retried here.
//!
//! # Example
//!
//! ```no_run
//! use grid_ladder::bitunix::{BitunixClient, Credentials};
//! use grid_ladder::gateway::ExchangeGateway;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = BitunixClient::new(Credentials::new("api_key", "api_secret"))?;
//!     let margin = client.available_margin().await?;
//!     println!("available: {} USDT", margin);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::auth::{sorted_query_string, Credentials};
use super::types::*;
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::{
    ExchangeGateway, ExchangePosition, MarginMode, OrderRequest, PendingOrder, PositionMode,
    TradingRules,
};
use crate::{Money, Symbol};

/// Base URL for the Bitunix futures API
pub const API_BASE_URL: &str = "https://fapi.bitunix.com";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Request timeout duration
    pub timeout: Duration,
    /// Settlement coin for account queries
    pub margin_coin: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: API_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            margin_coin: "USDT".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_margin_coin(mut self, coin: impl Into<String>) -> Self {
        self.margin_coin = coin.into();
        self
    }
}

/// Bitunix perpetual-futures API client
#[derive(Clone)]
pub struct BitunixClient {
    credentials: Credentials,
    http_client: Client,
    config: ClientConfig,
}

impl BitunixClient {
    pub fn new(credentials: Credentials) -> GatewayResult<Self> {
        Self::with_config(credentials, ClientConfig::default())
    }

    pub fn with_config(credentials: Credentials, config: ClientConfig) -> GatewayResult<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            credentials,
            http_client,
            config,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    /// Make an authenticated GET request
    async fn signed_get(&self, endpoint: &str, params: &[(String, String)]) -> GatewayResult<Value> {
        let mut sorted = params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        let headers = self.credentials.sign(&sorted_query_string(&sorted), "");

        tracing::debug!(endpoint, "GET");
        let request = self
            .http_client
            .get(self.url(endpoint))
            .query(&sorted)
            .header("api-key", self.credentials.api_key())
            .header("nonce", headers.nonce)
            .header("timestamp", headers.timestamp)
            .header("sign", headers.sign)
            .header("language", "en-US")
            .header("Content-Type", "application/json");

        Self::decode(request.send().await?).await
    }

    /// Make an authenticated POST request
    async fn signed_post<T>(&self, endpoint: &str, body: &T) -> GatewayResult<Value>
    where
        T: serde::Serialize + ?Sized,
    {
        let json_body = serde_json::to_string(body)?;
        let headers = self.credentials.sign("", &json_body);

        tracing::debug!(endpoint, body = %json_body, "POST");
        let request = self
            .http_client
            .post(self.url(endpoint))
            .header("api-key", self.credentials.api_key())
            .header("nonce", headers.nonce)
            .header("timestamp", headers.timestamp)
            .header("sign", headers.sign)
            .header("language", "en-US")
            .header("Content-Type", "application/json")
            .body(json_body);

        Self::decode(request.send().await?).await
    }

    async fn decode(response: reqwest::Response) -> GatewayResult<Value> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(GatewayError::Transport(format!("HTTP {}: {}", status, text)));
        }

        let envelope: Envelope = serde_json::from_str(&text)?;
        envelope.into_data()
    }

    fn symbol_params(&self, symbol: &Symbol) -> Vec<(String, String)> {
        vec![
            ("symbol".to_string(), symbol.as_str().to_string()),
            ("marginCoin".to_string(), self.config.margin_coin.clone()),
        ]
    }
}

#[async_trait]
impl ExchangeGateway for BitunixClient {
    fn name(&self) -> &str {
        "bitunix"
    }

    async fn leverage_margin_mode(&self, symbol: &Symbol) -> GatewayResult<Value> {
        self.signed_get(
            "/api/v1/futures/account/get_leverage_margin_mode",
            &self.symbol_params(symbol),
        )
        .await
    }

    async fn change_leverage(&self, symbol: &Symbol, leverage: u32) -> GatewayResult<()> {
        let body = json!({
            "symbol": symbol.as_str(),
            "leverage": leverage,
            "marginCoin": self.config.margin_coin,
        });
        self.signed_post("/api/v1/futures/account/change_leverage", &body)
            .await
            .map(|_| ())
    }

    async fn change_margin_mode(&self, symbol: &Symbol, mode: MarginMode) -> GatewayResult<()> {
        let body = json!({
            "symbol": symbol.as_str(),
            "marginMode": mode,
            "marginCoin": self.config.margin_coin,
        });
        self.signed_post("/api/v1/futures/account/change_margin_mode", &body)
            .await
            .map(|_| ())
    }

    async fn change_position_mode(&self, mode: PositionMode) -> GatewayResult<()> {
        let body = json!({ "positionMode": mode });
        self.signed_post("/api/v1/futures/account/change_position_mode", &body)
            .await
            .map(|_| ())
    }

    async fn available_margin(&self) -> GatewayResult<Money> {
        let params = [("marginCoin".to_string(), self.config.margin_coin.clone())];
        let data = self.signed_get("/api/v1/futures/account", &params).await?;
        Ok(parse_available_margin(&data))
    }

    async fn trading_rules(&self, symbol: &Symbol) -> GatewayResult<TradingRules> {
        let params = [("symbols".to_string(), symbol.as_str().to_string())];
        let data = self
            .signed_get("/api/v1/futures/market/trading_pairs", &params)
            .await?;
        Ok(parse_trading_rules(&data))
    }

    async fn place_order(&self, order: &OrderRequest) -> GatewayResult<String> {
        let body = PlaceOrderBody::from(order);
        let data = self
            .signed_post("/api/v1/futures/trade/place_order", &body)
            .await?;
        parse_order_id(&data)
            .ok_or_else(|| GatewayError::Transport("place_order response without orderId".into()))
    }

    async fn pending_orders(&self, symbol: &Symbol) -> GatewayResult<Vec<PendingOrder>> {
        let body = json!({ "symbol": symbol.as_str() });
        let data = self
            .signed_post("/api/v1/futures/trade/get_pending_orders", &body)
            .await?;
        Ok(parse_pending_orders(&data))
    }

    async fn cancel_orders(&self, symbol: &Symbol, order_ids: &[String]) -> GatewayResult<()> {
        if order_ids.is_empty() {
            return Ok(());
        }
        let body = CancelOrdersBody {
            order_id_list: order_ids
                .iter()
                .map(|id| CancelOrderRef {
                    order_id: id.clone(),
                    symbol: symbol.as_str().to_string(),
                })
                .collect(),
        };
        self.signed_post("/api/v1/futures/trade/cancel_orders", &body)
            .await
            .map(|_| ())
    }

    async fn positions(&self, symbol: &Symbol) -> GatewayResult<Vec<ExchangePosition>> {
        let params = [("symbol".to_string(), symbol.as_str().to_string())];
        let data = self
            .signed_get("/api/v1/futures/position/get_pending_positions", &params)
            .await?;
        Ok(parse_positions(&data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, API_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.margin_coin, "USDT");
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::default()
            .with_base_url("http://localhost:8080/")
            .with_timeout(Duration::from_secs(5))
            .with_margin_coin("USDC");

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.margin_coin, "USDC");

        let client =
            BitunixClient::with_config(Credentials::new("k", "s"), config).unwrap();
        assert_eq!(
            client.url("/api/v1/futures/account"),
            "http://localhost:8080/api/v1/futures/account"
        );
        assert_eq!(client.name(), "bitunix");
    }

    #[test]
    fn test_symbol_params() {
        let client = BitunixClient::new(Credentials::new("k", "s")).unwrap();
        let params = client.symbol_params(&Symbol::new("ETHUSDT"));
        assert_eq!(sorted_query_string(&params), "marginCoinUSDTsymbolETHUSDT");
    }
}
