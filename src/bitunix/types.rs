//! Request and response types for the Bitunix futures API
//!
//! Responses are wrapped in `{code, msg, data}`. The shape of `data` varies
//! between endpoints (object, list, or object holding a list) and numbers are
//! frequently sent as strings, so payloads are kept as `serde_json::Value` and
//! picked apart with the lenient helpers below.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::GatewayError;
use crate::gateway::{ExchangePosition, OrderRequest, PendingOrder, TradingRules};
use crate::Money;

/// Response envelope shared by every endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(default = "missing_code", deserialize_with = "deserialize_code")]
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    /// `data` on success, `Rejected` otherwise
    pub fn into_data(self) -> Result<Value, GatewayError> {
        if self.code == 0 {
            Ok(self.data)
        } else {
            Err(GatewayError::Rejected {
                code: self.code,
                msg: self.msg,
            })
        }
    }
}

fn missing_code() -> i64 {
    -1
}

/// Accept the response code as either a number or a numeric string
fn deserialize_code<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct CodeVisitor;

    impl<'de> Visitor<'de> for CodeVisitor {
        type Value = i64;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("an integer or a numeric string")
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<i64, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<i64, E> {
            i64::try_from(value).map_err(E::custom)
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<i64, E> {
            Ok(value as i64)
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<i64, E> {
            value.trim().parse().map_err(E::custom)
        }

        fn visit_unit<E: de::Error>(self) -> Result<i64, E> {
            Ok(-1)
        }
    }

    deserializer.deserialize_any(CodeVisitor)
}

// ============================================================================
// Request bodies
// ============================================================================

/// Body of `POST /api/v1/futures/trade/place_order`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderBody {
    pub symbol: String,
    pub side: &'static str,
    pub trade_side: &'static str,
    pub order_type: &'static str,
    pub qty: String,
    pub price: String,
    pub effect: &'static str,
    pub reduce_only: bool,
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_id: Option<String>,
}

impl From<&OrderRequest> for PlaceOrderBody {
    fn from(order: &OrderRequest) -> Self {
        use crate::gateway::{TimeInForce, TradeSide};

        Self {
            symbol: order.symbol.as_str().to_string(),
            side: order.side.as_str(),
            trade_side: match order.trade_side {
                TradeSide::Open => "OPEN",
                TradeSide::Close => "CLOSE",
            },
            order_type: "LIMIT",
            qty: order.qty.to_string(),
            price: order.price.to_string(),
            effect: match order.effect {
                TimeInForce::Gtc => "GTC",
                TimeInForce::Ioc => "IOC",
                TimeInForce::Fok => "FOK",
                TimeInForce::PostOnly => "POST_ONLY",
            },
            reduce_only: order.reduce_only,
            client_id: order.client_id.clone(),
            position_id: order.position_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderRef {
    pub order_id: String,
    pub symbol: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrdersBody {
    pub order_id_list: Vec<CancelOrderRef>,
}

// ============================================================================
// Lenient field extraction
// ============================================================================

/// String view of a field that may be a string or a number
pub fn field_str(obj: &Value, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Decimal view of a field; unparseable values count as absent
pub fn field_money(obj: &Value, key: &str) -> Option<Money> {
    field_str(obj, key)?.parse().ok()
}

/// First row of a list payload, or the payload itself when it is an object
pub fn first_row(data: &Value) -> Option<&Value> {
    match data {
        Value::Array(rows) => rows.first(),
        Value::Object(_) => Some(data),
        _ => None,
    }
}

/// Rows of a list payload, also accepting `{ <key>: [...] }`
pub fn rows<'a>(data: &'a Value, nested_key: &str) -> &'a [Value] {
    match data {
        Value::Array(items) => items.as_slice(),
        Value::Object(_) => data
            .get(nested_key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}

// ============================================================================
// Payload extraction
// ============================================================================

/// Field names that have carried the available margin, in preference order
const AVAILABLE_MARGIN_KEYS: [&str; 5] = [
    "available",
    "availableBalance",
    "availableMargin",
    "cashBalance",
    "availableCash",
];

pub fn parse_available_margin(data: &Value) -> Money {
    first_row(data)
        .and_then(|row| {
            AVAILABLE_MARGIN_KEYS
                .iter()
                .find_map(|key| field_money(row, key))
        })
        .unwrap_or(Money::ZERO)
}

pub fn parse_trading_rules(data: &Value) -> TradingRules {
    let defaults = TradingRules::default();
    let Some(row) = first_row(data) else {
        return defaults;
    };
    TradingRules {
        base_precision: field_str(row, "basePrecision")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.base_precision),
        min_volume: field_money(row, "minTradeVolume").unwrap_or(defaults.min_volume),
    }
}

pub fn parse_order_id(data: &Value) -> Option<String> {
    field_str(data, "orderId")
}

pub fn parse_pending_orders(data: &Value) -> Vec<PendingOrder> {
    rows(data, "orderList")
        .iter()
        .filter_map(|row| {
            Some(PendingOrder {
                order_id: field_str(row, "orderId")?,
                side: field_str(row, "side"),
                price: field_money(row, "price"),
                qty: field_money(row, "qty"),
            })
        })
        .collect()
}

pub fn parse_positions(data: &Value) -> Vec<ExchangePosition> {
    rows(data, "positionList")
        .iter()
        .map(|row| ExchangePosition {
            position_id: field_str(row, "positionId"),
            symbol: field_str(row, "symbol"),
            side: field_str(row, "side").unwrap_or_default().to_ascii_uppercase(),
            open_qty: field_money(row, "openQty").or_else(|| field_money(row, "qty")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_envelope_code_as_string() {
        let env: Envelope = serde_json::from_str(r#"{"code":"20003","msg":"margin"}"#).unwrap();
        let err = env.into_data().unwrap_err();
        assert!(err.is_insufficient_margin());
    }

    #[test]
    fn test_envelope_without_code_is_rejected() {
        let env: Envelope = serde_json::from_str(r#"{"msg":"gateway error"}"#).unwrap();
        assert_eq!(env.into_data().unwrap_err().rejection_code(), Some(-1));
    }

    #[test]
    fn test_envelope_success() {
        let env: Envelope =
            serde_json::from_str(r#"{"code":0,"msg":"ok","data":{"orderId":"77"}}"#).unwrap();
        let data = env.into_data().unwrap();
        assert_eq!(parse_order_id(&data), Some("77".to_string()));
    }

    #[test]
    fn test_available_margin_key_fallback() {
        let data = json!([{ "cashBalance": "12.5", "availableCash": "99" }]);
        assert_eq!(parse_available_margin(&data), Money::new(dec!(12.5)));

        let data = json!({ "available": 1000 });
        assert_eq!(parse_available_margin(&data), Money::from_i64(1000));

        let data = json!({ "available": "n/a", "availableBalance": "7" });
        assert_eq!(parse_available_margin(&data), Money::from_i64(7));

        assert_eq!(parse_available_margin(&json!(null)), Money::ZERO);
    }

    #[test]
    fn test_trading_rules_defaults() {
        let rules = parse_trading_rules(&json!([{ "basePrecision": 3 }]));
        assert_eq!(rules.base_precision, 3);
        assert_eq!(rules.min_volume, Money::new(dec!(0.0001)));

        let rules = parse_trading_rules(&json!([]));
        assert_eq!(rules, TradingRules::default());
    }

    #[test]
    fn test_pending_orders_both_shapes() {
        let flat = json!([{ "orderId": "1" }, { "orderId": 2 }, { "side": "BUY" }]);
        let ids: Vec<_> = parse_pending_orders(&flat)
            .into_iter()
            .map(|o| o.order_id)
            .collect();
        assert_eq!(ids, vec!["1", "2"]);

        let nested = json!({ "orderList": [{ "orderId": "9", "price": "95000" }] });
        let orders = parse_pending_orders(&nested);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].price, Some(Money::from_i64(95000)));
    }

    #[test]
    fn test_positions_open_qty_fallback() {
        let data = json!([
            { "positionId": "p1", "side": "long", "qty": "0.5" },
            { "positionId": "p2", "side": "SHORT", "openQty": "1" }
        ]);
        let positions = parse_positions(&data);
        assert_eq!(positions[0].side, "LONG");
        assert_eq!(positions[0].open_qty, Some(Money::new(dec!(0.5))));
        assert_eq!(positions[1].position_id.as_deref(), Some("p2"));
    }

    #[test]
    fn test_place_order_body_wire_shape() {
        use crate::gateway::TimeInForce;
        use crate::Symbol;

        let order = OrderRequest::close_sell(
            &Symbol::new("BTCUSDT"),
            Money::new(dec!(103333.33)),
            Money::new(dec!(0.0100)),
            TimeInForce::Gtc,
            Some("pos-1".into()),
        );
        let body = serde_json::to_value(PlaceOrderBody::from(&order)).unwrap();
        assert_eq!(body["tradeSide"], "CLOSE");
        assert_eq!(body["orderType"], "LIMIT");
        assert_eq!(body["reduceOnly"], true);
        assert_eq!(body["price"], "103333.33");
        assert_eq!(body["qty"], "0.01");
        assert_eq!(body["positionId"], "pos-1");
    }
}
