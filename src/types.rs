//! Core data types used across the grid engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// Symbol
// ============================================================================

/// Trading pair symbol using Arc<str> for cheap cloning
///
/// Symbols are cloned into every order request and tick record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(#[serde(with = "arc_str_serde")] Arc<str>);

/// Custom serde for Arc<str>
mod arc_str_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::sync::Arc;

    pub fn serialize<S>(value: &Arc<str>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Arc<str>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Arc::from(s.as_str()))
    }
}

impl Symbol {
    pub fn new(s: impl AsRef<str>) -> Self {
        Symbol(Arc::from(s.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Ladder types
// ============================================================================

/// Order direction of a ladder level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Lifecycle of a level. Only ever moves forward: Pending -> Placed -> Filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LevelStatus {
    Pending,
    Placed,
    Filled,
}

impl LevelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelStatus::Pending => "PENDING",
            LevelStatus::Placed => "PLACED",
            LevelStatus::Filled => "FILLED",
        }
    }
}

impl std::fmt::Display for LevelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// One rung of the ladder.
///
/// Fields are private so that price stays fixed and status only advances
/// through [`Level::mark_placed`] and [`Level::mark_filled`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    side: Side,
    price: Money,
    status: LevelStatus,
    #[serde(default, alias = "orderId")]
    order_id: Option<String>,
}

impl Level {
    pub fn new(side: Side, price: Money) -> Self {
        Self {
            side,
            price,
            status: LevelStatus::Pending,
            order_id: None,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn status(&self) -> LevelStatus {
        self.status
    }

    pub fn order_id(&self) -> Option<&str> {
        self.order_id.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.status == LevelStatus::Pending
    }

    /// Record an accepted order. Returns false (and changes nothing) unless the
    /// level is still pending.
    pub fn mark_placed(&mut self, order_id: impl Into<String>) -> bool {
        if self.status != LevelStatus::Pending {
            return false;
        }
        self.status = LevelStatus::Placed;
        self.order_id = Some(order_id.into());
        true
    }

    /// Record a fill. Requires an order id; the id is kept for audit.
    pub fn mark_filled(&mut self) -> bool {
        if self.status == LevelStatus::Filled || self.order_id.is_none() {
            return false;
        }
        self.status = LevelStatus::Filled;
        true
    }
}

/// Generating parameters of a plan, kept for provenance only
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanMeta {
    /// Unix seconds
    #[serde(default)]
    pub created: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lowest_buy: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highest_buy: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highest_sell: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_levels: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_levels: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_fraction: Option<f64>,
}

/// The full ladder for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub symbol: Symbol,
    #[serde(default)]
    levels: Vec<Level>,
    #[serde(default)]
    pub meta: PlanMeta,
}

impl Plan {
    pub fn new(symbol: Symbol, levels: Vec<Level>, meta: PlanMeta) -> Self {
        Self {
            symbol,
            levels,
            meta,
        }
    }

    /// A plan with no levels, as written before the first `make-plan`
    pub fn empty(symbol: Symbol) -> Self {
        Self::new(
            symbol,
            Vec::new(),
            PlanMeta {
                created: Utc::now().timestamp(),
                ..PlanMeta::default()
            },
        )
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Mutable access to individual levels. The vector itself is not exposed,
    /// so ticks can never add or remove rungs.
    pub fn levels_mut(&mut self) -> &mut [Level] {
        &mut self.levels
    }

    pub fn level_mut(&mut self, idx: usize) -> Option<&mut Level> {
        self.levels.get_mut(idx)
    }

    pub fn stats(&self) -> PlanStats {
        let mut stats = PlanStats {
            total: self.levels.len(),
            ..PlanStats::default()
        };
        for level in &self.levels {
            match level.status() {
                LevelStatus::Pending => stats.pending += 1,
                LevelStatus::Placed => stats.placed += 1,
                LevelStatus::Filled => stats.filled += 1,
            }
        }
        stats
    }
}

/// Level totals by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanStats {
    pub total: usize,
    pub pending: usize,
    pub placed: usize,
    pub filled: usize,
}

impl std::fmt::Display for PlanStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "total {} placed {} filled {} pending {}",
            self.total, self.placed, self.filled, self.pending
        )
    }
}

/// Summary of one tick, for logging only
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickResult {
    pub timestamp: DateTime<Utc>,
    pub symbol: Symbol,
    pub cap: Money,
    pub high_bound: Money,
    pub low_bound: Money,
    pub band_pct: f64,
    pub quantity: Money,
    pub placed_buys: usize,
    pub placed_sells: usize,
    pub filled_this_tick: usize,
    pub available_margin: Money,
    pub leverage: u32,
    pub sum_buy_prices: Money,
}

// ============================================================================
// Money Type - Precise Decimal Arithmetic for Monetary Values
// ============================================================================

use rust_decimal::{Decimal, RoundingStrategy};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Sub};
use std::str::FromStr;

/// Money type for precise decimal arithmetic on prices, quantities and margin.
///
/// Wraps `rust_decimal::Decimal`. Serializes as a string and accepts strings,
/// integers or floats when deserializing, so hand-edited plan files load.
///
/// # Example
/// ```
/// use grid_ladder::Money;
/// let price = Money::from_f64(100.50);
/// let qty = Money::from_f64(2.0);
/// let total = price * qty;
/// assert_eq!(total.to_f64(), 201.0);
/// ```
#[derive(Debug, Clone, Copy, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero value
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// One value
    pub const ONE: Money = Money(Decimal::ONE);

    pub const fn new(value: Decimal) -> Self {
        Money(value)
    }

    /// Create from f64. NaN and infinities map to zero.
    pub fn from_f64(value: f64) -> Self {
        Money(Decimal::try_from(value).unwrap_or_else(|_| {
            if value.is_nan() || value.is_infinite() {
                Decimal::ZERO
            } else {
                Decimal::from_f64_retain(value).unwrap_or(Decimal::ZERO)
            }
        }))
    }

    /// Convert to f64 (CSV columns, display)
    pub fn to_f64(self) -> f64 {
        use rust_decimal::prelude::ToPrimitive;
        self.0.to_f64().unwrap_or(0.0)
    }

    /// Create from i64 (for whole number values)
    pub fn from_i64(value: i64) -> Self {
        Money(Decimal::from(value))
    }

    /// Check if value is zero
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Check if value is positive
    pub fn is_positive(self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Get maximum of two values
    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }

    /// Get minimum of two values
    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    /// Round half away from zero to `dp` decimal places
    pub fn round_dp(self, dp: u32) -> Self {
        Money(
            self.0
                .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
                .normalize(),
        )
    }

    /// Truncate toward zero to `dp` decimal places
    pub fn round_down(self, dp: u32) -> Self {
        Money(
            self.0
                .round_dp_with_strategy(dp, RoundingStrategy::ToZero)
                .normalize(),
        )
    }

    /// Get the underlying Decimal
    pub fn inner(self) -> Decimal {
        self.0
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Money)
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Money {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl std::hash::Hash for Money {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.normalize().hash(state);
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl Mul for Money {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        Money(self.0 * rhs.0)
    }
}

impl Div for Money {
    type Output = Self;
    fn div(self, rhs: Self) -> Self::Output {
        if rhs.0.is_zero() {
            Money::ZERO
        } else {
            Money(self.0 / rhs.0)
        }
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Money(value)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Money::from_i64(value)
    }
}

impl From<u32> for Money {
    fn from(value: u32) -> Self {
        Money(Decimal::from(value))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, x| acc + x)
    }
}

impl<'a> std::iter::Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, x| acc + *x)
    }
}


#[cfg(test)]
mod level_tests {
    use super::*;

    #[test]
    fn test_new_level_is_pending_without_id() {
        let level = Level::new(Side::Buy, Money::from_i64(100));
        assert_eq!(level.status(), LevelStatus::Pending);
        assert!(level.order_id().is_none());
    }

    #[test]
    fn test_status_only_moves_forward() {
        let mut level = Level::new(Side::Buy, Money::from_i64(100));
        assert!(!level.mark_filled(), "pending level without id cannot fill");

        assert!(level.mark_placed("A1"));
        assert!(!level.mark_placed("B2"), "placed level keeps its first id");
        assert_eq!(level.order_id(), Some("A1"));

        assert!(level.mark_filled());
        assert!(!level.mark_filled());
        assert!(!level.mark_placed("C3"));
        assert_eq!(level.status(), LevelStatus::Filled);
        assert_eq!(level.order_id(), Some("A1"));
    }

    #[test]
    fn test_plan_stats() {
        let mut levels = vec![
            Level::new(Side::Buy, Money::from_i64(1)),
            Level::new(Side::Buy, Money::from_i64(2)),
            Level::new(Side::Sell, Money::from_i64(3)),
        ];
        levels[0].mark_placed("x");
        levels[1].mark_placed("y");
        levels[1].mark_filled();
        let plan = Plan::new(Symbol::new("BTCUSDT"), levels, PlanMeta::default());

        let stats = plan.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.placed, 1);
        assert_eq!(stats.filled, 1);
        assert_eq!(stats.pending, 1);
    }

    #[test]
    fn test_level_yaml_accepts_legacy_keys() {
        let yaml = "side: BUY\nprice: 90000.0\nstatus: PLACED\norderId: '123'\n";
        let level: Level = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(level.side(), Side::Buy);
        assert_eq!(level.price(), Money::from_i64(90000));
        assert_eq!(level.order_id(), Some("123"));
    }
}
