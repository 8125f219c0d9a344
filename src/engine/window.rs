//! Buy window selection below the detected cap

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::{Money, Plan, Side};

/// Fraction of the cap used as the top of the window
pub const CAP_MARGIN: Money = Money::new(dec!(0.999));

/// Levels eligible for placement this tick
#[derive(Debug, Clone, PartialEq)]
pub struct BuyWindow {
    pub high_bound: Money,
    pub low_bound: Money,
    /// Indices into `plan.levels()`, ascending by price
    pub indices: Vec<usize>,
}

impl BuyWindow {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Prices of the selected levels, in window order
    pub fn prices(&self, plan: &Plan) -> Vec<Money> {
        self.indices
            .iter()
            .filter_map(|&i| plan.levels().get(i))
            .map(|l| l.price())
            .collect()
    }
}

/// Window bounds for a cap: `hb = round2(cap * 0.999)`, `lb = round2(hb * (1 - band/100))`
pub fn bounds(cap: Money, band_pct: f64) -> (Money, Money) {
    let high = (cap * CAP_MARGIN).round_dp(2);
    let band = Money::from_f64(band_pct) / Money::new(Decimal::ONE_HUNDRED);
    let low = (high * (Money::ONE - band)).round_dp(2);
    (high, low)
}

/// PENDING BUY levels priced within `[low_bound, high_bound]`, lowest first,
/// at most `max_place` of them.
pub fn select_buy_window(plan: &Plan, cap: Money, band_pct: f64, max_place: usize) -> BuyWindow {
    let (high_bound, low_bound) = bounds(cap, band_pct);

    let mut indices: Vec<usize> = plan
        .levels()
        .iter()
        .enumerate()
        .filter(|(_, l)| {
            l.side() == Side::Buy
                && l.is_pending()
                && l.price() >= low_bound
                && l.price() <= high_bound
        })
        .map(|(i, _)| i)
        .collect();

    // stable sort keeps plan order for duplicate prices
    indices.sort_by_key(|&i| plan.levels()[i].price());
    indices.truncate(max_place);

    BuyWindow {
        high_bound,
        low_bound,
        indices,
    }
}
