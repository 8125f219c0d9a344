//! Per-order quantity from margin, leverage and the buy window

use rust_decimal_macros::dec;

use crate::Money;

/// Share of leveraged margin committed across one buy window
pub const UTILIZATION: Money = Money::new(dec!(0.95));

/// Factor applied to the quantity after an insufficient-margin rejection
pub const MARGIN_RETRY_FACTOR: Money = Money::new(dec!(0.85));

/// One quantity for every order in the window, so that buying all of them
/// uses ~95% of leveraged margin.
pub fn size(
    available_margin: Money,
    leverage: u32,
    windowed_buy_prices: &[Money],
    base_precision: u32,
    min_volume: Money,
) -> Money {
    let sum: Money = windowed_buy_prices.iter().sum();
    if !sum.is_positive() {
        return min_volume;
    }

    let qty = (available_margin * Money::from(leverage) * UTILIZATION / sum).round_down(base_precision);
    qty.max(min_volume)
}

/// Quantity for the single retry after an insufficient-margin rejection
pub fn reduce_for_retry(qty: Money, base_precision: u32, min_volume: Money) -> Money {
    (qty * MARGIN_RETRY_FACTOR).round_down(base_precision).max(min_volume)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_size() {
        let qty = size(
            Money::from_i64(1000),
            3,
            &[Money::from_i64(100), Money::from_i64(200)],
            4,
            Money::new(dec!(0.001)),
        );
        assert_eq!(qty, Money::new(dec!(9.5)));
    }

    #[test]
    fn test_empty_window_is_min_volume() {
        let min = Money::new(dec!(0.0001));
        assert_eq!(size(Money::from_i64(1000), 3, &[], 4, min), min);
    }

    #[test]
    fn test_floor_at_min_volume() {
        let min = Money::new(dec!(0.001));
        let qty = size(Money::from_i64(1), 1, &[Money::from_i64(100000)], 4, min);
        assert_eq!(qty, min);
        assert_eq!(size(Money::ZERO, 3, &[Money::from_i64(100)], 4, min), min);
    }

    #[test]
    fn test_rounds_down_to_precision() {
        // 100 * 1 * 0.95 / 30000 = 0.0031666...
        let qty = size(
            Money::from_i64(100),
            1,
            &[Money::from_i64(30000)],
            4,
            Money::new(dec!(0.0001)),
        );
        assert_eq!(qty, Money::new(dec!(0.0031)));
    }

    #[test]
    fn test_monotonic_in_margin_and_leverage() {
        let window = [Money::from_i64(95000), Money::from_i64(96000)];
        let min = Money::new(dec!(0.0001));
        let a = size(Money::from_i64(500), 3, &window, 4, min);
        let b = size(Money::from_i64(1500), 3, &window, 4, min);
        let c = size(Money::from_i64(1500), 5, &window, 4, min);
        assert!(a <= b && b <= c);
    }

    #[test]
    fn test_non_increasing_as_window_sum_grows() {
        let min = Money::new(dec!(0.0001));
        let available = Money::from_i64(1000);

        // widen the window one level at a time, 90000, 92000, ...
        let mut window = Vec::new();
        let mut previous: Option<Money> = None;
        for step in 0..30 {
            window.push(Money::from_i64(90000 + 2000 * step));
            let qty = size(available, 3, &window, 4, min);
            assert!(qty >= min, "window of {} levels sized {}", window.len(), qty);
            if let Some(prev) = previous {
                assert!(qty <= prev, "{} > {} at {} levels", qty, prev, window.len());
            }
            previous = Some(qty);
        }

        // same level count, pricier levels
        let cheap = size(available, 3, &[Money::from_i64(100), Money::from_i64(200)], 4, min);
        let dear = size(available, 3, &[Money::from_i64(1000), Money::from_i64(2000)], 4, min);
        assert!(dear <= cheap);
    }

    #[test]
    fn test_reduce_for_retry() {
        let min = Money::new(dec!(0.001));
        assert_eq!(reduce_for_retry(Money::new(dec!(9.5)), 4, min), Money::new(dec!(8.075)));
        assert_eq!(reduce_for_retry(Money::new(dec!(0.001)), 3, min), min);
    }
}
