//! Period and compare arithmetic shared by every duty-cycle setter.

/// Ticks per period minus one, for a clock divided by `divider`:
/// `floor(clock_hz / (frequency_hz * divider)) - 1`.
///
/// Saturates at 0 when the divided clock is slower than the requested frequency, and
/// returns 0 for a zero frequency or divider.
#[must_use]
pub const fn period_count(clock_hz: u32, frequency_hz: u32, divider: u8) -> u32 {
    let ticks_per_second = match clock_hz.checked_div(divider as u32) {
        Some(ticks_per_second) => ticks_per_second,
        None => return 0,
    };
    match ticks_per_second.checked_div(frequency_hz) {
        Some(ticks) => ticks.saturating_sub(1),
        None => 0,
    }
}

/// `round(period_count * numerator / denominator)`, rounding exactly once.
///
/// Ties round down, so 50% of 124 999 is 62 499. The caller keeps `numerator` within
/// `0..=denominator`.
#[must_use]
pub(crate) fn compare_value(period_count: u32, numerator: f64, denominator: f64) -> u32 {
    if denominator <= 0.0 {
        return 0;
    }
    let exact = f64::from(period_count) * numerator / denominator;
    round_half_down(exact).min(period_count)
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "`as` saturates; value is non-negative and at most a u32 period"
)]
fn round_half_down(value: f64) -> u32 {
    let floor = value as u32;
    if value - f64::from(floor) > 0.5 {
        floor.saturating_add(1)
    } else {
        floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_count_at_125_mhz() {
        assert_eq!(period_count(125_000_000, 1_000, 1), 124_999);
        assert_eq!(period_count(125_000_000, 2_000, 1), 62_499);
        assert_eq!(period_count(125_000_000, 62_500_000, 1), 1);
        assert_eq!(period_count(125_000_000, 1, 1), 124_999_999);
    }

    #[test]
    fn period_count_with_divider() {
        assert_eq!(period_count(125_000_000, 50, 64), 39_061);
    }

    #[test]
    fn period_count_never_underflows() {
        assert_eq!(period_count(125_000_000, 200_000_000, 1), 0);
        assert_eq!(period_count(125_000_000, 0, 1), 0);
        assert_eq!(period_count(125_000_000, 1_000, 0), 0);
    }

    #[test]
    fn compare_rounds_once_with_ties_down() {
        assert_eq!(compare_value(124_999, 50.0, 100.0), 62_499);
        assert_eq!(compare_value(62_499, 50.0, 100.0), 31_249);
        assert_eq!(compare_value(999, 25.0, 100.0), 250);
        assert_eq!(compare_value(999, 512.0, 1024.0), 499);
        // 1000 * 0.3333 = 333.3 -> 333, 1000 * 0.6667 = 666.7 -> 667
        assert_eq!(compare_value(1_000, 1.0, 3.0), 333);
        assert_eq!(compare_value(1_000, 2.0, 3.0), 667);
    }

    #[test]
    fn compare_spans_the_full_period() {
        assert_eq!(compare_value(124_999, 0.0, 100.0), 0);
        assert_eq!(compare_value(124_999, 100.0, 100.0), 124_999);
        assert_eq!(compare_value(124_999, 1024.0, 1024.0), 124_999);
    }
}
