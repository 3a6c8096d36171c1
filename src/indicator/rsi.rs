use crate::indicator::window::{Series, wilder};

pub const SLOW_PERIOD: usize = 14;
pub const FAST_PERIOD: usize = 6;

/// RSI (Relative Strength Index) using Wilder's smoothing method.
///
/// Needs `period + 1` closes for the first value. A zero average loss
/// reads as 100.
pub fn rsi(closes: &[Option<f64>], period: usize) -> Series {
    let deltas: Series = (0..closes.len())
        .map(|i| Some(closes[i]? - closes[i.checked_sub(1)?]?))
        .collect();
    let gains: Series = deltas.iter().map(|d| d.map(|d| d.max(0.0))).collect();
    let losses: Series = deltas.iter().map(|d| d.map(|d| (-d).max(0.0))).collect();

    wilder(&gains, period)
        .into_iter()
        .zip(wilder(&losses, period))
        .map(|(g, l)| Some(rsi_value(g?, l?)))
        .collect()
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closes(xs: &[f64]) -> Series {
        xs.iter().copied().map(Some).collect()
    }

    #[test]
    fn rsi_insufficient_data() {
        let values = rsi(&closes(&[1.0; 14]), 14);
        assert!(values.iter().all(Option::is_none));
    }

    #[test]
    fn rsi_first_value_after_period_plus_one() {
        let values = rsi(&closes(&[100.0; 20]), 14);
        assert!(values[13].is_none());
        assert!(values[14].is_some());
        assert_eq!(values.iter().flatten().count(), 20 - 14);
    }

    #[test]
    fn rsi_all_gains_returns_100() {
        let values = rsi(&closes(&[1.0, 2.0, 3.0, 4.0]), 3);
        assert_eq!(values[3], Some(100.0));
    }

    #[test]
    fn rsi_all_losses_returns_0() {
        let values = rsi(&closes(&[4.0, 3.0, 2.0, 1.0]), 3);
        assert!((values[3].unwrap() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn rsi_balanced_moves_is_fifty() {
        let values = rsi(&closes(&[10.0, 11.0, 10.0, 11.0, 10.0]), 4);
        assert!((values[4].unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn fast_rsi_reacts_before_slow_rsi() {
        let mut xs: Vec<f64> = (0..20).map(|i| 30.0 + i as f64).collect();
        xs.extend((1..=6).map(|i| 49.0 - i as f64));
        let prices = closes(&xs);
        let fast = rsi(&prices, FAST_PERIOD);
        let slow = rsi(&prices, SLOW_PERIOD);
        let last = xs.len() - 1;
        assert!(fast[last].unwrap() < slow[last].unwrap());
    }

    #[test]
    fn missing_close_restarts_warm_up() {
        let mut prices = closes(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]);
        prices[3] = None;
        let values = rsi(&prices, 2);
        assert_eq!(values[2], Some(100.0));
        // deltas at 3 and 4 are missing; the seed needs deltas 5 and 6
        assert_eq!(values[4], None);
        assert_eq!(values[5], None);
        assert_eq!(values[6], Some(100.0));
    }
}
