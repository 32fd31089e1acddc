use crate::error::{BacktestError, Result};

//trailing simple moving average over `window` closes
//position i holds the mean of closes[i + 1 - window ..= i], or None during warmup
pub fn simple_moving_average(closes: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    if window == 0 || window > closes.len() {
        return Err(BacktestError::InvalidWindow {
            window,
            len: closes.len(),
        });
    }

    let warmup = std::iter::repeat(None).take(window - 1);
    let averages = closes.windows(window).map(|slice| Some(mean(slice)));

    Ok(warmup.chain(averages).collect())
}

//arithmetic mean of a non-empty slice
pub fn mean(prices: &[f64]) -> f64 {
    prices.iter().sum::<f64>() / prices.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CLOSES: [f64; 10] = [10.0, 11.0, 12.5, 12.0, 13.0, 14.5, 14.0, 13.5, 15.0, 16.0];

    #[test]
    fn matches_direct_summation() {
        let averages = simple_moving_average(&CLOSES, 3).unwrap();

        assert_eq!(averages.len(), 10);
        assert_eq!(averages[0], None);
        assert_eq!(averages[1], None);
        for i in 2..10 {
            let expected = (CLOSES[i - 2] + CLOSES[i - 1] + CLOSES[i]) / 3.0;
            assert_eq!(averages[i], Some(expected), "bar {}", i);
        }
    }

    #[test]
    fn window_of_one_is_the_series() {
        let averages = simple_moving_average(&CLOSES, 1).unwrap();
        let expected: Vec<Option<f64>> = CLOSES.iter().copied().map(Some).collect();
        assert_eq!(averages, expected);
    }

    #[test]
    fn window_equal_to_length_has_one_value() {
        let averages = simple_moving_average(&CLOSES, 10).unwrap();
        assert_eq!(averages.iter().position(Option::is_some), Some(9));
        assert_eq!(averages[9], Some(CLOSES.iter().sum::<f64>() / 10.0));
    }

    #[test]
    fn zero_window_is_rejected() {
        let err = simple_moving_average(&CLOSES, 0).unwrap_err();
        assert!(matches!(err, BacktestError::InvalidWindow { window: 0, len: 10 }));
    }

    #[test]
    fn window_longer_than_series_is_rejected() {
        let err = simple_moving_average(&CLOSES, 11).unwrap_err();
        assert!(matches!(err, BacktestError::InvalidWindow { window: 11, len: 10 }));
    }

    #[test]
    fn empty_series_is_rejected() {
        assert!(simple_moving_average(&[], 1).is_err());
    }

    proptest! {
        #[test]
        fn warmup_length_is_window_minus_one(
            closes in prop::collection::vec(1.0f64..1000.0, 1..60),
            window_seed in 1usize..60,
        ) {
            let window = 1 + (window_seed - 1) % closes.len();
            let averages = simple_moving_average(&closes, window).unwrap();

            prop_assert_eq!(averages.len(), closes.len());
            prop_assert_eq!(averages.iter().filter(|v| v.is_none()).count(), window - 1);
            prop_assert_eq!(averages.iter().position(Option::is_some), Some(window - 1));

            for i in (window - 1)..closes.len() {
                let expected = mean(&closes[i + 1 - window..=i]);
                prop_assert_eq!(averages[i], Some(expected));
            }
        }
    }
}
