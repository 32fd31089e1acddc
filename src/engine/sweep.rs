use crate::data::{closes, Bar};
use crate::engine::simulator::{simulate, BacktestResult};
use crate::error::Result;
use crate::strategy::{generate_signals, simple_moving_average};
use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::info;

//(short window, long window)
pub type WindowPair = (usize, usize);

//runs every (short, long) combination in parallel
//results keep grid order: short windows outer, long windows inner
//a pair that cannot run keeps its own error without affecting the others
pub fn sweep(
    bars: &[Bar],
    initial_investment: f64,
    short_windows: &[usize],
    long_windows: &[usize],
) -> IndexMap<WindowPair, Result<BacktestResult>> {
    let closes = closes(bars);

    let grid: Vec<WindowPair> = short_windows
        .iter()
        .flat_map(|&short| long_windows.iter().map(move |&long| (short, long)))
        .collect();

    info!(pairs = grid.len(), bars = closes.len(), "starting parameter sweep");

    let results: Vec<(WindowPair, Result<BacktestResult>)> = grid
        .into_par_iter()
        .map(|pair| (pair, run_pair(&closes, initial_investment, pair)))
        .collect();

    results.into_iter().collect()
}

fn run_pair(
    closes: &[f64],
    initial_investment: f64,
    (short, long): WindowPair,
) -> Result<BacktestResult> {
    let short_avg = simple_moving_average(closes, short)?;
    let long_avg = simple_moving_average(closes, long)?;
    let signals = generate_signals(&short_avg, &long_avg)?;
    Ok(simulate(closes, &signals, initial_investment)?.result)
}

//successful pairs ordered by strategy return, best first
pub fn rank(
    results: &IndexMap<WindowPair, Result<BacktestResult>>,
) -> Vec<(WindowPair, BacktestResult)> {
    let mut ranked: Vec<(WindowPair, BacktestResult)> = results
        .iter()
        .filter_map(|(pair, result)| result.as_ref().ok().map(|r| (*pair, *r)))
        .collect();

    ranked.sort_by(|a, b| b.1.strategy_return.total_cmp(&a.1.strategy_return));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BacktestError;
    use chrono::{Duration, TimeZone, Utc};

    fn bars(closes: &[f64]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar::from_close(start + Duration::days(i as i64), close))
            .collect()
    }

    #[test]
    fn keeps_grid_order() {
        let series = bars(&[1.0, 2.0, 3.0, 2.0, 1.0, 2.0, 3.0, 4.0]);
        let results = sweep(&series, 100.0, &[1, 2], &[3, 4, 5]);

        let keys: Vec<WindowPair> = results.keys().copied().collect();
        assert_eq!(keys, vec![(1, 3), (1, 4), (1, 5), (2, 3), (2, 4), (2, 5)]);
        assert!(results.values().all(|r| r.is_ok()));
    }

    #[test]
    fn matches_sequential_runs() {
        let series = bars(&[5.0, 4.0, 6.0, 7.0, 5.0, 4.0, 6.0, 8.0, 9.0, 7.0]);
        let results = sweep(&series, 1000.0, &[2, 3], &[4, 5]);

        for (&pair, result) in &results {
            let expected = run_pair(&closes(&series), 1000.0, pair).unwrap();
            assert_eq!(result.as_ref().unwrap(), &expected);
        }
    }

    #[test]
    fn oversized_window_fails_only_its_cell() {
        let series = bars(&[1.0, 2.0, 3.0, 4.0]);
        let results = sweep(&series, 100.0, &[2], &[3, 10]);

        assert!(results[&(2, 3)].is_ok());
        assert!(matches!(
            results[&(2, 10)],
            Err(BacktestError::InvalidWindow { window: 10, len: 4 })
        ));
        assert_eq!(rank(&results).len(), 1);
    }

    #[test]
    fn ranks_best_first() {
        let series = bars(&[3.0, 1.0, 2.0, 5.0, 3.0, 6.0, 2.0, 7.0]);
        let results = sweep(&series, 100.0, &[1, 2], &[2, 3]);
        let ranked = rank(&results);

        for pair in ranked.windows(2) {
            assert!(pair[0].1.strategy_return >= pair[1].1.strategy_return);
        }
    }
}
