use crate::data::{Bar, Interval};
use crate::engine::simulator::{simulate, BacktestResult, Simulation};
use crate::error::Result;
use crate::metrics::{calculate_equity_curve, EquityPoint, SummaryMetrics};
use crate::strategy::{SignalFrame, Strategy};
use chrono::{DateTime, Utc};
use tracing::info;

//configuration for a backtest
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestConfig {
    pub initial_investment: f64,
    pub interval: Interval,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_investment: 100000.0,
            interval: Interval::Daily,
        }
    }
}

//everything produced by one backtest run
#[derive(Debug, Clone)]
pub struct BacktestReport {
    pub strategy: String,
    pub frame: SignalFrame,
    pub simulation: Simulation,
    pub equity_curve: Vec<EquityPoint>,
    pub summary: SummaryMetrics,
}

impl BacktestReport {
    pub fn result(&self) -> BacktestResult {
        self.simulation.result
    }

    //timestamp of the bar the strategy entered on
    pub fn entry_time(&self) -> Option<DateTime<Utc>> {
        self.simulation
            .entry
            .map(|entry| self.frame.rows[entry.index].timestamp)
    }
}

//runs a strategy over an immutable bar series
pub struct BacktestEngine<'a> {
    config: BacktestConfig,
    bars: &'a [Bar],
}

impl<'a> BacktestEngine<'a> {
    pub fn new(config: BacktestConfig, bars: &'a [Bar]) -> Self {
        BacktestEngine { config, bars }
    }

    //runs the backtest with the given strategy
    pub fn run(&self, strategy: &dyn Strategy) -> Result<BacktestReport> {
        info!(
            strategy = strategy.name(),
            bars = self.bars.len(),
            investment = self.config.initial_investment,
            "running backtest"
        );

        let frame = strategy.evaluate(self.bars)?;
        let simulation = simulate(
            &frame.closes(),
            &frame.signals(),
            self.config.initial_investment,
        )?;

        Ok(self.build_report(strategy.name(), frame, simulation))
    }

    fn build_report(
        &self,
        name: &str,
        frame: SignalFrame,
        simulation: Simulation,
    ) -> BacktestReport {
        let timestamps: Vec<_> = simulation
            .snapshots
            .iter()
            .map(|s| frame.rows[s.index].timestamp)
            .collect();
        let equity_values: Vec<_> = simulation.snapshots.iter().map(|s| s.equity).collect();

        let equity_curve =
            calculate_equity_curve(&timestamps, &equity_values, simulation.initial_investment);

        let summary = SummaryMetrics::from_simulation(
            &simulation,
            &equity_curve,
            self.config.interval.periods_per_year(),
        );

        BacktestReport {
            strategy: name.to_string(),
            frame,
            simulation,
            equity_curve,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BacktestError;
    use crate::strategy::sma_crossover::SmaCrossoverStrategy;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};

    fn bars(closes: &[f64]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar::from_close(start + Duration::days(i as i64), close))
            .collect()
    }

    fn config(initial_investment: f64) -> BacktestConfig {
        BacktestConfig {
            initial_investment,
            ..BacktestConfig::default()
        }
    }

    #[test]
    fn report_links_entry_to_timestamp() {
        let series = bars(&[5.0, 4.0, 3.0, 4.0, 6.0, 8.0]);
        let engine = BacktestEngine::new(config(1000.0), &series);

        let report = engine.run(&SmaCrossoverStrategy::new(1, 2)).unwrap();

        //signal: - F F L L L -> entry on the rising edge at bar 3
        assert_eq!(report.simulation.entry.map(|e| e.index), Some(3));
        assert_eq!(report.entry_time(), Some(series[3].timestamp));
        assert_eq!(report.equity_curve.len(), 5);
        assert_relative_eq!(report.result().strategy_return, 1.0);
        assert_relative_eq!(report.result().buy_and_hold_return, 1.0);
        assert_eq!(report.strategy, "SMA Crossover");
    }

    #[test]
    fn invalid_investment_aborts_the_run() {
        let series = bars(&[1.0, 2.0, 3.0]);
        let engine = BacktestEngine::new(config(0.0), &series);
        let err = engine.run(&SmaCrossoverStrategy::new(1, 2)).unwrap_err();
        assert!(matches!(err, BacktestError::InvalidInvestment(_)));
    }
}
