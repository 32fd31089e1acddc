use crate::engine::execution::{Fill, OrderSide};
use crate::engine::simulator::Simulation;
use crate::metrics::timeseries::{calculate_returns, max_drawdown, EquityPoint};
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//summary metrics for a backtest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub initial_investment: f64,
    pub final_value: f64,
    pub strategy_return: f64,
    pub buy_and_hold_return: f64,
    pub excess_return: f64,
    pub num_trades: usize,
    pub num_round_trips: usize,
    pub win_rate: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub exposure: f64,
}

impl SummaryMetrics {
    //calculate summary metrics from a simulation and its equity curve
    pub fn from_simulation(
        simulation: &Simulation,
        equity_curve: &[EquityPoint],
        periods_per_year: f64,
    ) -> Self {
        let equity_values: Vec<f64> = equity_curve.iter().map(|p| p.equity).collect();
        let returns = calculate_returns(&equity_values);

        let round_trips = round_trip_returns(&simulation.fills, simulation.final_value);
        let win_rate = if round_trips.is_empty() {
            0.0
        } else {
            round_trips.iter().filter(|&&r| r > 0.0).count() as f64 / round_trips.len() as f64
        };

        let exposure = if simulation.snapshots.is_empty() {
            0.0
        } else {
            simulation.bars_invested() as f64 / simulation.snapshots.len() as f64
        };

        SummaryMetrics {
            initial_investment: simulation.initial_investment,
            final_value: simulation.final_value,
            strategy_return: simulation.result.strategy_return,
            buy_and_hold_return: simulation.result.buy_and_hold_return,
            excess_return: simulation.result.excess_return(),
            num_trades: simulation.fills.len(),
            num_round_trips: round_trips.len(),
            win_rate,
            max_drawdown: max_drawdown(equity_curve),
            sharpe_ratio: calculate_sharpe_ratio(&returns, periods_per_year),
            exposure,
        }
    }

    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        self.to_table().printstd();
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();

        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        let rows = [
            ("Initial Investment", format!("{:.2}", self.initial_investment)),
            ("Final Value", format!("{:.2}", self.final_value)),
            ("Strategy Return", format!("{:.2}%", self.strategy_return * 100.0)),
            ("Buy & Hold Return", format!("{:.2}%", self.buy_and_hold_return * 100.0)),
            ("Excess Return", format!("{:.2}%", self.excess_return * 100.0)),
            ("Number of Trades", format!("{}", self.num_trades)),
            ("Round Trips", format!("{}", self.num_round_trips)),
            ("Win Rate", format!("{:.2}%", self.win_rate * 100.0)),
            ("Max Drawdown", format!("{:.2}%", self.max_drawdown * 100.0)),
            ("Sharpe Ratio", format!("{:.3}", self.sharpe_ratio)),
            ("Exposure", format!("{:.2}%", self.exposure * 100.0)),
        ];

        for (metric, value) in rows {
            table.add_row(Row::new(vec![Cell::new(metric), Cell::new(&value)]));
        }

        table
    }
}

//return of each buy until the following sell, or until the final value if still open
fn round_trip_returns(fills: &[Fill], final_value: f64) -> Vec<f64> {
    let mut returns = Vec::new();
    let mut open_cost: Option<f64> = None;

    for fill in fills {
        match fill.side {
            OrderSide::Buy => open_cost = Some(fill.value),
            OrderSide::Sell => {
                if let Some(cost) = open_cost.take() {
                    returns.push(fill.value / cost - 1.0);
                }
            }
        }
    }

    if let Some(cost) = open_cost {
        returns.push(final_value / cost - 1.0);
    }

    returns
}

fn calculate_sharpe_ratio(returns: &[f64], periods_per_year: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let mean = returns.mean();
    let std_dev = returns.std_dev();

    if !std_dev.is_finite() || std_dev == 0.0 {
        return 0.0;
    }

    (mean / std_dev) * periods_per_year.sqrt()
}
