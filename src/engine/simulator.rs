use crate::engine::execution::{execute, Fill, OrderSide};
use crate::error::{BacktestError, Result};
use crate::portfolio::Account;
use crate::strategy::{first_valid_index, Edge, Signal};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

//strategy and buy-and-hold returns, both fractions of the initial investment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub buy_and_hold_return: f64,
    pub strategy_return: f64,
}

impl BacktestResult {
    //result of a run that never traded
    pub fn zero() -> Self {
        BacktestResult {
            buy_and_hold_return: 0.0,
            strategy_return: 0.0,
        }
    }

    //strategy return minus buy-and-hold return
    pub fn excess_return(&self) -> f64 {
        self.strategy_return - self.buy_and_hold_return
    }
}

//bar the strategy first bought on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub index: usize,
    pub price: f64,
}

//account state after processing one bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub index: usize,
    pub cash: f64,
    pub shares: f64,

    //cash plus shares marked at the bar's close
    pub equity: f64,
}

//complete record of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    pub result: BacktestResult,
    pub initial_investment: f64,

    //value after liquidating at the final close
    pub final_value: f64,
    pub first_valid_index: Option<usize>,
    pub entry: Option<Entry>,
    pub fills: Vec<Fill>,

    //one snapshot per bar from the first valid index on
    pub snapshots: Vec<PortfolioSnapshot>,

    //true if shares were still held at the final bar and marked to market
    pub open_at_end: bool,
}

impl Simulation {
    fn degenerate(initial_investment: f64, first_valid_index: Option<usize>) -> Self {
        Simulation {
            result: BacktestResult::zero(),
            initial_investment,
            final_value: initial_investment,
            first_valid_index,
            entry: None,
            fills: Vec::new(),
            snapshots: Vec::new(),
            open_at_end: false,
        }
    }

    //number of bars after warmup that held shares
    pub fn bars_invested(&self) -> usize {
        self.snapshots.iter().filter(|s| s.shares > 0.0).count()
    }
}

//state carried from one bar to the next during replay
#[derive(Debug)]
struct Replay {
    first_valid_index: usize,
    account: Account,
    previous: Option<Signal>,
    entry: Option<Entry>,
    fills: Vec<Fill>,
    snapshots: Vec<PortfolioSnapshot>,
}

impl Replay {
    fn new(first_valid_index: usize, initial_investment: f64, capacity: usize) -> Self {
        Replay {
            first_valid_index,
            account: Account::new(initial_investment),
            previous: None,
            entry: None,
            fills: Vec::new(),
            snapshots: Vec::with_capacity(capacity),
        }
    }

    //order implied by moving from the previous signal to the current one
    fn order_for(&self, index: usize, current: Option<Signal>) -> Option<OrderSide> {
        match (self.previous, current?) {
            //a long signal on the first defined bar is an immediate entry
            (None, Signal::Long) if index == self.first_valid_index => Some(OrderSide::Buy),
            (Some(previous), current) => match Edge::between(previous, current)? {
                Edge::Rising => Some(OrderSide::Buy),
                Edge::Falling => Some(OrderSide::Sell),
            },
            _ => None,
        }
    }

    fn step(mut self, (index, close, signal): (usize, f64, Option<Signal>)) -> Self {
        if let Some(side) = self.order_for(index, signal) {
            if let Some(fill) = execute(&mut self.account, side, index, close) {
                if side == OrderSide::Buy && self.entry.is_none() {
                    self.entry = Some(Entry { index, price: close });
                }
                self.fills.push(fill);
            }
        }

        //undefined bars break the chain so no edge is measured across them
        self.previous = signal;
        self.snapshots.push(PortfolioSnapshot {
            index,
            cash: self.account.cash,
            shares: self.account.shares,
            equity: self.account.value(close),
        });
        self
    }
}

//replays a signal series against close prices with an all-in / all-out position
//
//the strategy enters on the first defined bar if it is long, otherwise on the
//first rising edge, exits on falling edges and re-enters on later rising edges.
//any position still open at the end is marked to market at the final close.
//buy-and-hold is measured from the same entry bar. a series that never enters
//(or never leaves warmup) yields a zero result.
pub fn simulate(
    closes: &[f64],
    signals: &[Option<Signal>],
    initial_investment: f64,
) -> Result<Simulation> {
    if !initial_investment.is_finite() || initial_investment <= 0.0 {
        return Err(BacktestError::InvalidInvestment(initial_investment));
    }

    if closes.len() != signals.len() {
        return Err(BacktestError::LengthMismatch {
            left: closes.len(),
            right: signals.len(),
        });
    }

    let first_valid = match first_valid_index(signals) {
        Some(index) => index,
        None => {
            debug!(bars = closes.len(), "no bar with a defined signal");
            return Ok(Simulation::degenerate(initial_investment, None));
        }
    };

    if let Some((index, &price)) = closes
        .iter()
        .enumerate()
        .skip(first_valid)
        .find(|(_, price)| !price.is_finite() || **price <= 0.0)
    {
        return Err(BacktestError::InvalidPrice { index, price });
    }

    let replay = closes
        .iter()
        .zip(signals)
        .enumerate()
        .skip(first_valid)
        .map(|(index, (&close, &signal))| (index, close, signal))
        .fold(
            Replay::new(first_valid, initial_investment, closes.len() - first_valid),
            Replay::step,
        );

    let entry = match replay.entry {
        Some(entry) => entry,
        None => {
            debug!(first_valid, "signal never turned long");
            let mut simulation = Simulation::degenerate(initial_investment, Some(first_valid));
            simulation.snapshots = replay.snapshots;
            return Ok(simulation);
        }
    };

    //first_valid exists, so the series is non-empty
    let final_close = closes[closes.len() - 1];
    let mut account = replay.account;
    let open_at_end = account.is_invested();
    if open_at_end {
        debug!(final_close, "closing the open position at the final bar");
        account.sell_all(final_close);
    }
    let final_value = account.cash;

    let result = BacktestResult {
        buy_and_hold_return: final_close / entry.price - 1.0,
        strategy_return: account.return_on(final_value),
    };

    info!(
        entry_index = entry.index,
        trades = replay.fills.len(),
        strategy_return = result.strategy_return,
        buy_and_hold_return = result.buy_and_hold_return,
        "simulation complete"
    );

    Ok(Simulation {
        result,
        initial_investment,
        final_value,
        first_valid_index: Some(first_valid),
        entry: Some(entry),
        fills: replay.fills,
        snapshots: replay.snapshots,
        open_at_end,
    })
}
