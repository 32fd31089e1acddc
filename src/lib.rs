//a Rust-based moving average crossover backtester for a single security

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod portfolio;
pub mod report;
pub mod strategy;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{
        BacktestParams, JsonParameterSource, ParameterSource, PromptParameterSource,
    };
    pub use crate::data::{load_csv, Bar, CsvPriceSource, Interval, PriceSource};
    pub use crate::engine::{
        rank, simulate, sweep, BacktestConfig, BacktestEngine, BacktestReport, BacktestResult,
        Entry, Fill, OrderSide, PortfolioSnapshot, Simulation, WindowPair,
    };
    pub use crate::error::{BacktestError, Result};
    pub use crate::metrics::{calculate_equity_curve, EquityPoint, SummaryMetrics};
    pub use crate::portfolio::Account;
    pub use crate::report::{frame_table, headline, sweep_table, CsvTableSink, TableSink};
    pub use crate::strategy::{
        generate_signals, simple_moving_average, sma_crossover::SmaCrossoverStrategy, FrameRow,
        Signal, SignalFrame, Strategy,
    };
}
