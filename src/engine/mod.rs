pub mod backtest;
pub mod execution;
pub mod simulator;
pub mod sweep;

pub use backtest::{BacktestConfig, BacktestEngine, BacktestReport};
pub use execution::{Fill, OrderSide};
pub use simulator::{simulate, BacktestResult, Entry, PortfolioSnapshot, Simulation};
pub use sweep::{rank, sweep, WindowPair};
