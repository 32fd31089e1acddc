pub mod backtest_config;
pub mod prompt;

pub use backtest_config::{BacktestParams, JsonParameterSource, ParameterSource};
pub use prompt::PromptParameterSource;
