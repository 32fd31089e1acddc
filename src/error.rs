use crate::data::BarError;
use chrono::NaiveDate;
use thiserror::Error;

//errors raised by the backtesting pipeline
#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("Invalid window length {window} for a series of {len} bars")]
    InvalidWindow { window: usize, len: usize },

    #[error("Invalid investment amount: {0} (must be positive)")]
    InvalidInvestment(f64),

    #[error("No price data for {symbol} between {start} and {end}")]
    DataUnavailable {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Invalid close price {price} at bar {index}")]
    InvalidPrice { index: usize, price: f64 },

    #[error("Series length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Invalid bar at line {line}: {source}")]
    InvalidBar {
        line: usize,
        #[source]
        source: BarError,
    },

    #[error("Failed to parse line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BacktestError>;
