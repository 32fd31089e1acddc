use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BarError {
    #[error("Non-finite {field} value: {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("Invalid OHLC values: high ({high}) < low ({low})")]
    InvalidHighLow { high: f64, low: f64 },
    #[error("Invalid OHLC values: close ({close}) outside high-low range [{low}, {high}]")]
    InvalidClose { close: f64, high: f64, low: f64 },
    #[error("Invalid OHLC values: open ({open}) outside high-low range [{low}, {high}]")]
    InvalidOpen { open: f64, high: f64, low: f64 },
    #[error("Non-positive close price: {0}")]
    NonPositiveClose(f64),
    #[error("Negative volume: {0}")]
    NegativeVolume(f64),
}

//a single ohlc bar for one security
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    //creates a new Bar with validation
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Result<Self, BarError> {
        //nan slips through every range comparison below
        for (field, value) in [
            ("open", open),
            ("high", high),
            ("low", low),
            ("close", close),
            ("volume", volume),
        ] {
            if !value.is_finite() {
                return Err(BarError::NonFinite { field, value });
            }
        }

        if high < low {
            return Err(BarError::InvalidHighLow { high, low });
        }

        if close < low || close > high {
            return Err(BarError::InvalidClose { close, high, low });
        }

        if open < low || open > high {
            return Err(BarError::InvalidOpen { open, high, low });
        }

        if close <= 0.0 {
            return Err(BarError::NonPositiveClose(close));
        }

        if volume < 0.0 {
            return Err(BarError::NegativeVolume(volume));
        }

        Ok(Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    //creates a flat bar where open, high and low all equal the close
    pub fn from_close(timestamp: DateTime<Utc>, close: f64) -> Self {
        Bar {
            timestamp,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }

    //calendar date of the bar (utc)
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

//extracts the close prices of a bar series
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|bar| bar.close).collect()
}
