pub mod moving_average;
pub mod signal;
pub mod sma_crossover;

use crate::data::Bar;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use moving_average::{mean, simple_moving_average};
pub use signal::{first_valid_index, generate_signals, Edge, Signal};

//strategy interface: turns a bar series into a per-bar signal table
pub trait Strategy: Send + Sync {
    //evaluates the strategy over the whole series
    fn evaluate(&self, bars: &[Bar]) -> Result<SignalFrame>;

    //returns the strategy name
    fn name(&self) -> &str;
}

//one row of the per-bar table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRow {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub short_avg: Option<f64>,
    pub long_avg: Option<f64>,
    pub signal: Option<Signal>,
}

//per-bar closes, both averages and the derived signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalFrame {
    pub short_window: usize,
    pub long_window: usize,
    pub rows: Vec<FrameRow>,
}

impl SignalFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.close).collect()
    }

    pub fn signals(&self) -> Vec<Option<Signal>> {
        self.rows.iter().map(|row| row.signal).collect()
    }

    //column labels for the two averages, eg "20 PMA"
    pub fn average_labels(&self) -> (String, String) {
        (
            format!("{} PMA", self.short_window),
            format!("{} PMA", self.long_window),
        )
    }
}
