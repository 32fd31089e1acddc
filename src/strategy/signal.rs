use crate::error::{BacktestError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

//binary trading state for one bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Flat,
    Long,
}

impl Signal {
    //numeric form used in persisted tables (0 = flat, 1 = long)
    pub fn as_u8(&self) -> u8 {
        match self {
            Signal::Flat => 0,
            Signal::Long => 1,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

//change between two consecutive defined signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

impl Edge {
    pub fn between(previous: Signal, current: Signal) -> Option<Edge> {
        match (previous, current) {
            (Signal::Flat, Signal::Long) => Some(Edge::Rising),
            (Signal::Long, Signal::Flat) => Some(Edge::Falling),
            _ => None,
        }
    }
}

//long where the short average is strictly above the long average, flat otherwise
//undefined wherever either average is undefined
pub fn generate_signals(
    short: &[Option<f64>],
    long: &[Option<f64>],
) -> Result<Vec<Option<Signal>>> {
    if short.len() != long.len() {
        return Err(BacktestError::LengthMismatch {
            left: short.len(),
            right: long.len(),
        });
    }

    Ok(short
        .iter()
        .zip(long)
        .map(|(short, long)| match (short, long) {
            (Some(s), Some(l)) if s > l => Some(Signal::Long),
            (Some(_), Some(_)) => Some(Signal::Flat),
            _ => None,
        })
        .collect())
}

//index of the first bar with a defined signal
pub fn first_valid_index(signals: &[Option<Signal>]) -> Option<usize> {
    signals.iter().position(Option::is_some)
}
