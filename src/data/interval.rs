use crate::data::bar::Bar;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

//bar granularity requested from a price source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1d", alias = "daily")]
    Daily,
    #[serde(rename = "1wk", alias = "weekly")]
    Weekly,
    #[serde(rename = "1mo", alias = "monthly")]
    Monthly,
}

impl Interval {
    //parse interval from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "1d" | "d" | "day" | "daily" => Some(Interval::Daily),
            "1wk" | "1w" | "w" | "week" | "weekly" => Some(Interval::Weekly),
            "1mo" | "1m" | "m" | "month" | "monthly" => Some(Interval::Monthly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
        }
    }

    //bars per year, used to annualise per-bar statistics
    pub fn periods_per_year(&self) -> f64 {
        match self {
            Interval::Daily => 252.0,
            Interval::Weekly => 52.0,
            Interval::Monthly => 12.0,
        }
    }

    //bucket key a bar falls into at this granularity
    fn bucket(&self, bar: &Bar) -> (i32, u32) {
        let date = bar.date();
        match self {
            Interval::Daily => (date.year(), date.ordinal()),
            Interval::Weekly => {
                let week = date.iso_week();
                (week.year(), week.week())
            }
            Interval::Monthly => (date.year(), date.month()),
        }
    }

    //aggregates chronologically ordered bars into bars of this interval
    //open is the first open, close the last close, volume the sum
    pub fn resample(&self, bars: &[Bar]) -> Vec<Bar> {
        let mut resampled: Vec<Bar> = Vec::new();
        let mut current_key = None;

        for bar in bars {
            let key = self.bucket(bar);
            match resampled.last_mut() {
                Some(last) if current_key == Some(key) => {
                    last.high = last.high.max(bar.high);
                    last.low = last.low.min(bar.low);
                    last.close = bar.close;
                    last.volume += bar.volume;
                }
                _ => {
                    resampled.push(bar.clone());
                    current_key = Some(key);
                }
            }
        }

        resampled
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval::Daily
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::parse(s)
            .ok_or_else(|| format!("unknown interval '{}' (expected 1d, 1wk or 1mo)", s))
    }
}
