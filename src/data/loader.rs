use crate::data::bar::Bar;
use crate::data::interval::Interval;
use crate::error::{BacktestError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

//supplies an ordered series of bars for a symbol, date range and interval
pub trait PriceSource {
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<Vec<Bar>>;
}

#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "date", alias = "Date", alias = "Datetime", alias = "Timestamp")]
    timestamp: String,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(default, alias = "Volume")]
    volume: Option<f64>,
}

//price source backed by a directory of <SYMBOL>.csv files
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    base_path: PathBuf,
}

impl CsvPriceSource {
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        CsvPriceSource {
            base_path: base_path.into(),
        }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol.to_uppercase()))
    }
}

impl PriceSource for CsvPriceSource {
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<Vec<Bar>> {
        let unavailable = || BacktestError::DataUnavailable {
            symbol: symbol.to_string(),
            start,
            end,
        };

        let path = self.csv_path(symbol);
        if !path.is_file() {
            debug!(path = %path.display(), "no price file for symbol");
            return Err(unavailable());
        }

        let bars = load_csv(&path)?;
        let in_range = filter_by_date(&bars, start, end);
        let resampled = interval.resample(&in_range);

        if resampled.is_empty() {
            return Err(unavailable());
        }

        info!(
            symbol,
            %interval,
            bars = resampled.len(),
            "loaded price history"
        );

        Ok(resampled)
    }
}

//loads bars from a csv file
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Bar>> {
    let file = std::fs::File::open(path.as_ref())?;
    read_bars(file)
}

//reads bars from any csv source, sorted by timestamp with duplicates removed
pub fn read_bars<R: Read>(reader: R) -> Result<Vec<Bar>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();

    for (index, result) in reader.deserialize().enumerate() {
        let line = index + 2;
        let record: CsvRecord = result?;

        let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| BacktestError::Parse {
            line,
            reason: format!("unrecognised timestamp '{}'", record.timestamp),
        })?;

        let bar = Bar::new(
            timestamp,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume.unwrap_or(0.0),
        )
        .map_err(|source| BacktestError::InvalidBar { line, source })?;

        bars.push(bar);
    }

    //stable sort keeps file order among equal timestamps, so the last row wins below
    bars.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    let mut unique: Vec<Bar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match unique.last_mut() {
            Some(last) if last.timestamp == bar.timestamp => *last = bar,
            _ => unique.push(bar),
        }
    }

    Ok(unique)
}

//keeps bars whose date falls in [start, end)
pub fn filter_by_date(bars: &[Bar], start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    bars.iter()
        .filter(|bar| {
            let date = bar.date();
            date >= start && date < end
        })
        .cloned()
        .collect()
}

//accepts rfc3339, "YYYY-MM-DD HH:MM:SS+hh:mm", "YYYY-MM-DD HH:MM:SS" and "YYYY-MM-DD"
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ts.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::bar::BarError;
    use std::io::Write;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const SAMPLE: &str = "\
date,open,high,low,close,volume
2024-01-03,11,12,10,11.5,100
2024-01-02,10,11,9,10.5,100
2024-01-04,12,13,11,12.5,100
2024-01-03,11,12,10,11.75,120
";

    #[test]
    fn reads_sorted_and_deduplicated() {
        let bars = read_bars(SAMPLE.as_bytes()).unwrap();
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![10.5, 11.75, 12.5]);
    }

    #[test]
    fn reads_provider_style_headers() {
        let data = "\
Date,Open,High,Low,Close,Volume,Dividends,Stock Splits
2023-01-03 00:00:00-05:00,130.0,131.0,124.0,125.0,112117500,0.0,0.0
2023-01-04 00:00:00-05:00,126.0,128.0,125.0,126.3,89113600,0.0,0.0
";
        let bars = read_bars(data.as_bytes()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date(), date(2023, 1, 3));
        assert_eq!(bars[1].close, 126.3);
    }

    #[test]
    fn bad_timestamp_reports_line() {
        let data = "date,open,high,low,close\nyesterday,1,1,1,1\n";
        let err = read_bars(data.as_bytes()).unwrap_err();
        assert!(matches!(err, BacktestError::Parse { line: 2, .. }));
    }

    #[test]
    fn invalid_bar_is_rejected() {
        let data = "date,open,high,low,close\n2024-01-02,1,1,1,0\n";
        let err = read_bars(data.as_bytes()).unwrap_err();
        assert!(matches!(err, BacktestError::InvalidBar { line: 2, .. }));
    }

    #[test]
    fn nan_prices_are_rejected() {
        let data = "\
date,open,high,low,close
2024-01-01,NaN,NaN,NaN,NaN
2024-01-02,10,10,10,10
2024-01-03,11,11,11,11
";
        let err = read_bars(data.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            BacktestError::InvalidBar {
                line: 2,
                source: BarError::NonFinite { .. }
            }
        ));
    }

    #[test]
    fn end_date_is_exclusive() {
        let bars = read_bars(SAMPLE.as_bytes()).unwrap();
        let filtered = filter_by_date(&bars, date(2024, 1, 2), date(2024, 1, 4));
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn csv_source_fetches_symbol_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("ACME.csv")).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let source = CsvPriceSource::new(dir.path());
        let bars = source
            .fetch("acme", date(2024, 1, 1), date(2024, 2, 1), Interval::Daily)
            .unwrap();
        assert_eq!(bars.len(), 3);
    }

    #[test]
    fn csv_source_reports_missing_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvPriceSource::new(dir.path());
        let err = source
            .fetch("NOPE", date(2024, 1, 1), date(2024, 2, 1), Interval::Daily)
            .unwrap_err();
        assert!(matches!(err, BacktestError::DataUnavailable { .. }));
    }

    #[test]
    fn csv_source_reports_empty_range() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ACME.csv"), SAMPLE).unwrap();

        let source = CsvPriceSource::new(dir.path());
        let err = source
            .fetch("ACME", date(2025, 1, 1), date(2025, 2, 1), Interval::Weekly)
            .unwrap_err();
        assert!(matches!(err, BacktestError::DataUnavailable { .. }));
    }
}
