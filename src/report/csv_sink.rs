use crate::data::Bar;
use crate::error::Result;
use crate::strategy::SignalFrame;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

//durable store for per-bar tables
pub trait TableSink {
    //writes the table under the given file stem, returning where it went
    fn write_frame(&self, stem: &str, frame: &SignalFrame) -> Result<PathBuf>;
}

//writes one csv file per run into a directory
#[derive(Debug, Clone)]
pub struct CsvTableSink {
    dir: PathBuf,
}

impl CsvTableSink {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        CsvTableSink { dir: dir.into() }
    }

    fn path_for(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", stem))
    }

    //persists the raw downloaded bars, eg AAPL_2023-01-01_2024-01-01_bars.csv
    pub fn write_bars(&self, stem: &str, bars: &[Bar]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&format!("{}_bars", stem));
        write_bars_csv(std::fs::File::create(&path)?, bars)?;

        info!(path = %path.display(), rows = bars.len(), "saved price history");
        Ok(path)
    }
}

impl TableSink for CsvTableSink {
    fn write_frame(&self, stem: &str, frame: &SignalFrame) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(stem);
        write_frame_csv(std::fs::File::create(&path)?, frame)?;

        info!(path = %path.display(), rows = frame.len(), "saved signal table");
        Ok(path)
    }
}

//writes timestamp,Close,{short} PMA,{long} PMA,signal with empty cells during warmup
pub fn write_frame_csv<W: Write>(writer: W, frame: &SignalFrame) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    let (short_label, long_label) = frame.average_labels();

    writer.write_record([
        "timestamp",
        "Close",
        short_label.as_str(),
        long_label.as_str(),
        "signal",
    ])?;

    for row in &frame.rows {
        writer.write_record([
            row.timestamp.to_rfc3339(),
            row.close.to_string(),
            optional_cell(row.short_avg),
            optional_cell(row.long_avg),
            row.signal.map(|s| s.to_string()).unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_bars_csv<W: Write>(writer: W, bars: &[Bar]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["timestamp", "open", "high", "low", "close", "volume"])?;

    for bar in bars {
        writer.write_record([
            bar.timestamp.to_rfc3339(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn optional_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::sma_crossover::SmaCrossoverStrategy;
    use crate::strategy::Strategy;
    use chrono::{Duration, TimeZone, Utc};

    fn bars(closes: &[f64]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar::from_close(start + Duration::days(i as i64), close))
            .collect()
    }

    #[test]
    fn frame_csv_has_labelled_columns_and_blank_warmup() {
        let frame = SmaCrossoverStrategy::new(1, 2)
            .evaluate(&bars(&[1.0, 3.0, 2.0]))
            .unwrap();

        let mut buffer = Vec::new();
        write_frame_csv(&mut buffer, &frame).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "timestamp,Close,1 PMA,2 PMA,signal");
        assert_eq!(lines[1], "2024-01-01T00:00:00+00:00,1,1,,");
        assert_eq!(lines[2], "2024-01-02T00:00:00+00:00,3,3,2,1");
        assert_eq!(lines[3], "2024-01-03T00:00:00+00:00,2,2,2.5,0");
    }

    #[test]
    fn sink_writes_one_file_per_stem() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvTableSink::new(dir.path().join("out"));
        let series = bars(&[1.0, 2.0, 3.0]);
        let frame = SmaCrossoverStrategy::new(1, 2).evaluate(&series).unwrap();

        let path = sink.write_frame("ACME_2024-01-01_2024-02-01", &frame).unwrap();

        assert_eq!(path.file_name().unwrap(), "ACME_2024-01-01_2024-02-01.csv");
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 4);
    }

    #[test]
    fn bars_round_trip_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvTableSink::new(dir.path());
        let series = bars(&[10.0, 11.5, 12.25]);

        let path = sink.write_bars("ACME", &series).unwrap();
        let loaded = crate::data::load_csv(&path).unwrap();

        assert_eq!(loaded, series);
    }
}
