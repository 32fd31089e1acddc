pub mod console;
pub mod csv_sink;

pub use console::{frame_table, headline, sweep_table};
pub use csv_sink::{write_bars_csv, write_frame_csv, CsvTableSink, TableSink};
