pub mod bar;
pub mod interval;
pub mod loader;

pub use bar::{closes, Bar, BarError};
pub use interval::Interval;
pub use loader::{filter_by_date, load_csv, read_bars, CsvPriceSource, PriceSource};
