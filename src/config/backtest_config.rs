use crate::data::Interval;
use crate::error::{BacktestError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

//supplies validated run parameters
pub trait ParameterSource {
    fn params(&mut self) -> Result<BacktestParams>;
}

//complete parameter set for one backtest run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestParams {
    pub symbol: String,
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
    #[serde(default)]
    pub interval: Interval,

    //whole currency units
    pub initial_investment: u64,
    pub short_window: usize,
    pub long_window: usize,
}

impl BacktestParams {
    //checks everything the core assumes about its inputs
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(BacktestError::InvalidParameter(
                "symbol must not be empty".to_string(),
            ));
        }

        if self.start >= self.end {
            return Err(BacktestError::InvalidParameter(format!(
                "start date {} must be before end date {}",
                self.start, self.end
            )));
        }

        if self.initial_investment == 0 {
            return Err(BacktestError::InvalidInvestment(0.0));
        }

        if self.short_window == 0 || self.long_window == 0 {
            return Err(BacktestError::InvalidParameter(
                "moving average windows must be positive".to_string(),
            ));
        }

        Ok(())
    }

    //returns a copy with the symbol upper-cased, then validates it
    pub fn normalized(mut self) -> Result<Self> {
        self.symbol = self.symbol.trim().to_uppercase();
        self.validate()?;
        Ok(self)
    }

    //file stem used for persisted tables, eg AAPL_2023-01-01_2024-01-01
    pub fn file_stem(&self) -> String {
        format!("{}_{}_{}", self.symbol, self.start, self.end)
    }

    //load parameters from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let params: BacktestParams = serde_json::from_str(&contents)?;
        Ok(params)
    }

    //save parameters to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

//parameters taken from a JSON configuration file
#[derive(Debug, Clone)]
pub struct JsonParameterSource {
    path: PathBuf,
}

impl JsonParameterSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        JsonParameterSource { path: path.into() }
    }
}

impl ParameterSource for JsonParameterSource {
    fn params(&mut self) -> Result<BacktestParams> {
        BacktestParams::from_json_file(&self.path)?.normalized()
    }
}

//parameters already assembled in memory, eg from command line flags
impl ParameterSource for BacktestParams {
    fn params(&mut self) -> Result<BacktestParams> {
        self.clone().normalized()
    }
}
