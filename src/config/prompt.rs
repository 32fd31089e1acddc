use crate::config::backtest_config::{BacktestParams, ParameterSource};
use crate::data::Interval;
use crate::error::{BacktestError, Result};
use chrono::NaiveDate;
use std::io::{BufRead, Write};
use std::str::FromStr;

//asks for each parameter on an interactive terminal
pub struct PromptParameterSource<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptParameterSource<R, W> {
    pub fn new(input: R, output: W) -> Self {
        PromptParameterSource { input, output }
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(BacktestError::InvalidParameter(format!(
                "input ended before answering '{}'",
                prompt.trim_end_matches([':', ' '])
            )));
        }
        Ok(line.trim().to_string())
    }

    fn ask_parsed<T>(&mut self, prompt: &str, what: &str) -> Result<T>
    where
        T: FromStr,
    {
        let answer = self.ask(prompt)?;
        answer
            .parse()
            .map_err(|_| BacktestError::InvalidParameter(format!("invalid {}: '{}'", what, answer)))
    }

    fn ask_date(&mut self, prompt: &str) -> Result<NaiveDate> {
        let answer = self.ask(prompt)?;
        NaiveDate::parse_from_str(&answer, "%Y-%m-%d").map_err(|_| {
            BacktestError::InvalidParameter(format!(
                "invalid date '{}', expected YYYY-MM-DD",
                answer
            ))
        })
    }
}

impl<R: BufRead, W: Write> ParameterSource for PromptParameterSource<R, W> {
    fn params(&mut self) -> Result<BacktestParams> {
        let symbol = self.ask("Stock symbol: ")?;
        let start = self.ask_date("Start date (YYYY-MM-DD): ")?;
        let end = self.ask_date("End date (YYYY-MM-DD): ")?;

        let interval_answer = self.ask("Interval (1d/1wk/1mo): ")?;
        let interval = Interval::parse(&interval_answer).ok_or_else(|| {
            BacktestError::InvalidParameter(format!("unknown interval '{}'", interval_answer))
        })?;

        let initial_investment = self.ask_parsed("Amount invested: ", "investment amount")?;
        let short_window =
            self.ask_parsed("Bars in the first moving average: ", "window length")?;
        let long_window =
            self.ask_parsed("Bars in the second moving average: ", "window length")?;

        BacktestParams {
            symbol,
            start,
            end,
            interval,
            initial_investment,
            short_window,
            long_window,
        }
        .normalized()
    }
}
