use crate::data::{closes, Bar};
use crate::error::Result;
use crate::strategy::{generate_signals, simple_moving_average, FrameRow, SignalFrame, Strategy};
use tracing::debug;

//sma crossover strategy
//long while the short sma is strictly above the long sma, flat otherwise
//the windows are not ordered: short may equal or exceed long
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmaCrossoverStrategy {
    short_window: usize,
    long_window: usize,
}

impl SmaCrossoverStrategy {
    pub fn new(short_window: usize, long_window: usize) -> Self {
        SmaCrossoverStrategy {
            short_window,
            long_window,
        }
    }
}

impl Strategy for SmaCrossoverStrategy {
    fn evaluate(&self, bars: &[Bar]) -> Result<SignalFrame> {
        let closes = closes(bars);

        let short = simple_moving_average(&closes, self.short_window)?;
        let long = simple_moving_average(&closes, self.long_window)?;
        let signals = generate_signals(&short, &long)?;

        debug!(
            short_window = self.short_window,
            long_window = self.long_window,
            bars = bars.len(),
            "computed crossover signals"
        );

        let rows = bars
            .iter()
            .zip(short)
            .zip(long)
            .zip(signals)
            .map(|(((bar, short_avg), long_avg), signal)| FrameRow {
                timestamp: bar.timestamp,
                close: bar.close,
                short_avg,
                long_avg,
                signal,
            })
            .collect();

        Ok(SignalFrame {
            short_window: self.short_window,
            long_window: self.long_window,
            rows,
        })
    }

    fn name(&self) -> &str {
        "SMA Crossover"
    }
}
