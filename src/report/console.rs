use crate::engine::{BacktestResult, WindowPair};
use crate::strategy::{FrameRow, SignalFrame};
use prettytable::{Cell, Row, Table};

//renders the per-bar table, eliding the middle when it has more than `max_rows` rows
pub fn frame_table(frame: &SignalFrame, max_rows: usize) -> Table {
    let (short_label, long_label) = frame.average_labels();

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("timestamp"),
        Cell::new("Close"),
        Cell::new(&short_label),
        Cell::new(&long_label),
        Cell::new("signal"),
    ]));

    let len = frame.len();
    let (head, tail) = if len > max_rows {
        let head = max_rows.div_ceil(2);
        (head, max_rows - head)
    } else {
        (len, 0)
    };

    for row in &frame.rows[..head] {
        table.add_row(frame_row(row));
    }

    if head < len {
        table.add_row(Row::new(vec![Cell::new("..."); 5]));
        for row in &frame.rows[len - tail..] {
            table.add_row(frame_row(row));
        }
    }

    table
}

fn frame_row(row: &FrameRow) -> Row {
    Row::new(vec![
        Cell::new(&row.timestamp.format("%Y-%m-%d").to_string()),
        Cell::new(&format!("{:.4}", row.close)),
        Cell::new(&optional(row.short_avg)),
        Cell::new(&optional(row.long_avg)),
        Cell::new(&row.signal.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string())),
    ])
}

fn optional(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.4}", v))
        .unwrap_or_else(|| "NaN".to_string())
}

//the two headline lines, returns shown as percentages
//debug formatting keeps the trailing ".0" on whole numbers
pub fn headline(result: &BacktestResult) -> String {
    format!(
        "Normal Return: {:?} %\nIndicator Return: {:?} %",
        result.buy_and_hold_return * 100.0,
        result.strategy_return * 100.0
    )
}

//ranked parameter sweep results
pub fn sweep_table(ranked: &[(WindowPair, BacktestResult)]) -> Table {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Short"),
        Cell::new("Long"),
        Cell::new("Strategy Return"),
        Cell::new("Buy & Hold Return"),
        Cell::new("Excess"),
    ]));

    for ((short, long), result) in ranked {
        table.add_row(Row::new(vec![
            Cell::new(&short.to_string()),
            Cell::new(&long.to_string()),
            Cell::new(&format!("{:.2}%", result.strategy_return * 100.0)),
            Cell::new(&format!("{:.2}%", result.buy_and_hold_return * 100.0)),
            Cell::new(&format!("{:.2}%", result.excess_return() * 100.0)),
        ]));
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Bar;
    use crate::strategy::sma_crossover::SmaCrossoverStrategy;
    use crate::strategy::Strategy;
    use chrono::{Duration, TimeZone, Utc};

    fn frame(n: usize) -> SignalFrame {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bars: Vec<Bar> = (0..n)
            .map(|i| Bar::from_close(start + Duration::days(i as i64), 10.0 + i as f64))
            .collect();
        SmaCrossoverStrategy::new(2, 3).evaluate(&bars).unwrap()
    }

    fn printed_rows(n: usize, max_rows: usize) -> usize {
        frame_table(&frame(n), max_rows).len()
    }

    #[test]
    fn short_frames_are_printed_whole() {
        assert_eq!(printed_rows(5, 10), 6);
    }

    #[test]
    fn long_frames_keep_head_and_tail() {
        //header + 5 head rows + ellipsis + 5 tail rows
        assert_eq!(printed_rows(40, 10), 12);
        //header + 3 head rows + ellipsis + 2 tail rows
        assert_eq!(printed_rows(40, 5), 7);
    }

    #[test]
    fn headline_uses_percentages() {
        let text = headline(&BacktestResult {
            buy_and_hold_return: 0.5,
            strategy_return: -0.25,
        });
        assert_eq!(text, "Normal Return: 50.0 %\nIndicator Return: -25.0 %");

        let text = headline(&BacktestResult {
            buy_and_hold_return: 0.125,
            strategy_return: 0.0,
        });
        assert_eq!(text, "Normal Return: 12.5 %\nIndicator Return: 0.0 %");
    }

    #[test]
    fn sweep_table_has_one_row_per_pair() {
        let ranked = vec![((2, 5), BacktestResult::zero()), ((3, 5), BacktestResult::zero())];
        assert_eq!(sweep_table(&ranked).len(), 3);
    }
}
