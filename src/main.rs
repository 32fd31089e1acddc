use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use crossover::prelude::*;
use std::path::PathBuf;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

#[derive(Parser)]
#[command(name = "crossover")]
#[command(about = "A moving average crossover backtester for a single security", long_about = None)]
struct Cli {
    //increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //run a single backtest
    Run {
        //directory holding <SYMBOL>.csv price files
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        //read parameters from a JSON file
        #[arg(long, conflicts_with = "interactive")]
        config: Option<PathBuf>,

        //ask for parameters on the terminal
        #[arg(long)]
        interactive: bool,

        #[command(flatten)]
        params: ParamArgs,

        //directory the per-bar tables are written to
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        //skip writing csv files
        #[arg(long)]
        no_save: bool,

        //maximum rows of the per-bar table to print
        #[arg(long, default_value = "20")]
        rows: usize,

        //print summary metrics as JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    //run every short/long window combination in parallel
    Sweep {
        //directory holding <SYMBOL>.csv price files
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        #[arg(long)]
        symbol: String,

        #[arg(long)]
        start: NaiveDate,

        #[arg(long)]
        end: NaiveDate,

        #[arg(long, default_value = "1d")]
        interval: Interval,

        #[arg(long, default_value = "100000")]
        investment: u64,

        //comma separated short windows (eg 5,10,20)
        #[arg(long, value_delimiter = ',', required = true)]
        short: Vec<usize>,

        //comma separated long windows (eg 20,50,100)
        #[arg(long, value_delimiter = ',', required = true)]
        long: Vec<usize>,
    },
}

//parameters given directly as flags
#[derive(Args)]
struct ParamArgs {
    //symbol to backtest (eg AAPL)
    #[arg(long)]
    symbol: Option<String>,

    //first date included (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    //first date excluded (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,

    //bar interval (1d, 1wk, 1mo)
    #[arg(long, default_value = "1d")]
    interval: Interval,

    //amount invested, whole currency units
    #[arg(long)]
    investment: Option<u64>,

    //first moving average window in bars
    #[arg(long)]
    short: Option<usize>,

    //second moving average window in bars
    #[arg(long)]
    long: Option<usize>,
}

impl ParamArgs {
    fn into_params(self) -> Result<BacktestParams> {
        Ok(BacktestParams {
            symbol: self.symbol.context("--symbol required")?,
            start: self.start.context("--start required")?,
            end: self.end.context("--end required")?,
            interval: self.interval,
            initial_investment: self.investment.context("--investment required")?,
            short_window: self.short.context("--short required")?,
            long_window: self.long.context("--long required")?,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            data_dir,
            config,
            interactive,
            params,
            output_dir,
            no_save,
            rows,
            json,
        } => {
            let params = if let Some(path) = config {
                JsonParameterSource::new(&path)
                    .params()
                    .context(format!("Failed to load parameters from {:?}", path))?
            } else if interactive {
                let stdin = std::io::stdin();
                PromptParameterSource::new(stdin.lock(), std::io::stdout()).params()?
            } else {
                params.into_params()?.params()?
            };

            let output = RunOutput {
                dir: output_dir,
                save: !no_save,
                rows,
                json,
            };
            run_backtest(&CsvPriceSource::new(data_dir), &params, &output)?;
        }
        Commands::Sweep {
            data_dir,
            symbol,
            start,
            end,
            interval,
            investment,
            short,
            long,
        } => {
            run_sweep(
                &CsvPriceSource::new(data_dir),
                &symbol.to_uppercase(),
                start,
                end,
                interval,
                investment,
                &short,
                &long,
            )?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_ansi(cfg!(debug_assertions))
        .init();
}

struct RunOutput {
    dir: PathBuf,
    save: bool,
    rows: usize,
    json: bool,
}

fn run_backtest(
    source: &dyn PriceSource,
    params: &BacktestParams,
    output: &RunOutput,
) -> Result<()> {
    let bars = source
        .fetch(&params.symbol, params.start, params.end, params.interval)
        .context(format!("Failed to load data for {}", params.symbol))?;

    let sink = CsvTableSink::new(&output.dir);
    if output.save {
        let path = sink.write_bars(&params.file_stem(), &bars)?;
        println!("Data saved to {}", path.display());
    }

    let config = BacktestConfig {
        initial_investment: params.initial_investment as f64,
        interval: params.interval,
    };
    let strategy = SmaCrossoverStrategy::new(params.short_window, params.long_window);
    let report = BacktestEngine::new(config, &bars).run(&strategy)?;

    if output.save {
        let path = sink.write_frame(&params.file_stem(), &report.frame)?;
        println!("Signal table saved to {}", path.display());
    }

    if output.json {
        println!("{}", serde_json::to_string_pretty(&report.summary)?);
        return Ok(());
    }

    println!(
        "\n{} {} ({} bars, {} to {})",
        params.symbol,
        report.strategy,
        bars.len(),
        params.start,
        params.end
    );
    frame_table(&report.frame, output.rows).printstd();

    match report.entry_time() {
        Some(entry) => println!("\nFirst entry: {}", entry.format("%Y-%m-%d")),
        None => println!("\nThe strategy never entered a position"),
    }

    report.summary.pretty_print_table();
    println!("{}", headline(&report.result()));

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_sweep(
    source: &dyn PriceSource,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    interval: Interval,
    investment: u64,
    short_windows: &[usize],
    long_windows: &[usize],
) -> Result<()> {
    if investment == 0 {
        anyhow::bail!(BacktestError::InvalidInvestment(0.0));
    }

    let bars = source
        .fetch(symbol, start, end, interval)
        .context(format!("Failed to load data for {}", symbol))?;

    let results = sweep(&bars, investment as f64, short_windows, long_windows);

    for ((short, long), result) in &results {
        if let Err(err) = result {
            eprintln!("Skipped short={} long={}: {}", short, long, err);
        }
    }

    println!("{} parameter sweep ({} bars)", symbol, bars.len());
    sweep_table(&rank(&results)).printstd();

    Ok(())
}
