//! finstats - command line entry point
//!
//! Fetches the return series of one or more stocks and a benchmark from the
//! configured datafeed and prints their alpha and beta.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use finstats::logger::init_logger;
use finstats::{
    create_datafeed, ConsoleReporter, Period, Settings, StatsEngine, StatsRequest, SETTINGS,
    VERSION,
};

#[derive(Parser, Debug)]
#[command(name = "finstats")]
#[command(about = "Get alpha and beta of stocks against a benchmark", long_about = None)]
#[command(version = VERSION)]
struct Cli {
    /// Stock code(s) to evaluate, e.g. sh600519
    #[arg(short, long, value_delimiter = ',', required = true)]
    stock: Vec<String>,

    /// Benchmark code, e.g. sh000300
    #[arg(short, long)]
    bench: String,

    /// Risk free return per period [default: 0]
    #[arg(short = 'r', long = "riskfree", allow_negative_numbers = true)]
    risk_free: Option<f64>,

    /// Periodicity of the returns data: y/q/m/w/d [default: d]
    #[arg(short, long)]
    period: Option<Period>,

    /// Number of records to fetch, 0 for all [default: 1023]
    #[arg(short, long)]
    length: Option<usize>,

    /// Directory holding <symbol>.json series files
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Settings file to use instead of the one in the working folder
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Request from the flags, unset ones taken from `settings`
    fn request(&self, settings: &Settings) -> finstats::Result<StatsRequest> {
        let period = match self.period {
            Some(period) => period,
            None => settings.period()?,
        };
        let length = match self.length {
            Some(length) => length,
            None => settings.length()?,
        };
        let risk_free = self.risk_free.unwrap_or_else(|| settings.risk_free());

        Ok(StatsRequest::new(self.stock.clone(), self.bench.clone())
            .with_risk_free(risk_free)
            .with_period(period)
            .with_length(length))
    }
}

async fn run(cli: Cli) -> finstats::Result<()> {
    let loaded;
    let settings: &Settings = match &cli.config {
        Some(path) => {
            loaded = Settings::from_file(path)?;
            &loaded
        }
        None => &*SETTINGS,
    };

    if let Err(e) = init_logger(settings) {
        eprintln!("logger not initialized: {}", e);
    }

    let request = cli.request(settings)?;
    let datafeed = create_datafeed(settings, cli.data_dir.as_deref())?;
    datafeed.init().await?;

    let mut engine = StatsEngine::new(datafeed, ConsoleReporter::stdout());
    engine.run(&request).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
