extern crate clap;

use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colored::Colorize;
use nodespeed::display::{print_results, ConsoleProgress, DisplayMode};
use nodespeed::errors::{format_error_for_display, SpeedTestError};
use nodespeed::speedtest::requests::servers::ServerDescriptor;
use nodespeed::speedtest::tests::engine::{SpeedTest, TestConfig};
use std::io::IsTerminal;
use std::process;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory service listing the measurement servers
    #[arg(long, value_name = "URL", default_value = "http://localhost:9088")]
    directory: String,

    /// Measure against this server instead of asking the directory
    #[arg(long, value_name = "URL")]
    server: Option<String>,

    /// Prefer servers in this region
    #[arg(long)]
    region: Option<String>,

    /// Seconds per transfer phase (3-30)
    #[arg(long, default_value_t = 10)]
    duration: u64,

    /// Concurrent streams per transfer phase (1-32)
    #[arg(long, default_value_t = 8)]
    streams: usize,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    if let Err(error) = run(cli).await {
        eprintln!("{}", format_error_for_display(&error).red());
        process::exit(error.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), SpeedTestError> {
    let mode = DisplayMode::detect(cli.json, std::io::stdout().is_terminal());

    let config = TestConfig::default()
        .with_directory(cli.directory)
        .with_duration(Duration::from_secs(cli.duration))
        .with_streams(cli.streams)
        .with_preferred_region(cli.region);

    let mut test = SpeedTest::new(config)?;

    if let Some(url) = cli.server {
        let server = ServerDescriptor::from_url(&url).ok_or_else(|| {
            SpeedTestError::config(format!("not an http(s) URL: {}", url))
        })?;
        test = test.with_server(server);
    }

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    let result = test.run(cancel, &ConsoleProgress::new(mode)).await?;

    print_results(&result, mode)
}
