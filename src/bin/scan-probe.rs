//! Scan probe: poll one address until N distinct hosts have answered.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use imhost::config::{self, ConfigError, ScanConfig};
use imhost::observability::logging;
use imhost::scan::{ScanProbe, ScanSettings};

#[derive(Parser)]
#[command(name = "scan-probe")]
#[command(about = "Count the distinct hosts answering behind one address", long_about = None)]
struct Cli {
    /// Number of distinct hosts to find
    #[arg(short = 's', long = "scale")]
    scale: Option<usize>,

    /// URL to poll
    #[arg(short, long)]
    target: Option<String>,

    /// Overall time budget in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Delay between requests in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn apply(self, mut config: ScanConfig) -> ScanConfig {
        if let Some(scale) = self.scale {
            config.expected_hosts = scale;
        }
        if let Some(target) = self.target {
            config.target_url = target;
        }
        if let Some(timeout) = self.timeout {
            config.run_timeout_secs = timeout;
        }
        if let Some(interval_ms) = self.interval_ms {
            config.interval_ms = interval_ms;
        }
        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let base = match &cli.config {
        Some(path) => config::load_scan_config(path)?,
        None => ScanConfig::default(),
    };
    let config = cli.apply(base);
    config::validation::validate_scan(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.log_level);

    let mut probe = ScanProbe::new(ScanSettings::from_config(&config)?);
    let mut stdout = std::io::stdout();

    let result = probe.run(&mut stdout).await;
    tracing::info!(state = ?probe.state(), "Scan finished");

    let report = result?;
    print!("{report}");
    tracing::info!(
        hosts = report.hosts.len(),
        requests = report.requests,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "All hosts found"
    );

    Ok(())
}
