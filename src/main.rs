mod collectors;
mod config;
mod evaluate;
mod monitor;
mod report;
mod state;

use clap::Parser;
use collectors::system::{SysinfoSource, DEFAULT_SAMPLE_INTERVAL};
use config::Config;
use report::Reporter;
use state::Outcome;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Samples CPU, memory, disk and processes once and exits non-zero if any
/// threshold is exceeded.
#[derive(Parser, Debug)]
#[command(name = "healthmon")]
#[command(version, about)]
struct Cli {
    /// Print the built-in thresholds and log path as YAML and exit.
    #[arg(long)]
    print_default_config: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let cfg = Config::default();
    if cli.print_default_config {
        match cfg.to_yaml() {
            Ok(yaml) => print!("{yaml}"),
            Err(err) => {
                error!(error = %err, "failed to render configuration");
                std::process::exit(1);
            }
        }
        return;
    }

    if let Err(err) = cfg.validate() {
        error!(error = %err, "built-in configuration is invalid");
        std::process::exit(1);
    }

    let mut source = SysinfoSource::new(DEFAULT_SAMPLE_INTERVAL);
    let mut reporter = Reporter::stdout(&cfg.log_path);
    let outcome = monitor::supervise(&cfg, &mut source, &mut reporter, interrupted()).await;

    match &outcome {
        Outcome::Interrupted => println!("\n\nMonitoring interrupted by user."),
        Outcome::Failed(err) => monitor::report_fault(&mut reporter, err),
        Outcome::Completed { .. } => {}
    }
    std::process::exit(outcome.exit_code());
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn interrupted() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
