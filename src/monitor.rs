use crate::collectors::checks::collect_checks;
use crate::collectors::{MetricSource, SampleError};
use crate::config::Config;
use crate::report::{Level, ReportError, Reporter};
use crate::state::Outcome;
use chrono::Local;
use std::future::Future;
use std::io::Write;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Sample(#[from] SampleError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// One full report: header, the four checks, summary, completion line.
/// Returns the verdict.
pub async fn run<S, W>(
    cfg: &Config,
    source: &mut S,
    reporter: &mut Reporter<W>,
) -> Result<bool, MonitorError>
where
    S: MetricSource,
    W: Write,
{
    reporter.banner(Local::now())?;
    reporter.report("Starting system health monitoring...", Level::Info)?;

    let results = collect_checks(source, reporter, cfg).await?;
    let all_healthy = results.all_healthy();
    debug!(?results, all_healthy, "checks finished");

    // Last chance for a pending interrupt to win before the verdict is printed.
    tokio::task::yield_now().await;

    reporter.summary(all_healthy)?;
    reporter.report("System health monitoring completed.", Level::Success)?;

    Ok(all_healthy)
}

/// Runs the report unless `interrupt` resolves first. Whatever was in flight
/// when the interrupt fired is dropped without further output.
pub async fn supervise<S, W, F>(
    cfg: &Config,
    source: &mut S,
    reporter: &mut Reporter<W>,
    interrupt: F,
) -> Outcome
where
    S: MetricSource,
    W: Write,
    F: Future<Output = ()>,
{
    tokio::select! {
        biased;
        () = interrupt => Outcome::Interrupted,
        res = run(cfg, source, reporter) => match res {
            Ok(all_healthy) => Outcome::Completed { all_healthy },
            Err(err) => Outcome::Failed(err),
        },
    }
}

pub fn report_fault<W: Write>(reporter: &mut Reporter<W>, err: &MonitorError) {
    if let Err(log_err) = reporter.report(format!("ERROR: {err}"), Level::Alert) {
        error!(
            error = %err,
            log_error = %log_err,
            log_path = %reporter.log_path().display(),
            "failed to record fault"
        );
    }
}
