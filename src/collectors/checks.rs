use crate::collectors::{MetricSample, MetricSource, ProcessInfo};
use crate::config::Config;
use crate::evaluate::{evaluate, MetricKind, Threshold};
use crate::monitor::MonitorError;
use crate::report::{Level, Reporter};
use crate::state::CheckResults;
use std::io::Write;
use tracing::debug;

pub const TOP_PROCESS_COUNT: usize = 5;

/// Runs every check in order. A breach never stops the sequence; only a
/// sampling or reporting fault does.
pub async fn collect_checks<S, W>(
    source: &mut S,
    reporter: &mut Reporter<W>,
    cfg: &Config,
) -> Result<CheckResults, MonitorError>
where
    S: MetricSource,
    W: Write,
{
    let cpu = check_cpu(source, reporter, &cfg.threshold(MetricKind::Cpu)).await?;
    let memory = check_memory(source, reporter, &cfg.threshold(MetricKind::Memory))?;
    let disk = check_disk(source, reporter, &cfg.threshold(MetricKind::Disk))?;
    let processes = check_processes(source, reporter).await?;

    Ok(CheckResults {
        cpu,
        memory,
        disk,
        processes,
    })
}

pub async fn check_cpu<S: MetricSource, W: Write>(
    source: &mut S,
    reporter: &mut Reporter<W>,
    threshold: &Threshold,
) -> Result<bool, MonitorError> {
    let percent = source.cpu_percent().await?;
    report_against_threshold(reporter, MetricSample::CpuPercent(percent), threshold)
}

pub fn check_memory<S: MetricSource, W: Write>(
    source: &mut S,
    reporter: &mut Reporter<W>,
    threshold: &Threshold,
) -> Result<bool, MonitorError> {
    let usage = source.memory()?;
    report_against_threshold(reporter, MetricSample::MemoryUsage(usage), threshold)
}

pub fn check_disk<S: MetricSource, W: Write>(
    source: &mut S,
    reporter: &mut Reporter<W>,
    threshold: &Threshold,
) -> Result<bool, MonitorError> {
    let usage = source.root_disk()?;
    report_against_threshold(reporter, MetricSample::DiskUsage(usage), threshold)
}

/// Lists the busiest processes. There is no threshold, so it always passes.
pub async fn check_processes<S: MetricSource, W: Write>(
    source: &mut S,
    reporter: &mut Reporter<W>,
) -> Result<bool, MonitorError> {
    let mut processes = source.processes().await?;
    rank_by_cpu(&mut processes);

    reporter.report(
        format!("Total Running Processes: {}", processes.len()),
        Level::Info,
    )?;
    reporter.report(
        format!("Top {TOP_PROCESS_COUNT} CPU-consuming processes:"),
        Level::Info,
    )?;
    for (rank, process) in processes.into_iter().take(TOP_PROCESS_COUNT).enumerate() {
        reporter.report(
            format!("  {}. {}", rank + 1, MetricSample::Process(process)),
            Level::Info,
        )?;
    }

    Ok(true)
}

/// Busiest first; a missing CPU share ranks as 0.0. Ties keep sampling order.
pub fn rank_by_cpu(processes: &mut [ProcessInfo]) {
    processes.sort_by(|a, b| b.cpu_or_zero().total_cmp(&a.cpu_or_zero()));
}

fn report_against_threshold<W: Write>(
    reporter: &mut Reporter<W>,
    sample: MetricSample,
    threshold: &Threshold,
) -> Result<bool, MonitorError> {
    reporter.report(sample.to_string(), Level::Info)?;

    let result = evaluate(&sample, threshold);
    debug!(metric = %threshold.kind, ?result, "threshold evaluated");
    if !result.is_healthy() {
        let percent = sample.percent().unwrap_or_default();
        reporter.report(
            format!(
                "ALERT: {} usage is {:.1}% (Threshold: {}%)",
                threshold.kind, percent, threshold.percent
            ),
            Level::Alert,
        )?;
    }

    Ok(result.is_healthy())
}
