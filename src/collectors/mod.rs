pub mod checks;
pub mod system;

use std::fmt;
use thiserror::Error;

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Usage {
    pub percent: f64,
    pub used_bytes: u64,
    pub total_bytes: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: Option<f64>,
    pub memory_percent: Option<f64>,
}

impl ProcessInfo {
    pub fn cpu_or_zero(&self) -> f64 {
        self.cpu_percent.unwrap_or(0.0)
    }

    pub fn memory_or_zero(&self) -> f64 {
        self.memory_percent.unwrap_or(0.0)
    }
}

impl fmt::Display for ProcessInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PID: {}, Name: {}, CPU: {:.1}%, Memory: {:.1}%",
            self.pid,
            self.name,
            self.cpu_or_zero(),
            self.memory_or_zero()
        )
    }
}

/// One point-in-time reading. `Display` renders the INFO line for it.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricSample {
    CpuPercent(f64),
    MemoryUsage(Usage),
    DiskUsage(Usage),
    Process(ProcessInfo),
}

impl MetricSample {
    pub fn percent(&self) -> Option<f64> {
        match self {
            Self::CpuPercent(p) => Some(*p),
            Self::MemoryUsage(u) | Self::DiskUsage(u) => Some(u.percent),
            Self::Process(_) => None,
        }
    }
}

impl fmt::Display for MetricSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CpuPercent(p) => write!(f, "CPU Usage: {p:.1}%"),
            Self::MemoryUsage(u) => write_usage(f, "Memory", u),
            Self::DiskUsage(u) => write_usage(f, "Disk", u),
            Self::Process(p) => fmt::Display::fmt(p, f),
        }
    }
}

fn write_usage(f: &mut fmt::Formatter<'_>, label: &str, u: &Usage) -> fmt::Result {
    write!(
        f,
        "{label} Usage: {:.1}% (Used: {:.2}GB / Total: {:.2}GB)",
        u.percent,
        bytes_to_gib(u.used_bytes),
        bytes_to_gib(u.total_bytes)
    )
}

fn bytes_to_gib(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GIB
}

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("CPU usage is unavailable: no CPUs reported")]
    CpuUnavailable,
    #[error("memory usage is unavailable: total memory reported as zero")]
    MemoryUnavailable,
    #[error("root filesystem not found")]
    #[cfg_attr(unix, allow(dead_code))]
    RootFilesystemNotFound,
    #[error("statvfs failed for {mount}: {source}")]
    #[cfg_attr(not(unix), allow(dead_code))]
    Statvfs {
        mount: String,
        source: std::io::Error,
    },
    #[error("filesystem mounted at {mount} reports zero capacity")]
    EmptyFilesystem { mount: String },
    #[error("metric collection is not supported on this platform")]
    Unsupported,
}

/// Point-in-time host readings consumed by the check routines.
#[allow(async_fn_in_trait)]
pub trait MetricSource {
    async fn cpu_percent(&mut self) -> Result<f64, SampleError>;
    fn memory(&mut self) -> Result<Usage, SampleError>;
    fn root_disk(&mut self) -> Result<Usage, SampleError>;
    /// Processes that disappear or refuse access while sampling are left out.
    async fn processes(&mut self) -> Result<Vec<ProcessInfo>, SampleError>;
}
