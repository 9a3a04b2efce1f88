use crate::collectors::{MetricSource, ProcessInfo, SampleError, Usage};
use std::time::Duration;
#[cfg(not(unix))]
use sysinfo::DiskExt;
use sysinfo::{CpuExt, Pid, PidExt, ProcessExt, System, SystemExt};
use tracing::debug;

pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

#[cfg(unix)]
const ROOT_MOUNT: &str = "/";

pub struct SysinfoSource {
    system: System,
    interval: Duration,
}

impl SysinfoSource {
    pub fn new(interval: Duration) -> Self {
        Self {
            system: System::new(),
            interval: interval.max(System::MINIMUM_CPU_UPDATE_INTERVAL),
        }
    }

    async fn wait_interval(&self) {
        debug!(
            interval = %humantime::format_duration(self.interval),
            "waiting between samples"
        );
        tokio::time::sleep(self.interval).await;
    }

    fn lookup_process(&self, pid: Pid, total_memory: u64) -> Option<ProcessInfo> {
        let process = self.system.process(pid)?;
        let cpu = f64::from(process.cpu_usage());
        Some(ProcessInfo {
            pid: pid.as_u32(),
            name: process.name().to_string(),
            cpu_percent: cpu.is_finite().then_some(cpu),
            memory_percent: (total_memory > 0)
                .then(|| percent(process.memory(), total_memory)),
        })
    }
}

impl MetricSource for SysinfoSource {
    async fn cpu_percent(&mut self) -> Result<f64, SampleError> {
        self.system.refresh_cpu();
        self.wait_interval().await;
        self.system.refresh_cpu();
        if self.system.cpus().is_empty() {
            return Err(SampleError::CpuUnavailable);
        }
        Ok(f64::from(self.system.global_cpu_info().cpu_usage()))
    }

    fn memory(&mut self) -> Result<Usage, SampleError> {
        self.system.refresh_memory();
        memory_usage(self.system.total_memory(), self.system.available_memory())
    }

    #[cfg(unix)]
    fn root_disk(&mut self) -> Result<Usage, SampleError> {
        filesystem_usage(ROOT_MOUNT, statvfs(ROOT_MOUNT)?)
    }

    #[cfg(not(unix))]
    fn root_disk(&mut self) -> Result<Usage, SampleError> {
        self.system.refresh_disks_list();
        // Outside Unix the first listed disk is the system drive.
        let disk = self
            .system
            .disks()
            .first()
            .ok_or(SampleError::RootFilesystemNotFound)?;
        let available = disk.available_space();
        let stats = FsStats {
            total_bytes: disk.total_space(),
            free_bytes: available,
            available_bytes: available,
        };
        filesystem_usage(&disk.mount_point().display().to_string(), stats)
    }

    async fn processes(&mut self) -> Result<Vec<ProcessInfo>, SampleError> {
        if !System::IS_SUPPORTED {
            return Err(SampleError::Unsupported);
        }
        self.system.refresh_memory();
        self.system.refresh_processes();
        let pids: Vec<Pid> = self.system.processes().keys().copied().collect();

        // CPU shares need a second refresh; processes gone by then are dropped.
        self.wait_interval().await;
        self.system.refresh_processes();

        let total_memory = self.system.total_memory();
        let snapshot: Vec<ProcessInfo> = pids
            .into_iter()
            .filter_map(|pid| self.lookup_process(pid, total_memory))
            .collect();
        debug!(
            listed = snapshot.len(),
            live = self.system.processes().len(),
            "process snapshot taken"
        );
        Ok(snapshot)
    }
}

/// Block counts for one filesystem, in bytes. `free_bytes` includes blocks
/// reserved for root; `available_bytes` does not.
#[derive(Debug, Clone, Copy)]
struct FsStats {
    total_bytes: u64,
    free_bytes: u64,
    available_bytes: u64,
}

#[cfg(unix)]
fn statvfs(mount: &str) -> Result<FsStats, SampleError> {
    use std::ffi::CString;
    use std::mem::MaybeUninit;

    let to_error = |source| SampleError::Statvfs {
        mount: mount.to_string(),
        source,
    };
    let c_path = CString::new(mount)
        .map_err(|e| to_error(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?;
    let mut stat = MaybeUninit::<libc::statvfs>::uninit();

    // SAFETY: c_path is NUL-terminated and stat points to writable storage.
    let ret = unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) };
    if ret != 0 {
        return Err(to_error(std::io::Error::last_os_error()));
    }
    // SAFETY: statvfs returned 0, so it filled the struct.
    let stat = unsafe { stat.assume_init() };

    let block_size = stat.f_frsize as u64;
    Ok(FsStats {
        total_bytes: stat.f_blocks as u64 * block_size,
        free_bytes: stat.f_bfree as u64 * block_size,
        available_bytes: stat.f_bavail as u64 * block_size,
    })
}

/// Same figures as `df`: reserved blocks count neither as used nor as
/// available, so the percentage is `used / (used + available)`.
fn filesystem_usage(mount: &str, stats: FsStats) -> Result<Usage, SampleError> {
    if stats.total_bytes == 0 {
        return Err(SampleError::EmptyFilesystem {
            mount: mount.to_string(),
        });
    }
    let used = stats.total_bytes.saturating_sub(stats.free_bytes);
    Ok(Usage {
        percent: percent(used, used + stats.available_bytes),
        used_bytes: used,
        total_bytes: stats.total_bytes,
    })
}

fn memory_usage(total: u64, available: u64) -> Result<Usage, SampleError> {
    if total == 0 {
        return Err(SampleError::MemoryUnavailable);
    }
    let used = total.saturating_sub(available);
    Ok(Usage {
        percent: percent(used, total),
        used_bytes: used,
        total_bytes: total,
    })
}

fn percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    used as f64 / total as f64 * 100.0
}
