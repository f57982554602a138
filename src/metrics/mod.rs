use std::path::{Path, PathBuf};

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use thiserror::Error;
use tracing::{debug, warn};

/// Host and process figures read once per page render.
pub trait SystemMetricsProvider: Send + Sync {
    /// Seconds since boot, or `None` when the host does not expose it.
    fn uptime_seconds(&self) -> Option<f64>;
    /// Memory held by this process, in bytes.
    fn memory_bytes(&self) -> u64;
}

#[derive(Debug, Error)]
pub enum UptimeError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no seconds value in {path}: {content:?}")]
    Parse { path: PathBuf, content: String },
}

/// Reads the first whitespace-separated float from a `/proc/uptime` style file.
pub fn read_uptime(path: &Path) -> Result<f64, UptimeError> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| UptimeError::Read { path: path.to_path_buf(), source })?;
    content
        .split_whitespace()
        .next()
        .and_then(|v| v.parse::<f64>().ok())
        .ok_or_else(|| UptimeError::Parse { path: path.to_path_buf(), content: content.trim().to_string() })
}

/// Uptime from the configured pseudo-file, memory from sysinfo for our own PID.
/// Holds no cached `System`: each call takes a fresh reading.
pub struct HostMetrics {
    uptime_path: PathBuf,
    pid: Option<Pid>,
}

impl HostMetrics {
    pub fn new(uptime_path: impl Into<PathBuf>) -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                warn!(error = %e, "Cannot determine own PID; memory usage will read 0");
                None
            }
        };
        Self { uptime_path: uptime_path.into(), pid }
    }
}

impl SystemMetricsProvider for HostMetrics {
    fn uptime_seconds(&self) -> Option<f64> {
        match read_uptime(&self.uptime_path) {
            Ok(secs) => Some(secs),
            Err(e) => {
                debug!(error = %e, "Uptime unavailable");
                None
            }
        }
    }

    fn memory_bytes(&self) -> u64 {
        let Some(pid) = self.pid else { return 0 };
        let mut sys = System::new();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        match sys.process(pid) {
            Some(proc) => proc.memory(),
            None => {
                warn!(%pid, "Process not visible to sysinfo; memory usage will read 0");
                0
            }
        }
    }
}

#[cfg(test)]
pub(crate) struct FixedMetrics {
    pub uptime: Option<f64>,
    pub memory: u64,
}

#[cfg(test)]
impl SystemMetricsProvider for FixedMetrics {
    fn uptime_seconds(&self) -> Option<f64> {
        self.uptime
    }

    fn memory_bytes(&self) -> u64 {
        self.memory
    }
}
