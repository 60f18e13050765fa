use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use sysinfo::{Disks, System};
use thiserror::Error;
use tracing::{debug, warn};

/// One instantaneous reading of host utilization, all values in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostMetrics {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    #[error("the OS reported zero total memory")]
    NoMemoryInfo,
    #[error("no mounted volume covers {0}")]
    RootVolumeNotFound(String),
}

#[async_trait]
pub trait MetricsReader: Send {
    async fn read_metrics(&mut self) -> Result<HostMetrics, MetricsError>;
}

/// Space figures for one mounted volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeUsage {
    pub mount_point: PathBuf,
    pub total_bytes: u64,
    pub available_bytes: u64,
}

/// The volume that holds the operating system.
pub fn platform_root() -> &'static Path {
    if cfg!(windows) {
        Path::new("C:\\")
    } else {
        Path::new("/")
    }
}

/// `(total - available) / total`. For disks, `available` excludes blocks
/// reserved for root, so on volumes with a reserve (ext4 defaults to 5%) this
/// reads higher than a `used / (used + free)` figure such as `df` reports.
pub fn usage_percent(total: u64, available: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let used = total.saturating_sub(available);
    (used as f64 / total as f64) * 100.0
}

/// Picks the volume mounted exactly at `root`, falling back to the one whose
/// mount point is the longest prefix of `root`.
pub fn select_root_volume<'a>(volumes: &'a [VolumeUsage], root: &Path) -> Option<&'a VolumeUsage> {
    volumes
        .iter()
        .filter(|v| v.total_bytes > 0 && root.starts_with(&v.mount_point))
        .max_by_key(|v| v.mount_point.as_os_str().len())
}

/// Reads utilization through `sysinfo`. The CPU figure is averaged over
/// `cpu_sample_window`, during which the caller is suspended.
pub struct SysinfoMetricsReader {
    sys: System,
    cpu_sample_window: Duration,
    root: PathBuf,
}

impl SysinfoMetricsReader {
    pub fn new(cpu_sample_window: Duration) -> Self {
        Self {
            sys: System::new(),
            cpu_sample_window,
            root: platform_root().to_path_buf(),
        }
    }

    async fn sample_cpu(&mut self) -> f64 {
        // Usage is a delta between two refreshes; the first one sets the baseline.
        self.sys.refresh_cpu_usage();
        tokio::time::sleep(self.cpu_sample_window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL)).await;
        self.sys.refresh_cpu_usage();
        f64::from(self.sys.global_cpu_usage())
    }

    fn sample_memory(&mut self) -> Result<f64, MetricsError> {
        self.sys.refresh_memory();
        let total = self.sys.total_memory();
        if total == 0 {
            return Err(MetricsError::NoMemoryInfo);
        }
        Ok(usage_percent(total, self.sys.available_memory()))
    }

    fn sample_disk(&self) -> Result<f64, MetricsError> {
        let disks = Disks::new_with_refreshed_list();
        let volumes: Vec<VolumeUsage> = disks
            .list()
            .iter()
            .map(|d| VolumeUsage {
                mount_point: d.mount_point().to_path_buf(),
                total_bytes: d.total_space(),
                available_bytes: d.available_space(),
            })
            .collect();

        let volume = select_root_volume(&volumes, &self.root).ok_or_else(|| {
            warn!(root = ?self.root, volumes = volumes.len(), "No volume found for root path.");
            MetricsError::RootVolumeNotFound(self.root.display().to_string())
        })?;
        if volume.mount_point != self.root {
            debug!(root = ?self.root, mount_point = ?volume.mount_point, "Root path is not a mount point, using enclosing volume.");
        }
        Ok(usage_percent(volume.total_bytes, volume.available_bytes))
    }
}

#[async_trait]
impl MetricsReader for SysinfoMetricsReader {
    async fn read_metrics(&mut self) -> Result<HostMetrics, MetricsError> {
        let cpu_percent = self.sample_cpu().await;
        let memory_percent = self.sample_memory()?;
        let disk_percent = self.sample_disk()?;
        debug!(cpu_percent, memory_percent, disk_percent, "Read host metrics.");
        Ok(HostMetrics {
            cpu_percent,
            memory_percent,
            disk_percent,
        })
    }
}
