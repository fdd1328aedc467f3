//! Host summary shown in the header: CPU, memory, load and uptime.

use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

/// Point-in-time host figures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostSummary {
    pub cpu_percent: f32,
    pub memory_used_mb: u64,
    pub memory_total_mb: u64,
    pub load: [f64; 3],
    pub uptime_secs: u64,
}

/// Keeps one `sysinfo::System` alive so CPU usage is measured between calls.
pub struct SystemMonitor {
    sys: System,
}

impl SystemMonitor {
    pub fn new() -> Self {
        // CPU usage is a difference of two refreshes, so take the baseline now.
        let mut sys = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::everything())
                .with_memory(MemoryRefreshKind::everything()),
        );
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        Self { sys }
    }

    pub fn sample(&mut self) -> HostSummary {
        self.sys.refresh_cpu_usage();
        self.sys.refresh_memory();

        let load = System::load_average();

        HostSummary {
            cpu_percent: self.sys.global_cpu_usage(),
            memory_used_mb: self.sys.used_memory() / 1024 / 1024,
            memory_total_mb: self.sys.total_memory() / 1024 / 1024,
            load: [load.one, load.five, load.fifteen],
            uptime_secs: System::uptime(),
        }
    }
}

impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_host_without_nan() {
        let mut monitor = SystemMonitor::new();
        let summary = monitor.sample();

        assert!(
            summary.cpu_percent.is_finite(),
            "CPU percent should always be finite"
        );
        assert!(
            summary.load.iter().all(|l| l.is_finite()),
            "load averages should always be finite"
        );
        assert!(summary.memory_used_mb <= summary.memory_total_mb);
    }
}
