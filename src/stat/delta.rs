//! Per-device I/O rates from two diskstats snapshots.

use super::DiskCounters;

/// Sectors are 512 bytes.
const SECTORS_PER_MB: f64 = 2048.0;

/// Disk time counters in `/proc/diskstats` are in milliseconds.
pub const MS_PER_SECOND: f64 = 1000.0;

/// Rates of one device over an interval, in the order the disk panel prints them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiskRates {
    pub device: String,
    /// Reads plus writes completed during the interval.
    pub completed: u64,
    pub reads_merged_per_sec: f64,
    pub writes_merged_per_sec: f64,
    pub reads_per_sec: f64,
    pub writes_per_sec: f64,
    pub read_mb_per_sec: f64,
    pub write_mb_per_sec: f64,
    /// Average request size in sectors.
    pub avg_request_size: f64,
    pub avg_queue_size: f64,
    pub await_ms: f64,
    pub read_await_ms: f64,
    pub write_await_ms: f64,
    /// Percent of the interval the device was busy.
    pub utilization: f64,
}

/// Counter difference; a counter that went backwards was reset and counts as 0.
fn delta(prev: u64, curr: u64) -> u64 {
    curr.saturating_sub(prev)
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Compute rates between two snapshots.
///
/// Devices are paired by position. If the device lists differ in length or
/// any pair names a different device (a disk was hot-plugged), no rates can be
/// trusted and the result is empty. Devices with no completed I/O since boot
/// are skipped. A non-positive interval yields zero rates instead of a
/// division by zero.
pub fn compute_delta(
    prev: &[DiskCounters],
    curr: &[DiskCounters],
    interval_secs: f64,
    time_units_per_sec: f64,
) -> Vec<DiskRates> {
    if prev.len() != curr.len() {
        tracing::debug!(
            prev = prev.len(),
            curr = curr.len(),
            "device count changed, skipping disk rates"
        );
        return Vec::new();
    }
    if prev.iter().zip(curr).any(|(p, c)| p.device != c.device) {
        tracing::debug!("device order changed, skipping disk rates");
        return Vec::new();
    }

    prev.iter()
        .zip(curr)
        .filter(|(_, c)| c.completed() > 0)
        .map(|(p, c)| device_rates(p, c, interval_secs, time_units_per_sec))
        .collect()
}

fn device_rates(p: &DiskCounters, c: &DiskCounters, interval: f64, units: f64) -> DiskRates {
    let reads = delta(p.reads_completed, c.reads_completed);
    let writes = delta(p.writes_completed, c.writes_completed);
    let rmerged = delta(p.reads_merged, c.reads_merged);
    let wmerged = delta(p.writes_merged, c.writes_merged);
    let rsectors = delta(p.sectors_read, c.sectors_read);
    let wsectors = delta(p.sectors_written, c.sectors_written);
    let rspent = delta(p.read_ms, c.read_ms);
    let wspent = delta(p.write_ms, c.write_ms);
    let tspent = delta(p.io_ms, c.io_ms);
    let weighted = delta(p.weighted_io_ms, c.weighted_io_ms);

    let completed = reads.saturating_add(writes);

    // NaN intervals fall through here too.
    let valid = interval > 0.0 && units > 0.0;
    let per_sec = |d: u64| if valid { d as f64 / interval } else { 0.0 };
    let per_time = |d: u64| if valid { d as f64 / interval / units } else { 0.0 };

    DiskRates {
        device: c.device.clone(),
        completed,
        reads_merged_per_sec: per_sec(rmerged),
        writes_merged_per_sec: per_sec(wmerged),
        reads_per_sec: per_sec(reads),
        writes_per_sec: per_sec(writes),
        read_mb_per_sec: per_sec(rsectors) / SECTORS_PER_MB,
        write_mb_per_sec: per_sec(wsectors) / SECTORS_PER_MB,
        avg_request_size: ratio(rsectors.saturating_add(wsectors), completed),
        avg_queue_size: per_time(weighted),
        await_ms: ratio(rspent.saturating_add(wspent), completed),
        read_await_ms: ratio(rspent, reads),
        write_await_ms: ratio(wspent, writes),
        utilization: per_time(tspent) * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn disk(name: &str) -> DiskCounters {
        DiskCounters {
            major: 8,
            minor: 0,
            device: name.to_string(),
            ..Default::default()
        }
    }

    fn busy(name: &str) -> DiskCounters {
        DiskCounters {
            reads_completed: 100,
            writes_completed: 50,
            read_ms: 1000,
            write_ms: 500,
            ..disk(name)
        }
    }

    #[test]
    fn computes_awaits_from_counter_deltas() {
        let prev = vec![busy("sda")];
        let curr = vec![DiskCounters {
            reads_completed: 150,
            writes_completed: 80,
            read_ms: 1800,
            write_ms: 740,
            ..disk("sda")
        }];

        let rates = compute_delta(&prev, &curr, 10.0, MS_PER_SECOND);
        assert_eq!(rates.len(), 1);
        let r = &rates[0];
        assert_eq!(r.completed, 80);
        assert_eq!(r.read_await_ms, 16.0);
        assert_eq!(r.write_await_ms, 8.0);
        assert_eq!(r.await_ms, 13.0);
        assert_eq!(r.reads_per_sec, 5.0);
        assert_eq!(r.writes_per_sec, 3.0);
    }

    #[test]
    fn throughput_queue_and_utilization() {
        let prev = vec![busy("sda")];
        let curr = vec![DiskCounters {
            reads_completed: 120,
            writes_completed: 50,
            sectors_read: 4096,
            sectors_written: 2048,
            io_ms: 500,
            weighted_io_ms: 2000,
            ..busy("sda")
        }];

        let r = &compute_delta(&prev, &curr, 2.0, MS_PER_SECOND)[0];
        assert_eq!(r.read_mb_per_sec, 1.0);
        assert_eq!(r.write_mb_per_sec, 0.5);
        assert_eq!(r.utilization, 25.0);
        assert_eq!(r.avg_queue_size, 1.0);
        assert_eq!(r.avg_request_size, 6144.0 / 20.0);
    }

    #[test]
    fn device_count_change_gives_nothing() {
        let prev = vec![busy("sda")];
        let curr = vec![busy("sda"), busy("sdb")];
        assert!(compute_delta(&prev, &curr, 1.0, MS_PER_SECOND).is_empty());
    }

    #[test]
    fn device_order_change_gives_nothing() {
        let prev = vec![busy("sda"), busy("sdb")];
        let curr = vec![busy("sdb"), busy("sda")];
        assert!(compute_delta(&prev, &curr, 1.0, MS_PER_SECOND).is_empty());
    }

    #[test]
    fn unchanged_counters_give_zero_rates() {
        let snap = vec![busy("sda")];
        let r = &compute_delta(&snap, &snap, 5.0, MS_PER_SECOND)[0];
        assert_eq!(
            *r,
            DiskRates {
                device: "sda".to_string(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn idle_devices_are_skipped() {
        let prev = vec![disk("sda"), busy("sdb")];
        let curr = vec![disk("sda"), busy("sdb")];
        let rates = compute_delta(&prev, &curr, 1.0, MS_PER_SECOND);
        let names: Vec<&str> = rates.iter().map(|r| r.device.as_str()).collect();
        assert_eq!(names, vec!["sdb"]);
    }

    #[test]
    fn zero_interval_never_divides() {
        let prev = vec![busy("sda")];
        let mut c = busy("sda");
        c.reads_completed += 10;
        c.io_ms += 10;
        for interval in [0.0, -1.0, f64::NAN] {
            let r = &compute_delta(&prev, &[c.clone()], interval, MS_PER_SECOND)[0];
            assert_eq!(r.reads_per_sec, 0.0);
            assert_eq!(r.utilization, 0.0);
            assert!(r.await_ms.is_finite());
        }
    }

    #[test]
    fn counter_reset_is_treated_as_zero() {
        let prev = vec![busy("sda")];
        let curr = vec![DiskCounters {
            reads_completed: 10,
            writes_completed: 5,
            ..disk("sda")
        }];
        let r = &compute_delta(&prev, &curr, 1.0, MS_PER_SECOND)[0];
        assert_eq!(r.completed, 0);
        assert_eq!(r.reads_per_sec, 0.0);
        assert_eq!(r.await_ms, 0.0);
    }

    #[test]
    fn counters_near_u64_max_do_not_overflow() {
        let prev = vec![DiskCounters {
            reads_completed: u64::MAX - 10,
            writes_completed: 5,
            ..disk("sda")
        }];
        let curr = vec![DiskCounters {
            reads_completed: u64::MAX,
            writes_completed: 20,
            ..disk("sda")
        }];
        let rates = compute_delta(&prev, &curr, 1.0, MS_PER_SECOND);
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].completed, 25);
        assert_eq!(rates[0].reads_per_sec, 10.0);

        // Deltas that are themselves huge saturate instead of wrapping.
        let zero = vec![disk("sda")];
        let full = vec![DiskCounters {
            reads_completed: u64::MAX,
            writes_completed: u64::MAX,
            sectors_read: u64::MAX,
            sectors_written: u64::MAX,
            read_ms: u64::MAX,
            write_ms: u64::MAX,
            ..disk("sda")
        }];
        let r = &compute_delta(&zero, &full, 1.0, MS_PER_SECOND)[0];
        assert_eq!(r.completed, u64::MAX);
        assert!(r.await_ms.is_finite());
    }

    #[test]
    fn same_input_same_output() {
        let prev = vec![busy("sda"), busy("nvme0n1")];
        let mut curr = prev.clone();
        curr[1].writes_completed += 7;
        curr[1].write_ms += 21;
        assert_eq!(
            compute_delta(&prev, &curr, 3.0, MS_PER_SECOND),
            compute_delta(&prev, &curr, 3.0, MS_PER_SECOND)
        );
    }
}
