//! Block device counters, read from `/proc/diskstats` on the local host or
//! from the server-side system views when the server is remote.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;

use super::StatError;
use crate::integrations::postgres::{CapabilityProfile, RowSet, StatSource};

// ram disks, loop devices and floppies never carry interesting I/O
static PSEUDO_DEVICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(ram|loop|fd)").expect("Invalid pseudo device regex"));

/// Number of leading fields used from each diskstats line.
const FIELDS: usize = 14;

/// Cumulative counters of one block device, in `/proc/diskstats` order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskCounters {
    pub major: u32,
    pub minor: u32,
    pub device: String,
    pub reads_completed: u64,
    pub reads_merged: u64,
    pub sectors_read: u64,
    pub read_ms: u64,
    pub writes_completed: u64,
    pub writes_merged: u64,
    pub sectors_written: u64,
    pub write_ms: u64,
    pub ios_in_progress: u64,
    pub io_ms: u64,
    pub weighted_io_ms: u64,
}

impl DiskCounters {
    /// Build from the first 14 fields of a diskstats line or row.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, String> {
        if fields.len() < FIELDS {
            return Err(format!("expected {} fields, got {}", FIELDS, fields.len()));
        }

        let num = |i: usize| -> Result<u64, String> {
            let raw = fields[i].as_ref().trim();
            raw.parse::<u64>()
                .map_err(|_| format!("field {} is not a counter: '{}'", i + 1, raw))
        };
        let id = |i: usize| -> Result<u32, String> {
            num(i).and_then(|v| u32::try_from(v).map_err(|e| e.to_string()))
        };

        Ok(Self {
            major: id(0)?,
            minor: id(1)?,
            device: fields[2].as_ref().trim().to_string(),
            reads_completed: num(3)?,
            reads_merged: num(4)?,
            sectors_read: num(5)?,
            read_ms: num(6)?,
            writes_completed: num(7)?,
            writes_merged: num(8)?,
            sectors_written: num(9)?,
            write_ms: num(10)?,
            ios_in_progress: num(11)?,
            io_ms: num(12)?,
            weighted_io_ms: num(13)?,
        })
    }

    /// Reads and writes completed since boot, saturating at `u64::MAX`.
    pub fn completed(&self) -> u64 {
        self.reads_completed.saturating_add(self.writes_completed)
    }

    fn is_pseudo(&self) -> bool {
        PSEUDO_DEVICE.is_match(&self.device)
    }
}

/// All devices at one instant, stamped with system uptime in seconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiskSnapshot {
    pub uptime: f64,
    pub devices: Vec<DiskCounters>,
}

impl DiskSnapshot {
    /// Seconds elapsed between `prev` and this snapshot.
    pub fn interval_since(&self, prev: &DiskSnapshot) -> f64 {
        self.uptime - prev.uptime
    }
}

/// Parse `/proc/diskstats` content, dropping pseudo devices.
pub fn parse_diskstats(content: &str, origin: &str) -> Result<Vec<DiskCounters>, StatError> {
    let mut devices = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let counters =
            DiskCounters::from_fields(&fields).map_err(|reason| StatError::MalformedRecord {
                origin: origin.to_string(),
                line: idx + 1,
                reason,
            })?;
        if !counters.is_pseudo() {
            devices.push(counters);
        }
    }
    Ok(devices)
}

/// Parse the first field of `/proc/uptime`.
pub fn parse_uptime(content: &str, origin: &str) -> Result<f64, StatError> {
    let malformed = |reason: String| StatError::MalformedRecord {
        origin: origin.to_string(),
        line: 1,
        reason,
    };
    let first = content
        .split_whitespace()
        .next()
        .ok_or_else(|| malformed("empty uptime".to_string()))?;
    first
        .parse::<f64>()
        .map_err(|_| malformed(format!("uptime is not a number: '{}'", first)))
}

fn rows_to_devices(set: &RowSet, origin: &str) -> Result<Vec<DiskCounters>, StatError> {
    let mut devices = Vec::with_capacity(set.rows.len());
    for (idx, row) in set.rows.iter().enumerate() {
        let counters =
            DiskCounters::from_fields(row).map_err(|reason| StatError::MalformedRecord {
                origin: origin.to_string(),
                line: idx + 1,
                reason,
            })?;
        if !counters.is_pseudo() {
            devices.push(counters);
        }
    }
    Ok(devices)
}

/// Where disk snapshots come from.
pub enum DiskstatsReader {
    /// Procfs files on this host.
    Local { diskstats: PathBuf, uptime: PathBuf },
    /// Server-side system views in `schema`.
    Remote {
        source: Arc<dyn StatSource>,
        schema: String,
    },
    /// Neither is usable; no disk statistics are shown.
    Disabled,
}

impl DiskstatsReader {
    /// Local files when the server runs on this host, the system views when
    /// a remote server has them, otherwise nothing.
    pub fn select(
        source: Arc<dyn StatSource>,
        profile: &CapabilityProfile,
        diskstats: PathBuf,
        uptime: PathBuf,
        schema: &str,
    ) -> Self {
        if source.is_local() {
            Self::Local { diskstats, uptime }
        } else if profile.features.system_views {
            Self::Remote {
                source,
                schema: schema.to_string(),
            }
        } else {
            tracing::info!("remote server without system views, disk statistics disabled");
            Self::Disabled
        }
    }

    /// Read one snapshot. `Ok(None)` means the reader is disabled.
    pub async fn read(&self) -> Result<Option<DiskSnapshot>, StatError> {
        match self {
            Self::Local { diskstats, uptime } => {
                let uptime_content = read_file(uptime).await?;
                let uptime_secs = parse_uptime(&uptime_content, &uptime.display().to_string())?;
                let content = read_file(diskstats).await?;
                let devices = parse_diskstats(&content, &diskstats.display().to_string())?;
                Ok(Some(DiskSnapshot {
                    uptime: uptime_secs,
                    devices,
                }))
            }
            Self::Remote { source, schema } => {
                let uptime_sql = format!("SELECT seconds_total FROM {}.sys_proc_uptime", schema);
                let uptime_set = source.query(&uptime_sql).await?;
                let raw = uptime_set
                    .rows
                    .first()
                    .and_then(|r| r.first())
                    .map(String::as_str)
                    .unwrap_or("");
                let uptime_secs = parse_uptime(raw, "sys_proc_uptime")?;

                let sql = format!(
                    "SELECT * FROM {}.sys_proc_diskstats ORDER BY (maj, min)",
                    schema
                );
                let set = source.query(&sql).await?;
                let devices = rows_to_devices(&set, "sys_proc_diskstats")?;
                Ok(Some(DiskSnapshot {
                    uptime: uptime_secs,
                    devices,
                }))
            }
            Self::Disabled => Ok(None),
        }
    }
}

async fn read_file(path: &PathBuf) -> Result<String, StatError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StatError::SourceUnavailable {
            path: path.display().to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::postgres::{MockStatSource, SourceError};
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const SAMPLE: &str = "\
   7       0 loop0 120 0 2400 30 0 0 0 0 0 40 30
   8       0 sda 15063 3431 1063714 10128 29530 23790 1436586 47856 0 29204 60856 0 0 0 0
   8       1 sda1 14891 3431 1056698 10084 29504 23790 1436586 47838 0 29164 57924
   1       0 ram0 0 0 0 0 0 0 0 0 0 0 0
 259       0 nvme0n1 400 10 9000 120 800 20 16000 340 2 500 460
";

    #[test]
    fn parses_devices_and_drops_pseudo_ones() {
        let devices = parse_diskstats(SAMPLE, "diskstats").unwrap();
        let names: Vec<&str> = devices.iter().map(|d| d.device.as_str()).collect();
        assert_eq!(names, vec!["sda", "sda1", "nvme0n1"]);

        let sda = &devices[0];
        assert_eq!(sda.major, 8);
        assert_eq!(sda.reads_completed, 15063);
        assert_eq!(sda.write_ms, 47856);
        assert_eq!(sda.weighted_io_ms, 60856);
        assert_eq!(sda.completed(), 15063 + 29530);
    }

    #[test]
    fn completed_saturates_instead_of_overflowing() {
        let line = format!("8 0 sda {} 0 0 0 20 0 0 0 0 0 0", u64::MAX);
        let devices = parse_diskstats(&line, "diskstats").unwrap();
        assert_eq!(devices[0].completed(), u64::MAX);
    }

    #[test]
    fn short_line_is_malformed() {
        let err = parse_diskstats("8 0 sda 1 2 3\n", "diskstats").unwrap_err();
        match err {
            StatError::MalformedRecord { line, .. } => assert_eq!(line, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_numeric_counter_is_malformed() {
        let err = parse_diskstats("8 0 sda 1 2 x 4 5 6 7 8 9 10 11\n", "diskstats").unwrap_err();
        assert!(err.to_string().contains("field 6"), "{err}");
    }

    #[test]
    fn parses_uptime() {
        assert_eq!(parse_uptime("3512.45 12000.10\n", "uptime").unwrap(), 3512.45);
        assert!(parse_uptime("", "uptime").is_err());
    }

    #[tokio::test]
    async fn local_reader_reads_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let diskstats = dir.path().join("diskstats");
        let uptime = dir.path().join("uptime");
        std::fs::File::create(&diskstats)
            .unwrap()
            .write_all(SAMPLE.as_bytes())
            .unwrap();
        std::fs::write(&uptime, "100.50 80.00\n").unwrap();

        let reader = DiskstatsReader::Local { diskstats, uptime };
        let snapshot = reader.read().await.unwrap().unwrap();
        assert_eq!(snapshot.uptime, 100.5);
        assert_eq!(snapshot.devices.len(), 3);
    }

    #[tokio::test]
    async fn missing_local_file_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let reader = DiskstatsReader::Local {
            diskstats: dir.path().join("nope"),
            uptime: dir.path().join("nope-either"),
        };
        assert!(matches!(
            reader.read().await,
            Err(StatError::SourceUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn remote_reader_uses_system_views() {
        let mut source = MockStatSource::new();
        source
            .expect_query()
            .withf(|sql: &str| sql.contains("sys_proc_uptime"))
            .returning(|_| {
                Ok(RowSet {
                    columns: vec!["seconds_total".into()],
                    rows: vec![vec!["42.00".into()]],
                })
            });
        source
            .expect_query()
            .withf(|sql: &str| sql.contains("sys_proc_diskstats"))
            .returning(|_| {
                let row = "8 0 sda 10 0 80 5 20 0 160 9 0 12 14";
                Ok(RowSet {
                    columns: Vec::new(),
                    rows: vec![row.split(' ').map(String::from).collect()],
                })
            });

        let reader = DiskstatsReader::Remote {
            source: Arc::new(source),
            schema: "pgcenter".to_string(),
        };
        let snapshot = reader.read().await.unwrap().unwrap();
        assert_eq!(snapshot.uptime, 42.0);
        assert_eq!(snapshot.devices[0].device, "sda");
        assert_eq!(snapshot.devices[0].sectors_written, 160);
    }

    fn profile(system_views: bool) -> CapabilityProfile {
        CapabilityProfile {
            version: 150000,
            in_recovery: false,
            features: crate::integrations::postgres::Features {
                track_commit_timestamp: false,
                system_views,
            },
            application_name: "pgtop".to_string(),
        }
    }

    fn source(local: bool) -> Arc<dyn StatSource> {
        let mut source = MockStatSource::new();
        source.expect_is_local().return_const(local);
        Arc::new(source)
    }

    #[test]
    fn selects_reader_by_locality_and_features() {
        let pick = |local, views| {
            DiskstatsReader::select(
                source(local),
                &profile(views),
                PathBuf::from("/proc/diskstats"),
                PathBuf::from("/proc/uptime"),
                "pgcenter",
            )
        };
        assert!(matches!(pick(true, false), DiskstatsReader::Local { .. }));
        assert!(matches!(pick(false, true), DiskstatsReader::Remote { .. }));
        assert!(matches!(pick(false, false), DiskstatsReader::Disabled));
    }

    #[tokio::test]
    async fn remote_reader_passes_through_missing_schema() {
        let mut source = MockStatSource::new();
        source
            .expect_query()
            .returning(|_| Err(SourceError::Unavailable("relation does not exist".into())));

        let reader = DiskstatsReader::Remote {
            source: Arc::new(source),
            schema: "pgcenter".to_string(),
        };
        assert!(matches!(
            reader.read().await,
            Err(StatError::Source(SourceError::Unavailable(_)))
        ));
    }
}
