//! Collection loop: samples disks and views on a fixed period and publishes
//! one frame per cycle.

use chrono::Local;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::core::frame::{DiskPanel, Frame, StatFrame, ViewResult};
use crate::integrations::postgres::{RowSet, SourceError, StatSource};
use crate::integrations::system::SystemMonitor;
use crate::stat::delta::MS_PER_SECOND;
use crate::stat::diff::diff_rows;
use crate::stat::{compute_delta, DiskSnapshot, DiskstatsReader, StatError};
use crate::view::{ViewDefinition, Views};

/// Single-slot handoff: a frame not yet read is replaced by the next one.
pub type FrameSender = watch::Sender<Option<Arc<Frame>>>;
pub type FrameReceiver = watch::Receiver<Option<Arc<Frame>>>;

pub fn frame_channel() -> (FrameSender, FrameReceiver) {
    watch::channel(None)
}

/// Last query of one view.
#[derive(Debug, Clone)]
struct ViewSample {
    taken: Instant,
    /// Undiffed rows, kept to diff the next sample against.
    raw: Option<RowSet>,
    shown: ViewResult,
}

pub struct Collector {
    source: Arc<dyn StatSource>,
    views: Arc<Views>,
    disks: DiskstatsReader,
    monitor: SystemMonitor,
    period: Duration,
    prev_disks: Option<DiskSnapshot>,
    samples: HashMap<&'static str, ViewSample>,
}

impl Collector {
    pub fn new(
        source: Arc<dyn StatSource>,
        views: Arc<Views>,
        disks: DiskstatsReader,
        period: Duration,
    ) -> Self {
        Self {
            source,
            views,
            disks,
            monitor: SystemMonitor::new(),
            period,
            prev_disks: None,
            samples: HashMap::new(),
        }
    }

    /// Take the first disk snapshot so the first cycle already has rates.
    /// A missing local file here is fatal; missing system views only disable
    /// the disk panel.
    pub async fn prime(&mut self) -> Result<(), StatError> {
        match self.disks.read().await {
            Ok(snapshot) => {
                self.prev_disks = snapshot;
                Ok(())
            }
            Err(StatError::Source(SourceError::Unavailable(reason))) => {
                tracing::warn!(%reason, "disk statistics not available");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Run until `token` is cancelled or the receiver goes away.
    pub async fn run(mut self, tx: FrameSender, token: CancellationToken) {
        let mut ticker = tokio::time::interval(self.period);
        // A slow cycle pushes the schedule back instead of bursting to catch up.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(period_ms = self.period.as_millis() as u64, "collector started");

        loop {
            // Scheduled ticks are at least one period apart, so a view whose
            // refresh equals the period is due on every tick.
            let scheduled = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                scheduled = ticker.tick() => scheduled,
            };

            let frame = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                frame = self.cycle(scheduled) => frame,
            };

            if token.is_cancelled() {
                break;
            }
            if tx.send(Some(Arc::new(frame))).is_err() {
                tracing::debug!("frame receiver dropped");
                break;
            }
        }

        tracing::info!("collector stopped");
    }

    /// One collection cycle scheduled at `now`. Failures produce a failed
    /// frame and leave the previous samples as they were.
    pub async fn cycle(&mut self, now: Instant) -> Frame {
        match self.collect(now).await {
            Ok(stats) => Frame::Stats(stats),
            Err(e) => {
                tracing::warn!(error = %e, "collection cycle failed");
                Frame::failed(e)
            }
        }
    }

    async fn collect(&mut self, now: Instant) -> Result<StatFrame, StatError> {
        let (disks, next_disks) = self.collect_disks().await?;

        let views = Arc::clone(&self.views);
        let mut results = IndexMap::with_capacity(views.len());
        let mut fresh = Vec::new();

        for view in views.iter() {
            let previous = self.samples.get(view.name);
            if let Some(sample) = previous {
                if now.duration_since(sample.taken) < view.refresh {
                    results.insert(view.name, sample.shown.clone());
                    continue;
                }
            }

            let sample = match self.source.query(view.query()).await {
                Ok(raw) => {
                    let shown = ViewResult::Rows(diff_view(view, previous, &raw, now));
                    ViewSample {
                        taken: now,
                        raw: Some(raw),
                        shown,
                    }
                }
                Err(SourceError::Unavailable(reason)) => {
                    tracing::debug!(view = view.name, %reason, "view not available");
                    ViewSample {
                        taken: now,
                        raw: None,
                        shown: ViewResult::Unavailable(reason),
                    }
                }
                Err(e) => return Err(e.into()),
            };

            results.insert(view.name, sample.shown.clone());
            fresh.push((view.name, sample));
        }

        // Nothing below can fail, so the cycle is committed as a whole.
        if next_disks.is_some() {
            self.prev_disks = next_disks;
        }
        self.samples.extend(fresh);

        Ok(StatFrame {
            taken_at: Local::now(),
            host: self.monitor.sample(),
            disks,
            views: results,
        })
    }

    async fn collect_disks(&self) -> Result<(DiskPanel, Option<DiskSnapshot>), StatError> {
        match self.disks.read().await {
            Ok(Some(curr)) => {
                let panel = match &self.prev_disks {
                    Some(prev) => DiskPanel::Rates(compute_delta(
                        &prev.devices,
                        &curr.devices,
                        curr.interval_since(prev),
                        MS_PER_SECOND,
                    )),
                    None => DiskPanel::Pending,
                };
                Ok((panel, Some(curr)))
            }
            Ok(None) => Ok((
                DiskPanel::Unavailable("no disk statistics source".to_string()),
                None,
            )),
            Err(StatError::Source(SourceError::Unavailable(reason))) => {
                Ok((DiskPanel::Unavailable(reason), None))
            }
            Err(e) => Err(e),
        }
    }
}

fn diff_view(
    view: &ViewDefinition,
    previous: Option<&ViewSample>,
    raw: &RowSet,
    now: Instant,
) -> RowSet {
    let Some(interval) = view.diff() else {
        return raw.clone();
    };
    let empty = RowSet::default();
    let (prev, elapsed) = match previous {
        Some(ViewSample {
            raw: Some(prev),
            taken,
            ..
        }) => (prev, now.duration_since(*taken).as_secs_f64()),
        _ => (&empty, 0.0),
    };
    diff_rows(prev, raw, interval.range(), view.unique_key, elapsed)
}
