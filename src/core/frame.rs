//! One collection cycle's output, handed from the collector to the UI.

use chrono::{DateTime, Local};
use indexmap::IndexMap;

use crate::integrations::postgres::RowSet;
use crate::integrations::system::HostSummary;
use crate::stat::DiskRates;

/// What the disk panel can show this cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum DiskPanel {
    Rates(Vec<DiskRates>),
    /// No previous snapshot to diff against yet.
    Pending,
    /// No disk source for this server.
    Unavailable(String),
}

/// One view's rows, or why there are none.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewResult {
    Rows(RowSet),
    /// The relation or extension behind the view isn't installed.
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatFrame {
    pub taken_at: DateTime<Local>,
    pub host: HostSummary,
    pub disks: DiskPanel,
    /// Keyed by view name.
    pub views: IndexMap<&'static str, ViewResult>,
}

/// Immutable once published.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Stats(StatFrame),
    Failed {
        taken_at: DateTime<Local>,
        error: String,
    },
}

impl Frame {
    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self::Failed {
            taken_at: Local::now(),
            error: error.to_string(),
        }
    }

    pub fn taken_at(&self) -> DateTime<Local> {
        match self {
            Self::Stats(stats) => stats.taken_at,
            Self::Failed { taken_at, .. } => *taken_at,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
