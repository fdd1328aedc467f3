//! Cumulative counter sampling and rate computation

pub mod delta;
pub mod diff;
pub mod diskstats;

use thiserror::Error;

use crate::integrations::postgres::SourceError;

pub use delta::{compute_delta, DiskRates};
pub use diskstats::{DiskCounters, DiskSnapshot, DiskstatsReader};

/// Errors raised while reading a snapshot
#[derive(Debug, Error)]
pub enum StatError {
    #[error("{path}: {source}")]
    SourceUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{origin}: malformed record at line {line}: {reason}")]
    MalformedRecord {
        origin: String,
        line: usize,
        reason: String,
    },

    #[error(transparent)]
    Source(#[from] SourceError),
}
