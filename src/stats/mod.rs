//! Parsing and aggregation of HAProxy `show stat` snapshots.
//!
//! One snapshot of the stats socket CSV table is turned into an ordered
//! sequence of per-proxy aggregates ([`ProxyStats`]). The whole pass is
//! synchronous and carries no state between invocations; fetching the raw
//! text and resolving external names are collaborator concerns
//! ([`crate::source`], [`crate::resolve`]).

pub mod field;
pub mod parse;
pub mod proxy;
pub mod record;
pub mod schema;

use thiserror::Error;

pub use field::FieldValue;
pub use parse::{parse_snapshot, parse_snapshot_at};
pub use proxy::{ProxyStats, SnapshotStats};
pub use record::{
    BackendStats, FrontendStats, ListenerStats, ServerStats, StatKind, StatRecord,
};

/// Errors that abort processing of a snapshot.
///
/// Schema drift (a reference field missing from the header) is not an error;
/// it is logged once per field and the affected values resolve to
/// [`FieldValue::Unknown`].
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error(
        "exactly one FRONTEND and one BACKEND row must correspond to a single \
         proxy; proxy '{proxy}' has {frontends} frontends and {backends} backends"
    )]
    ProxyShape {
        proxy: String,
        frontends: usize,
        backends: usize,
    },

    #[error("field '{field}' holds non-numeric value '{value}'")]
    InvalidInteger { field: &'static str, value: String },

    #[error("snapshot header is missing the '{column}' column")]
    MissingColumn { column: &'static str },

    #[error("snapshot contains no header row")]
    EmptySnapshot,
}

impl SnapshotError {
    /// Stable label for error counters.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ProxyShape { .. } => "proxy_shape",
            Self::InvalidInteger { .. } => "invalid_integer",
            Self::MissingColumn { .. } => "missing_column",
            Self::EmptySnapshot => "empty_snapshot",
        }
    }
}
