//! Snapshot text parsing.
//!
//! Turns one `show stat` CSV dump into ordered per-proxy aggregates. The
//! header row opens with a `# ` comment marker that is stripped before
//! column names are read; data rows are plain unquoted comma-separated
//! cells. Reference fields missing from the header are logged once each and
//! resolve to [`FieldValue::Unknown`](super::FieldValue) in every record.

use std::collections::HashMap;

use chrono::Utc;
use tracing::warn;

use super::proxy::{ProxyStats, SnapshotStats};
use super::record::{
    BackendStats, FrontendStats, ListenerStats, ServerStats, StatKind, StatRecord,
};
use super::schema;
use super::SnapshotError;

/// Comment marker prefixing the header row.
const HEADER_COMMENT: &str = "# ";

/// Column-name → position index for one snapshot's header row.
pub(crate) struct HeaderIndex {
    index: HashMap<String, usize>,
}

impl HeaderIndex {
    /// Parse a header line (comment marker already stripped or absent).
    pub(crate) fn parse(line: &str) -> Self {
        let stripped = line.strip_prefix(HEADER_COMMENT).unwrap_or(line);

        let index = stripped
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .enumerate()
            .map(|(pos, name)| (name.to_string(), pos))
            .collect();

        Self { index }
    }

    /// Iterate the column names present in this snapshot.
    pub(crate) fn columns(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    fn require(&self, column: &'static str) -> Result<(), SnapshotError> {
        if self.position(column).is_none() {
            return Err(SnapshotError::MissingColumn { column });
        }
        Ok(())
    }
}

/// One data row viewed through the snapshot's header.
pub(crate) struct Row<'a> {
    header: &'a HeaderIndex,
    cells: Vec<&'a str>,
}

impl<'a> Row<'a> {
    pub(crate) fn new(header: &'a HeaderIndex, line: &'a str) -> Self {
        Self {
            header,
            cells: line.split(',').collect(),
        }
    }

    /// The raw cell for a column.
    ///
    /// `None` means the column is absent from the snapshot header; a row
    /// too short to reach an existing column reads as an empty cell.
    pub(crate) fn get(&self, column: &str) -> Option<&'a str> {
        self.header
            .position(column)
            .map(|pos| self.cells.get(pos).copied().unwrap_or(""))
    }
}

/// Parse a snapshot, stamping it with the current UTC time.
pub fn parse_snapshot(
    text: &str,
    resolver: &dyn crate::resolve::NameResolver,
) -> Result<SnapshotStats, SnapshotError> {
    parse_snapshot_at(text, resolver, Utc::now().timestamp())
}

/// Parse a snapshot with an explicit capture timestamp (UTC epoch seconds).
///
/// Every record and aggregate built from this snapshot shares `captured_at`.
/// This is the deterministic entry point; [`parse_snapshot`] stamps now.
pub fn parse_snapshot_at(
    text: &str,
    resolver: &dyn crate::resolve::NameResolver,
    captured_at: i64,
) -> Result<SnapshotStats, SnapshotError> {
    let mut lines = text.lines();

    let header_line = lines
        .find(|line| !line.trim().is_empty())
        .ok_or(SnapshotError::EmptySnapshot)?;
    let header = HeaderIndex::parse(header_line);

    header.require("pxname")?;
    header.require("svname")?;

    let missing = schema::missing_fields(header.columns());
    for field in &missing {
        warn!(
            field,
            "reference field missing from snapshot header; an older balancer \
             version is probably in use, affected values resolve to unknown",
        );
    }

    // Group records by raw proxy name, keeping row order within a group and
    // proxy first-encounter order overall.
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<StatRecord>> = HashMap::new();

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }

        let row = Row::new(&header, line);
        // Both columns are guaranteed present by the require() checks above.
        let proxy_name = row.get("pxname").unwrap_or("");
        let service_name = row.get("svname").unwrap_or("");

        let record = match StatKind::classify(&row) {
            StatKind::Frontend => StatRecord::Frontend(FrontendStats::from_row(&row)?),
            StatKind::Backend => StatRecord::Backend(BackendStats::from_row(&row)?),
            StatKind::Server => {
                let identity = resolver.server_identity(proxy_name, service_name);
                StatRecord::Server(ServerStats::from_row(&row, identity)?)
            }
            StatKind::Listener => StatRecord::Listener(ListenerStats::from_row(&row)?),
        };

        if !groups.contains_key(proxy_name) {
            order.push(proxy_name.to_string());
        }
        groups
            .entry(proxy_name.to_string())
            .or_default()
            .push(record);
    }

    let mut proxies = Vec::with_capacity(order.len());
    for name in order {
        let records = groups.remove(&name).unwrap_or_default();
        let service_name = resolver.service_name(&name);
        proxies.push(ProxyStats::from_records(
            name,
            service_name,
            captured_at,
            records,
        )?);
    }

    Ok(SnapshotStats {
        captured_at,
        missing_fields: missing,
        proxies,
    })
}
