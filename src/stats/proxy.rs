//! Per-proxy aggregates.

use super::record::{
    BackendStats, FrontendStats, ListenerStats, ServerStats, StatRecord,
};
use super::SnapshotError;

/// All statistics one snapshot reports for a single proxy.
///
/// Exactly one frontend and one backend exist per proxy; server and
/// listener counts are unconstrained. Instances are built fresh from one
/// snapshot parse and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyStats {
    /// Raw proxy name as reported by the balancer.
    pub name: String,
    /// Externally meaningful service name from the resolver.
    pub service_name: String,
    /// Capture timestamp, UTC seconds since epoch, shared snapshot-wide.
    pub captured_at: i64,
    pub frontend: FrontendStats,
    pub backend: BackendStats,
    /// Pool members, in snapshot row order.
    pub servers: Vec<ServerStats>,
    /// Socket/listener entries, in snapshot row order.
    pub listeners: Vec<ListenerStats>,
}

impl ProxyStats {
    /// Assemble one proxy's aggregate from its classified records.
    ///
    /// Fails the snapshot when the group does not hold exactly one frontend
    /// and one backend.
    pub(crate) fn from_records(
        name: String,
        service_name: String,
        captured_at: i64,
        records: Vec<StatRecord>,
    ) -> Result<Self, SnapshotError> {
        let mut frontends = Vec::with_capacity(1);
        let mut backends = Vec::with_capacity(1);
        let mut servers = Vec::new();
        let mut listeners = Vec::new();

        for record in records {
            match record {
                StatRecord::Frontend(stats) => frontends.push(stats),
                StatRecord::Backend(stats) => backends.push(stats),
                StatRecord::Server(stats) => servers.push(stats),
                StatRecord::Listener(stats) => listeners.push(stats),
            }
        }

        if frontends.len() != 1 || backends.len() != 1 {
            return Err(SnapshotError::ProxyShape {
                proxy: name,
                frontends: frontends.len(),
                backends: backends.len(),
            });
        }

        // Length checked above; remove() cannot panic.
        Ok(Self {
            name,
            service_name,
            captured_at,
            frontend: frontends.remove(0),
            backend: backends.remove(0),
            servers,
            listeners,
        })
    }
}

/// Result of parsing one snapshot: per-proxy aggregates in first-encounter
/// order, plus the schema-drift report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotStats {
    /// Capture timestamp shared by every aggregate below.
    pub captured_at: i64,
    /// Reference fields absent from this snapshot's header, registry order.
    pub missing_fields: Vec<&'static str>,
    pub proxies: Vec<ProxyStats>,
}

impl SnapshotStats {
    /// Total pool members across all proxies.
    pub fn server_count(&self) -> usize {
        self.proxies.iter().map(|p| p.servers.len()).sum()
    }

    /// Total listener entries across all proxies.
    pub fn listener_count(&self) -> usize {
        self.proxies.iter().map(|p| p.listeners.len()).sum()
    }

    /// Total rows the snapshot reported (two per proxy plus members).
    pub fn row_count(&self) -> usize {
        self.proxies.len() * 2 + self.server_count() + self.listener_count()
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse::parse_snapshot_at;
    use super::*;
    use crate::resolve::PassthroughResolver;

    const TS: i64 = 1_700_000_000;

    fn parse(text: &str) -> Result<SnapshotStats, SnapshotError> {
        parse_snapshot_at(text, &PassthroughResolver, TS)
    }

    #[test]
    fn test_two_backends_fail_with_counts() {
        let text = "\
# pxname,svname,qcur
app,FRONTEND,
app,BACKEND,0
app,BACKEND,0
";
        let err = parse(text).unwrap_err();
        match err {
            SnapshotError::ProxyShape {
                proxy,
                frontends,
                backends,
            } => {
                assert_eq!(proxy, "app");
                assert_eq!(frontends, 1);
                assert_eq!(backends, 2);
            }
            other => panic!("expected ProxyShape, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_frontend_fails() {
        let text = "\
# pxname,svname,qcur
app,BACKEND,0
app,node-1,0
";
        let err = parse(text).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::ProxyShape {
                frontends: 0,
                backends: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_one_bad_group_fails_the_whole_snapshot() {
        // "good" is well formed, "bad" lacks a backend; nothing is returned.
        let text = "\
# pxname,svname,qcur
good,FRONTEND,
good,BACKEND,0
bad,FRONTEND,
";
        let err = parse(text).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::ProxyShape { ref proxy, .. } if proxy == "bad"
        ));
    }

    #[test]
    fn test_group_composition_and_order() {
        let text = "\
# pxname,svname,qcur
app,FRONTEND,
app,sock-1,
app,node-b,0
app,node-a,4
app,BACKEND,0
";
        let snapshot = parse(text).unwrap();
        let proxy = &snapshot.proxies[0];

        assert_eq!(proxy.servers.len(), 2);
        assert_eq!(proxy.listeners.len(), 1);
        // Row order survives aggregation.
        assert_eq!(proxy.servers[0].svname.as_text(), Some("node-b"));
        assert_eq!(proxy.servers[1].svname.as_text(), Some("node-a"));

        assert_eq!(snapshot.server_count(), 2);
        assert_eq!(snapshot.listener_count(), 1);
        assert_eq!(snapshot.row_count(), 5);
    }

    #[test]
    fn test_all_aggregates_share_the_capture_timestamp() {
        let text = "\
# pxname,svname,qcur
a,FRONTEND,
a,BACKEND,0
b,FRONTEND,
b,BACKEND,0
";
        let snapshot = parse(text).unwrap();
        assert!(snapshot.proxies.iter().all(|p| p.captured_at == TS));
    }
}
