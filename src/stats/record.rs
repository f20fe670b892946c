use std::fmt;

use super::field::FieldValue;
use super::parse::Row;
use super::SnapshotError;

/// Service-name marker for a proxy's client-facing row.
pub const FRONTEND_MARKER: &str = "FRONTEND";

/// Service-name marker for a proxy's server-pool row.
pub const BACKEND_MARKER: &str = "BACKEND";

/// StatKind identifies which of the four record shapes a raw row carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKind {
    Listener,
    Frontend,
    Backend,
    Server,
}

impl StatKind {
    /// Classify one raw row.
    ///
    /// The order of checks matters: only the two marker values and the
    /// presence of a non-empty `qcur` cell participate. Listener rows may
    /// carry non-empty text in other columns, so nothing else is consulted.
    pub(crate) fn classify(row: &Row<'_>) -> Self {
        match row.get("svname") {
            Some(FRONTEND_MARKER) => Self::Frontend,
            Some(BACKEND_MARKER) => Self::Backend,
            // Listener rows never report current queue depth.
            _ => match row.get("qcur") {
                Some(cell) if !cell.is_empty() => Self::Server,
                _ => Self::Listener,
            },
        }
    }

    /// Canonical log/metric label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Listener => "listener",
            Self::Frontend => "frontend",
            Self::Backend => "backend",
            Self::Server => "server",
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics reported for a raw socket/listener row.
///
/// Field meanings follow section 9.1 of the HAProxy 1.5 configuration
/// manual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerStats {
    pub pxname: FieldValue,  // proxy name
    pub svname: FieldValue,  // service name
    pub scur: FieldValue,    // current sessions
    pub smax: FieldValue,    // max sessions
    pub slim: FieldValue,    // configured session limit
    pub stot: FieldValue,    // cumulative connections
    pub bin: FieldValue,     // bytes in
    pub bout: FieldValue,    // bytes out
    pub dreq: FieldValue,    // requests denied for security
    pub dresp: FieldValue,   // responses denied for security
    pub ereq: FieldValue,    // request errors
    pub status: FieldValue,  // UP/DOWN/NOLB/MAINT/...
    pub pid: FieldValue,     // process number
    pub iid: FieldValue,     // unique proxy id
    pub sid: FieldValue,     // server id within the proxy
    pub typ: FieldValue,     // entity type ("type" column)
}

impl ListenerStats {
    pub(crate) fn from_row(row: &Row<'_>) -> Result<Self, SnapshotError> {
        Ok(Self {
            pxname: FieldValue::coerce("pxname", row.get("pxname"))?,
            svname: FieldValue::coerce("svname", row.get("svname"))?,
            scur: FieldValue::coerce("scur", row.get("scur"))?,
            smax: FieldValue::coerce("smax", row.get("smax"))?,
            slim: FieldValue::coerce("slim", row.get("slim"))?,
            stot: FieldValue::coerce("stot", row.get("stot"))?,
            bin: FieldValue::coerce("bin", row.get("bin"))?,
            bout: FieldValue::coerce("bout", row.get("bout"))?,
            dreq: FieldValue::coerce("dreq", row.get("dreq"))?,
            dresp: FieldValue::coerce("dresp", row.get("dresp"))?,
            ereq: FieldValue::coerce("ereq", row.get("ereq"))?,
            status: FieldValue::coerce("status", row.get("status"))?,
            pid: FieldValue::coerce("pid", row.get("pid"))?,
            iid: FieldValue::coerce("iid", row.get("iid"))?,
            sid: FieldValue::coerce("sid", row.get("sid"))?,
            typ: FieldValue::coerce("type", row.get("type"))?,
        })
    }
}

/// Statistics reported for a proxy's FRONTEND row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendStats {
    pub pxname: FieldValue,       // proxy name
    pub svname: FieldValue,       // service name (always FRONTEND)
    pub scur: FieldValue,         // current sessions
    pub smax: FieldValue,         // max sessions
    pub slim: FieldValue,         // configured session limit
    pub stot: FieldValue,         // cumulative connections
    pub bin: FieldValue,          // bytes in
    pub bout: FieldValue,         // bytes out
    pub dreq: FieldValue,         // requests denied for security
    pub dresp: FieldValue,        // responses denied for security
    pub ereq: FieldValue,         // request errors
    pub status: FieldValue,       // OPEN/FULL/...
    pub pid: FieldValue,          // process number
    pub iid: FieldValue,          // unique proxy id
    pub typ: FieldValue,          // entity type
    pub rate: FieldValue,         // sessions per second over last second
    pub rate_lim: FieldValue,     // configured limit on new sessions/s
    pub rate_max: FieldValue,     // max new sessions/s observed
    pub hrsp_1xx: FieldValue,     // HTTP responses with 1xx code
    pub hrsp_2xx: FieldValue,     // HTTP responses with 2xx code
    pub hrsp_3xx: FieldValue,     // HTTP responses with 3xx code
    pub hrsp_4xx: FieldValue,     // HTTP responses with 4xx code
    pub hrsp_5xx: FieldValue,     // HTTP responses with 5xx code
    pub hrsp_other: FieldValue,   // HTTP responses with other codes
    pub req_rate: FieldValue,     // HTTP requests per second
    pub req_rate_max: FieldValue, // max HTTP requests per second observed
    pub req_tot: FieldValue,      // total HTTP requests received
    pub comp_in: FieldValue,      // bytes fed to the compressor
    pub comp_out: FieldValue,     // bytes emitted by the compressor
    pub comp_byp: FieldValue,     // bytes that bypassed the compressor
    pub comp_rsp: FieldValue,     // responses that were compressed
}

impl FrontendStats {
    pub(crate) fn from_row(row: &Row<'_>) -> Result<Self, SnapshotError> {
        Ok(Self {
            pxname: FieldValue::coerce("pxname", row.get("pxname"))?,
            svname: FieldValue::coerce("svname", row.get("svname"))?,
            scur: FieldValue::coerce("scur", row.get("scur"))?,
            smax: FieldValue::coerce("smax", row.get("smax"))?,
            slim: FieldValue::coerce("slim", row.get("slim"))?,
            stot: FieldValue::coerce("stot", row.get("stot"))?,
            bin: FieldValue::coerce("bin", row.get("bin"))?,
            bout: FieldValue::coerce("bout", row.get("bout"))?,
            dreq: FieldValue::coerce("dreq", row.get("dreq"))?,
            dresp: FieldValue::coerce("dresp", row.get("dresp"))?,
            ereq: FieldValue::coerce("ereq", row.get("ereq"))?,
            status: FieldValue::coerce("status", row.get("status"))?,
            pid: FieldValue::coerce("pid", row.get("pid"))?,
            iid: FieldValue::coerce("iid", row.get("iid"))?,
            typ: FieldValue::coerce("type", row.get("type"))?,
            rate: FieldValue::coerce("rate", row.get("rate"))?,
            rate_lim: FieldValue::coerce("rate_lim", row.get("rate_lim"))?,
            rate_max: FieldValue::coerce("rate_max", row.get("rate_max"))?,
            hrsp_1xx: FieldValue::coerce("hrsp_1xx", row.get("hrsp_1xx"))?,
            hrsp_2xx: FieldValue::coerce("hrsp_2xx", row.get("hrsp_2xx"))?,
            hrsp_3xx: FieldValue::coerce("hrsp_3xx", row.get("hrsp_3xx"))?,
            hrsp_4xx: FieldValue::coerce("hrsp_4xx", row.get("hrsp_4xx"))?,
            hrsp_5xx: FieldValue::coerce("hrsp_5xx", row.get("hrsp_5xx"))?,
            hrsp_other: FieldValue::coerce("hrsp_other", row.get("hrsp_other"))?,
            req_rate: FieldValue::coerce("req_rate", row.get("req_rate"))?,
            req_rate_max: FieldValue::coerce("req_rate_max", row.get("req_rate_max"))?,
            req_tot: FieldValue::coerce("req_tot", row.get("req_tot"))?,
            comp_in: FieldValue::coerce("comp_in", row.get("comp_in"))?,
            comp_out: FieldValue::coerce("comp_out", row.get("comp_out"))?,
            comp_byp: FieldValue::coerce("comp_byp", row.get("comp_byp"))?,
            comp_rsp: FieldValue::coerce("comp_rsp", row.get("comp_rsp"))?,
        })
    }
}

/// Statistics reported for a proxy's BACKEND row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendStats {
    pub pxname: FieldValue,     // proxy name
    pub svname: FieldValue,     // service name (always BACKEND)
    pub qcur: FieldValue,       // current queued requests
    pub qmax: FieldValue,       // max value of qcur
    pub scur: FieldValue,       // current sessions
    pub smax: FieldValue,       // max sessions
    pub slim: FieldValue,       // configured session limit
    pub stot: FieldValue,       // cumulative connections
    pub bin: FieldValue,        // bytes in
    pub bout: FieldValue,       // bytes out
    pub dreq: FieldValue,       // requests denied for security
    pub dresp: FieldValue,      // responses denied for security
    pub econ: FieldValue,       // connection errors
    pub eresp: FieldValue,      // response errors (includes srv_abrt)
    pub wretr: FieldValue,      // connection retries
    pub wredis: FieldValue,     // request redispatches
    pub status: FieldValue,     // UP/DOWN/...
    pub weight: FieldValue,     // total weight
    pub act: FieldValue,        // active servers
    pub bck: FieldValue,        // backup servers
    pub chkdown: FieldValue,    // UP->DOWN transitions
    pub lastchg: FieldValue,    // seconds since last UP<->DOWN transition
    pub downtime: FieldValue,   // total downtime in seconds
    pub pid: FieldValue,        // process number
    pub iid: FieldValue,        // unique proxy id
    pub lbtot: FieldValue,      // times a server was selected
    pub typ: FieldValue,        // entity type
    pub rate: FieldValue,       // sessions per second over last second
    pub rate_max: FieldValue,   // max new sessions/s observed
    pub hrsp_1xx: FieldValue,   // HTTP responses with 1xx code
    pub hrsp_2xx: FieldValue,   // HTTP responses with 2xx code
    pub hrsp_3xx: FieldValue,   // HTTP responses with 3xx code
    pub hrsp_4xx: FieldValue,   // HTTP responses with 4xx code
    pub hrsp_5xx: FieldValue,   // HTTP responses with 5xx code
    pub hrsp_other: FieldValue, // HTTP responses with other codes
    pub cli_abrt: FieldValue,   // transfers aborted by the client
    pub srv_abrt: FieldValue,   // transfers aborted by the server
    pub comp_in: FieldValue,    // bytes fed to the compressor
    pub comp_out: FieldValue,   // bytes emitted by the compressor
    pub comp_byp: FieldValue,   // bytes that bypassed the compressor
    pub comp_rsp: FieldValue,   // responses that were compressed
    pub lastsess: FieldValue,   // seconds since last assigned session
    pub qtime: FieldValue,      // avg queue time (ms, last 1024 requests)
    pub ctime: FieldValue,      // avg connect time (ms)
    pub rtime: FieldValue,      // avg response time (ms)
    pub ttime: FieldValue,      // avg total session time (ms)
}

impl BackendStats {
    pub(crate) fn from_row(row: &Row<'_>) -> Result<Self, SnapshotError> {
        Ok(Self {
            pxname: FieldValue::coerce("pxname", row.get("pxname"))?,
            svname: FieldValue::coerce("svname", row.get("svname"))?,
            qcur: FieldValue::coerce("qcur", row.get("qcur"))?,
            qmax: FieldValue::coerce("qmax", row.get("qmax"))?,
            scur: FieldValue::coerce("scur", row.get("scur"))?,
            smax: FieldValue::coerce("smax", row.get("smax"))?,
            slim: FieldValue::coerce("slim", row.get("slim"))?,
            stot: FieldValue::coerce("stot", row.get("stot"))?,
            bin: FieldValue::coerce("bin", row.get("bin"))?,
            bout: FieldValue::coerce("bout", row.get("bout"))?,
            dreq: FieldValue::coerce("dreq", row.get("dreq"))?,
            dresp: FieldValue::coerce("dresp", row.get("dresp"))?,
            econ: FieldValue::coerce("econ", row.get("econ"))?,
            eresp: FieldValue::coerce("eresp", row.get("eresp"))?,
            wretr: FieldValue::coerce("wretr", row.get("wretr"))?,
            wredis: FieldValue::coerce("wredis", row.get("wredis"))?,
            status: FieldValue::coerce("status", row.get("status"))?,
            weight: FieldValue::coerce("weight", row.get("weight"))?,
            act: FieldValue::coerce("act", row.get("act"))?,
            bck: FieldValue::coerce("bck", row.get("bck"))?,
            chkdown: FieldValue::coerce("chkdown", row.get("chkdown"))?,
            lastchg: FieldValue::coerce("lastchg", row.get("lastchg"))?,
            downtime: FieldValue::coerce("downtime", row.get("downtime"))?,
            pid: FieldValue::coerce("pid", row.get("pid"))?,
            iid: FieldValue::coerce("iid", row.get("iid"))?,
            lbtot: FieldValue::coerce("lbtot", row.get("lbtot"))?,
            typ: FieldValue::coerce("type", row.get("type"))?,
            rate: FieldValue::coerce("rate", row.get("rate"))?,
            rate_max: FieldValue::coerce("rate_max", row.get("rate_max"))?,
            hrsp_1xx: FieldValue::coerce("hrsp_1xx", row.get("hrsp_1xx"))?,
            hrsp_2xx: FieldValue::coerce("hrsp_2xx", row.get("hrsp_2xx"))?,
            hrsp_3xx: FieldValue::coerce("hrsp_3xx", row.get("hrsp_3xx"))?,
            hrsp_4xx: FieldValue::coerce("hrsp_4xx", row.get("hrsp_4xx"))?,
            hrsp_5xx: FieldValue::coerce("hrsp_5xx", row.get("hrsp_5xx"))?,
            hrsp_other: FieldValue::coerce("hrsp_other", row.get("hrsp_other"))?,
            cli_abrt: FieldValue::coerce("cli_abrt", row.get("cli_abrt"))?,
            srv_abrt: FieldValue::coerce("srv_abrt", row.get("srv_abrt"))?,
            comp_in: FieldValue::coerce("comp_in", row.get("comp_in"))?,
            comp_out: FieldValue::coerce("comp_out", row.get("comp_out"))?,
            comp_byp: FieldValue::coerce("comp_byp", row.get("comp_byp"))?,
            comp_rsp: FieldValue::coerce("comp_rsp", row.get("comp_rsp"))?,
            lastsess: FieldValue::coerce("lastsess", row.get("lastsess"))?,
            qtime: FieldValue::coerce("qtime", row.get("qtime"))?,
            ctime: FieldValue::coerce("ctime", row.get("ctime"))?,
            rtime: FieldValue::coerce("rtime", row.get("rtime"))?,
            ttime: FieldValue::coerce("ttime", row.get("ttime"))?,
        })
    }
}

/// Statistics reported for one pool member, plus its resolved external
/// identity used to cross-reference process-level stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerStats {
    /// Stable external identity from the name-resolution collaborator.
    pub unified_server_name: String,
    pub pxname: FieldValue,         // proxy name
    pub svname: FieldValue,         // server name within the proxy
    pub qcur: FieldValue,           // current queued requests
    pub qmax: FieldValue,           // max value of qcur
    pub scur: FieldValue,           // current sessions
    pub smax: FieldValue,           // max sessions
    pub slim: FieldValue,           // configured session limit
    pub stot: FieldValue,           // cumulative connections
    pub bin: FieldValue,            // bytes in
    pub bout: FieldValue,           // bytes out
    pub dresp: FieldValue,          // responses denied for security
    pub econ: FieldValue,           // connection errors
    pub eresp: FieldValue,          // response errors (includes srv_abrt)
    pub wretr: FieldValue,          // connection retries
    pub wredis: FieldValue,         // request redispatches
    pub status: FieldValue,         // UP/DOWN/MAINT/...
    pub weight: FieldValue,         // server weight
    pub act: FieldValue,            // server is active
    pub bck: FieldValue,            // server is backup
    pub chkfail: FieldValue,        // failed health checks
    pub chkdown: FieldValue,        // UP->DOWN transitions
    pub lastchg: FieldValue,        // seconds since last UP<->DOWN transition
    pub downtime: FieldValue,       // total downtime in seconds
    pub qlimit: FieldValue,         // configured maxqueue
    pub pid: FieldValue,            // process number
    pub iid: FieldValue,            // unique proxy id
    pub sid: FieldValue,            // server id within the proxy
    pub throttle: FieldValue,       // current throttle percentage
    pub lbtot: FieldValue,          // times this server was selected
    pub tracked: FieldValue,        // id of tracked proxy/server
    pub typ: FieldValue,            // entity type
    pub rate: FieldValue,           // sessions per second over last second
    pub rate_max: FieldValue,       // max new sessions/s observed
    pub check_status: FieldValue,   // status of last health check
    pub check_code: FieldValue,     // layer 5-7 check code
    pub check_duration: FieldValue, // last health check duration (ms)
    pub hrsp_1xx: FieldValue,       // HTTP responses with 1xx code
    pub hrsp_2xx: FieldValue,       // HTTP responses with 2xx code
    pub hrsp_3xx: FieldValue,       // HTTP responses with 3xx code
    pub hrsp_4xx: FieldValue,       // HTTP responses with 4xx code
    pub hrsp_5xx: FieldValue,       // HTTP responses with 5xx code
    pub hrsp_other: FieldValue,     // HTTP responses with other codes
    pub hanafail: FieldValue,       // failed health check details
    pub cli_abrt: FieldValue,       // transfers aborted by the client
    pub srv_abrt: FieldValue,       // transfers aborted by the server
    pub lastsess: FieldValue,       // seconds since last assigned session
    pub last_chk: FieldValue,       // last health check contents or error
    pub last_agt: FieldValue,       // last agent check contents or error
    pub qtime: FieldValue,          // avg queue time (ms, last 1024 requests)
    pub ctime: FieldValue,          // avg connect time (ms)
    pub rtime: FieldValue,          // avg response time (ms)
    pub ttime: FieldValue,          // avg total session time (ms)
}

impl ServerStats {
    pub(crate) fn from_row(
        row: &Row<'_>,
        unified_server_name: String,
    ) -> Result<Self, SnapshotError> {
        Ok(Self {
            unified_server_name,
            pxname: FieldValue::coerce("pxname", row.get("pxname"))?,
            svname: FieldValue::coerce("svname", row.get("svname"))?,
            qcur: FieldValue::coerce("qcur", row.get("qcur"))?,
            qmax: FieldValue::coerce("qmax", row.get("qmax"))?,
            scur: FieldValue::coerce("scur", row.get("scur"))?,
            smax: FieldValue::coerce("smax", row.get("smax"))?,
            slim: FieldValue::coerce("slim", row.get("slim"))?,
            stot: FieldValue::coerce("stot", row.get("stot"))?,
            bin: FieldValue::coerce("bin", row.get("bin"))?,
            bout: FieldValue::coerce("bout", row.get("bout"))?,
            dresp: FieldValue::coerce("dresp", row.get("dresp"))?,
            econ: FieldValue::coerce("econ", row.get("econ"))?,
            eresp: FieldValue::coerce("eresp", row.get("eresp"))?,
            wretr: FieldValue::coerce("wretr", row.get("wretr"))?,
            wredis: FieldValue::coerce("wredis", row.get("wredis"))?,
            status: FieldValue::coerce("status", row.get("status"))?,
            weight: FieldValue::coerce("weight", row.get("weight"))?,
            act: FieldValue::coerce("act", row.get("act"))?,
            bck: FieldValue::coerce("bck", row.get("bck"))?,
            chkfail: FieldValue::coerce("chkfail", row.get("chkfail"))?,
            chkdown: FieldValue::coerce("chkdown", row.get("chkdown"))?,
            lastchg: FieldValue::coerce("lastchg", row.get("lastchg"))?,
            downtime: FieldValue::coerce("downtime", row.get("downtime"))?,
            qlimit: FieldValue::coerce("qlimit", row.get("qlimit"))?,
            pid: FieldValue::coerce("pid", row.get("pid"))?,
            iid: FieldValue::coerce("iid", row.get("iid"))?,
            sid: FieldValue::coerce("sid", row.get("sid"))?,
            throttle: FieldValue::coerce("throttle", row.get("throttle"))?,
            lbtot: FieldValue::coerce("lbtot", row.get("lbtot"))?,
            tracked: FieldValue::coerce("tracked", row.get("tracked"))?,
            typ: FieldValue::coerce("type", row.get("type"))?,
            rate: FieldValue::coerce("rate", row.get("rate"))?,
            rate_max: FieldValue::coerce("rate_max", row.get("rate_max"))?,
            check_status: FieldValue::coerce("check_status", row.get("check_status"))?,
            check_code: FieldValue::coerce("check_code", row.get("check_code"))?,
            check_duration: FieldValue::coerce("check_duration", row.get("check_duration"))?,
            hrsp_1xx: FieldValue::coerce("hrsp_1xx", row.get("hrsp_1xx"))?,
            hrsp_2xx: FieldValue::coerce("hrsp_2xx", row.get("hrsp_2xx"))?,
            hrsp_3xx: FieldValue::coerce("hrsp_3xx", row.get("hrsp_3xx"))?,
            hrsp_4xx: FieldValue::coerce("hrsp_4xx", row.get("hrsp_4xx"))?,
            hrsp_5xx: FieldValue::coerce("hrsp_5xx", row.get("hrsp_5xx"))?,
            hrsp_other: FieldValue::coerce("hrsp_other", row.get("hrsp_other"))?,
            hanafail: FieldValue::coerce("hanafail", row.get("hanafail"))?,
            cli_abrt: FieldValue::coerce("cli_abrt", row.get("cli_abrt"))?,
            srv_abrt: FieldValue::coerce("srv_abrt", row.get("srv_abrt"))?,
            lastsess: FieldValue::coerce("lastsess", row.get("lastsess"))?,
            last_chk: FieldValue::coerce("last_chk", row.get("last_chk"))?,
            last_agt: FieldValue::coerce("last_agt", row.get("last_agt"))?,
            qtime: FieldValue::coerce("qtime", row.get("qtime"))?,
            ctime: FieldValue::coerce("ctime", row.get("ctime"))?,
            rtime: FieldValue::coerce("rtime", row.get("rtime"))?,
            ttime: FieldValue::coerce("ttime", row.get("ttime"))?,
        })
    }
}

/// Any record built from one snapshot row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatRecord {
    Listener(ListenerStats),
    Frontend(FrontendStats),
    Backend(BackendStats),
    Server(ServerStats),
}

impl StatRecord {
    /// The record's kind.
    pub fn kind(&self) -> StatKind {
        match self {
            Self::Listener(_) => StatKind::Listener,
            Self::Frontend(_) => StatKind::Frontend,
            Self::Backend(_) => StatKind::Backend,
            Self::Server(_) => StatKind::Server,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse::HeaderIndex;
    use super::*;

    fn row<'a>(header: &'a HeaderIndex, line: &'a str) -> Row<'a> {
        Row::new(header, line)
    }

    #[test]
    fn test_frontend_marker_classifies_frontend() {
        let header = HeaderIndex::parse("pxname,svname,qcur");
        let r = row(&header, "app,FRONTEND,");
        assert_eq!(StatKind::classify(&r), StatKind::Frontend);
    }

    #[test]
    fn test_backend_marker_classifies_backend() {
        let header = HeaderIndex::parse("pxname,svname,qcur");
        // A backend row carries qcur, but the marker wins first.
        let r = row(&header, "app,BACKEND,3");
        assert_eq!(StatKind::classify(&r), StatKind::Backend);
    }

    #[test]
    fn test_nonempty_qcur_classifies_server() {
        let header = HeaderIndex::parse("pxname,svname,qcur");
        let r = row(&header, "app,node-1,0");
        assert_eq!(StatKind::classify(&r), StatKind::Server);
    }

    #[test]
    fn test_empty_qcur_classifies_listener() {
        let header = HeaderIndex::parse("pxname,svname,qcur,scur");
        // Other non-empty cells must not sway the decision.
        let r = row(&header, "app,sock-1,,17");
        assert_eq!(StatKind::classify(&r), StatKind::Listener);
    }

    #[test]
    fn test_missing_qcur_column_classifies_listener() {
        let header = HeaderIndex::parse("pxname,svname,scur");
        let r = row(&header, "app,node-1,17");
        assert_eq!(StatKind::classify(&r), StatKind::Listener);
    }

    #[test]
    fn test_marker_is_case_sensitive() {
        let header = HeaderIndex::parse("pxname,svname,qcur");
        let r = row(&header, "app,frontend,");
        assert_eq!(StatKind::classify(&r), StatKind::Listener);
    }

    #[test]
    fn test_listener_builder_coerces_all_fields() {
        let header = HeaderIndex::parse("pxname,svname,scur,status");
        let r = row(&header, "app,sock-1,4,OPEN");
        let listener = ListenerStats::from_row(&r).unwrap();

        assert_eq!(listener.pxname, FieldValue::Text("app".into()));
        assert_eq!(listener.scur, FieldValue::Int(4));
        assert_eq!(listener.status, FieldValue::Text("OPEN".into()));
        // Columns outside this header resolve to Unknown.
        assert_eq!(listener.smax, FieldValue::Unknown);
        assert_eq!(listener.sid, FieldValue::Unknown);
    }

    #[test]
    fn test_server_builder_carries_resolved_identity() {
        let header = HeaderIndex::parse("pxname,svname,qcur,weight");
        let r = row(&header, "app,node-1,0,100");
        let server = ServerStats::from_row(&r, "app-cluster/node-1".into()).unwrap();

        assert_eq!(server.unified_server_name, "app-cluster/node-1");
        assert_eq!(server.qcur, FieldValue::Int(0));
        assert_eq!(server.weight, FieldValue::Int(100));
        assert_eq!(server.check_status, FieldValue::Unknown);
    }

    #[test]
    fn test_builder_propagates_integer_failure() {
        let header = HeaderIndex::parse("pxname,svname,scur");
        let r = row(&header, "app,FRONTEND,many");
        let err = FrontendStats::from_row(&r).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::InvalidInteger { field: "scur", .. }
        ));
    }

    #[test]
    fn test_record_kind_matches_variant() {
        let header = HeaderIndex::parse("pxname,svname,qcur");
        let r = row(&header, "app,FRONTEND,");
        let record = StatRecord::Frontend(FrontendStats::from_row(&r).unwrap());
        assert_eq!(record.kind(), StatKind::Frontend);
        assert_eq!(record.kind().as_str(), "frontend");
    }
}
