//! Static field registry for the four record kinds.
//!
//! Field names and order match the HAProxy 1.5 `show stat` CSV columns each
//! kind reports. The union of the four lists is the reference header set an
//! incoming snapshot is compared against.

use std::collections::HashSet;

/// Columns reported for a socket/listener row.
pub const LISTENER_FIELDS: &[&str] = &[
    "pxname", "svname", "scur", "smax", "slim", "stot", "bin", "bout", "dreq",
    "dresp", "ereq", "status", "pid", "iid", "sid", "type",
];

/// Columns reported for a FRONTEND row.
pub const FRONTEND_FIELDS: &[&str] = &[
    "pxname", "svname", "scur", "smax", "slim", "stot", "bin", "bout", "dreq",
    "dresp", "ereq", "status", "pid", "iid", "type", "rate", "rate_lim",
    "rate_max", "hrsp_1xx", "hrsp_2xx", "hrsp_3xx", "hrsp_4xx", "hrsp_5xx",
    "hrsp_other", "req_rate", "req_rate_max", "req_tot", "comp_in", "comp_out",
    "comp_byp", "comp_rsp",
];

/// Columns reported for a BACKEND row.
pub const BACKEND_FIELDS: &[&str] = &[
    "pxname", "svname", "qcur", "qmax", "scur", "smax", "slim", "stot", "bin",
    "bout", "dreq", "dresp", "econ", "eresp", "wretr", "wredis", "status",
    "weight", "act", "bck", "chkdown", "lastchg", "downtime", "pid", "iid",
    "lbtot", "type", "rate", "rate_max", "hrsp_1xx", "hrsp_2xx", "hrsp_3xx",
    "hrsp_4xx", "hrsp_5xx", "hrsp_other", "cli_abrt", "srv_abrt", "comp_in",
    "comp_out", "comp_byp", "comp_rsp", "lastsess", "qtime", "ctime", "rtime",
    "ttime",
];

/// Columns reported for a server (pool member) row.
pub const SERVER_FIELDS: &[&str] = &[
    "pxname", "svname", "qcur", "qmax", "scur", "smax", "slim", "stot", "bin",
    "bout", "dresp", "econ", "eresp", "wretr", "wredis", "status", "weight",
    "act", "bck", "chkfail", "chkdown", "lastchg", "downtime", "qlimit", "pid",
    "iid", "sid", "throttle", "lbtot", "tracked", "type", "rate", "rate_max",
    "check_status", "check_code", "check_duration", "hrsp_1xx", "hrsp_2xx",
    "hrsp_3xx", "hrsp_4xx", "hrsp_5xx", "hrsp_other", "hanafail", "cli_abrt",
    "srv_abrt", "lastsess", "last_chk", "last_agt", "qtime", "ctime", "rtime",
    "ttime",
];

/// Registry fields that carry text. Every other registry field is an integer.
const TEXT_FIELDS: &[&str] = &[
    "pxname",
    "svname",
    "status",
    "check_status",
    "last_chk",
    "last_agt",
];

/// True when the named registry field is integer-typed.
pub fn is_integer_field(name: &str) -> bool {
    !TEXT_FIELDS.contains(&name)
}

/// The reference header set: union of all four kinds' columns, in
/// first-encounter order across listener, frontend, backend, server.
pub fn reference_fields() -> Vec<&'static str> {
    let mut seen = HashSet::new();
    let mut union = Vec::with_capacity(64);

    for list in [
        LISTENER_FIELDS,
        FRONTEND_FIELDS,
        BACKEND_FIELDS,
        SERVER_FIELDS,
    ] {
        for field in list {
            if seen.insert(*field) {
                union.push(*field);
            }
        }
    }

    union
}

/// Reference fields absent from the given snapshot header, in registry order.
///
/// A non-empty result means an older balancer version; affected fields
/// resolve to [`super::FieldValue::Unknown`] in every record.
pub fn missing_fields<'a>(header: impl Iterator<Item = &'a str>) -> Vec<&'static str> {
    let present: HashSet<&str> = header.collect();

    reference_fields()
        .into_iter()
        .filter(|field| !present.contains(field))
        .collect()
}
