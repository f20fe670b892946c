//! proxyscope: HAProxy statistics collection agent.
//!
//! Polls the balancer's stats socket on an interval, parses each `show
//! stat` CSV snapshot into strongly-typed per-proxy aggregates, and exposes
//! agent health over Prometheus. The parsing core lives in [`stats`]; the
//! snapshot transport and name resolution are pluggable collaborators
//! ([`source`], [`resolve`]).

pub mod agent;
pub mod config;
pub mod export;
pub mod resolve;
pub mod source;
pub mod stats;
