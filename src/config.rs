use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Top-level configuration for the proxyscope agent.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Logging verbosity (trace, debug, info, warn, error). Default: "info".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Balancer connection and polling configuration.
    pub haproxy: HaproxyConfig,

    /// Name-resolution mappings.
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Prometheus health metrics server configuration.
    #[serde(default)]
    pub health: HealthConfig,
}

/// Balancer connection and polling configuration.
#[derive(Debug, Deserialize)]
pub struct HaproxyConfig {
    /// Path to the HAProxy stats socket.
    pub socket_path: PathBuf,

    /// How often to collect a snapshot. Default: 10s.
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Socket read/write timeout for one fetch. Default: 5s.
    #[serde(default = "default_socket_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

/// Name-resolution mappings; unmapped names pass through unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct ResolverConfig {
    /// Raw proxy name → external service name.
    #[serde(default)]
    pub services: HashMap<String, String>,

    /// "<proxy>/<server>" → external server identity.
    #[serde(default)]
    pub servers: HashMap<String, String>,
}

/// Prometheus health metrics server configuration.
#[derive(Debug, Deserialize)]
pub struct HealthConfig {
    /// Listen address for /metrics and /healthz. Default: ":9123".
    #[serde(default = "default_health_addr")]
    pub addr: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(10)
}

fn default_socket_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_health_addr() -> String {
    ":9123".to_string()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            addr: default_health_addr(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;

        let cfg: Config = serde_yaml::from_str(&data)
            .with_context(|| format!("parsing config file {}", path.display()))?;

        cfg.validate()?;

        Ok(cfg)
    }

    /// Validate the configuration for required fields and consistency.
    pub fn validate(&self) -> Result<()> {
        if self.haproxy.socket_path.as_os_str().is_empty() {
            bail!("haproxy.socket_path is required");
        }

        if self.haproxy.poll_interval.is_zero() {
            bail!("haproxy.poll_interval must be positive");
        }

        if self.haproxy.timeout.is_zero() {
            bail!("haproxy.timeout must be positive");
        }

        for key in self.resolver.servers.keys() {
            if !key.contains('/') {
                bail!("resolver.servers key '{key}' must look like '<proxy>/<server>'");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Config {
        serde_yaml::from_str(yaml).expect("valid yaml")
    }

    #[test]
    fn test_minimal_config_gets_defaults() {
        let cfg = parse("haproxy:\n  socket_path: /var/run/haproxy.sock\n");
        cfg.validate().expect("valid");

        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.haproxy.poll_interval, Duration::from_secs(10));
        assert_eq!(cfg.haproxy.timeout, Duration::from_secs(5));
        assert_eq!(cfg.health.addr, ":9123");
        assert!(cfg.resolver.services.is_empty());
    }

    #[test]
    fn test_humantime_intervals() {
        let cfg = parse(
            "haproxy:\n  socket_path: /var/run/haproxy.sock\n  poll_interval: 30s\n  timeout: 500ms\n",
        );
        assert_eq!(cfg.haproxy.poll_interval, Duration::from_secs(30));
        assert_eq!(cfg.haproxy.timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_resolver_maps_parse() {
        let cfg = parse(
            "haproxy:\n  socket_path: /var/run/haproxy.sock\nresolver:\n  services:\n    taskqueue: task-queue\n  servers:\n    taskqueue/node-1: task-queue/10.0.0.1\n",
        );
        cfg.validate().expect("valid");
        assert_eq!(cfg.resolver.services["taskqueue"], "task-queue");
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        let cfg = parse("haproxy:\n  socket_path: /var/run/haproxy.sock\n  poll_interval: 0s\n");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_malformed_server_key_is_rejected() {
        let cfg = parse(
            "haproxy:\n  socket_path: /var/run/haproxy.sock\nresolver:\n  servers:\n    node-1: external\n",
        );
        assert!(cfg.validate().is_err());
    }
}
