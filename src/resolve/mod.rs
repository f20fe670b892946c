use std::collections::HashMap;

use crate::config::ResolverConfig;

/// Maps raw balancer names to externally meaningful identifiers.
///
/// Both methods are total: unresolvable names fall back to identity
/// passthrough rather than failing the snapshot.
pub trait NameResolver: Send + Sync {
    /// External service name for a raw proxy name.
    fn service_name(&self, proxy: &str) -> String;

    /// Stable external identity for one pool member, keyed by raw proxy
    /// and service names. Used to cross-reference process-level stats.
    fn server_identity(&self, proxy: &str, service: &str) -> String;
}

/// Identity resolver: raw names pass through unchanged.
pub struct PassthroughResolver;

impl NameResolver for PassthroughResolver {
    fn service_name(&self, proxy: &str) -> String {
        proxy.to_string()
    }

    fn server_identity(&self, _proxy: &str, service: &str) -> String {
        service.to_string()
    }
}

/// Config-driven resolver with passthrough fallback for unmapped names.
///
/// Service names are looked up by raw proxy name; server identities by
/// `"<proxy>/<service>"`.
pub struct MappingResolver {
    services: HashMap<String, String>,
    servers: HashMap<String, String>,
}

impl MappingResolver {
    pub fn new(cfg: &ResolverConfig) -> Self {
        Self {
            services: cfg.services.clone(),
            servers: cfg.servers.clone(),
        }
    }
}

impl NameResolver for MappingResolver {
    fn service_name(&self, proxy: &str) -> String {
        self.services
            .get(proxy)
            .cloned()
            .unwrap_or_else(|| proxy.to_string())
    }

    fn server_identity(&self, proxy: &str, service: &str) -> String {
        let key = format!("{proxy}/{service}");
        self.servers
            .get(&key)
            .cloned()
            .unwrap_or_else(|| service.to_string())
    }
}
