//! In-memory port catalog.
//!
//! The catalog is the read-only node set for graph construction and the
//! backing store for the in-process repository. It is immutable once built;
//! ingestion produces a new catalog with a bumped version, which invalidates
//! the materialized graph.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::port::Port;

/// Immutable snapshot of the port catalog.
#[derive(Debug, Clone, Default)]
pub struct PortCatalog {
    ports: HashMap<String, Arc<Port>>,
    /// Monotonic version, bumped by ingestion. Graph snapshots record the
    /// version they were built from.
    version: u64,
}

impl PortCatalog {
    /// Build a catalog from validated port records.
    ///
    /// Every entry is validated and UN/LOCODE uniqueness is enforced.
    pub fn from_ports(ports: impl IntoIterator<Item = Port>, version: u64) -> Result<Self> {
        let mut map = HashMap::new();
        for port in ports {
            port.validate()?;
            if map.contains_key(&port.code) {
                return Err(Error::DuplicatePortCode { code: port.code });
            }
            map.insert(port.code.clone(), Arc::new(port));
        }
        Ok(Self { ports: map, version })
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Lookup a port by exact UN/LOCODE.
    pub fn get(&self, code: &str) -> Option<&Arc<Port>> {
        self.ports.get(code)
    }

    /// Iterate all ports in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Port>> {
        self.ports.values()
    }

    /// All ports sorted by UN/LOCODE, the canonical iteration order for
    /// deterministic graph construction.
    pub fn sorted_ports(&self) -> Vec<Arc<Port>> {
        let mut ports: Vec<Arc<Port>> = self.ports.values().cloned().collect();
        ports.sort_by(|a, b| a.code.cmp(&b.code));
        ports
    }

    /// Closest catalog matches for an unknown code or name, by Jaro-Winkler
    /// similarity over both the UN/LOCODE and the port name.
    pub fn fuzzy_matches(&self, query: &str, limit: usize) -> Vec<String> {
        let needle = query.to_uppercase();
        let mut scored: Vec<(f64, &str)> = self
            .ports
            .values()
            .map(|port| {
                let by_code = strsim::jaro_winkler(&needle, &port.code);
                let by_name = strsim::jaro_winkler(&query.to_lowercase(), &port.name.to_lowercase());
                (by_code.max(by_name), port.code.as_str())
            })
            .filter(|(score, _)| *score >= 0.6)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, code)| code.to_string())
            .collect()
    }
}
