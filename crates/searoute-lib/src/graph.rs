//! Port graph construction and snapshot management.
//!
//! The graph is a sparse directed network over the active port catalog:
//! k-nearest-neighbour legs within a radius cap, curated canal edges, and
//! long-range legs fanning out from the top hub ports. Every edge has a
//! reverse twin with identical geometric distance. The materialized graph
//! is immutable; catalog changes trigger a single-flighted rebuild that
//! publishes a new snapshot atomically.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::PortCatalog;
use crate::error::{Error, Result};
use crate::geo::{distance_nm, interpolate};
use crate::port::{Port, PortStatus};
use crate::spatial::{NeighbourQuery, SpatialPortIndex};
use crate::tables::Tables;

/// Node identifier within one graph snapshot. Not stable across rebuilds.
pub type NodeId = u32;

/// Classification of a graph leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    OpenSea,
    Coastal,
    CanalSuez,
    CanalPanama,
    River,
}

impl EdgeKind {
    /// `true` for the canal kinds that gate on a vessel compatibility flag.
    pub fn requires_canal_flag(&self) -> bool {
        matches!(self, EdgeKind::CanalSuez | EdgeKind::CanalPanama)
    }
}

/// Directed leg between two ports.
#[derive(Debug, Clone)]
pub struct GraphEdge {
    pub to: NodeId,
    pub kind: EdgeKind,
    /// Great-circle distance in nautical miles, identical in both directions.
    pub distance_nm: f64,
    /// Base congestion multiplier derived from the endpoint ports.
    pub congestion: f64,
    /// Transit-time multiplier from the weather zone at the leg midpoint.
    pub weather_factor: f64,
    /// Weather risk score at the leg midpoint, 0-100.
    pub weather_risk: f64,
    /// Piracy risk score from the country-pair matrix, 0-100.
    pub piracy_risk: f64,
    /// Political risk score from the country-pair matrix, 0-100.
    pub political_risk: f64,
}

/// A curated canal crossing between two gateway ports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanalSpec {
    pub name: String,
    pub kind: EdgeKind,
    pub from: String,
    pub to: String,
}

/// Options controlling graph construction, sourced from configuration.
#[derive(Debug, Clone)]
pub struct GraphOptions {
    /// k-NN fan-out per node.
    pub k_nearest: usize,
    /// Radius cap for k-NN legs in nautical miles.
    pub knn_radius_nm: f64,
    /// Number of hub ports selected by descending berth count.
    pub hub_count: usize,
    /// Radius cap for hub legs in nautical miles.
    pub hub_radius_nm: f64,
    /// Legs at or below this length are classified as coastal.
    pub coastal_threshold_nm: f64,
    pub canals: Vec<CanalSpec>,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            k_nearest: 8,
            knn_radius_nm: 1_500.0,
            hub_count: 40,
            hub_radius_nm: 6_000.0,
            coastal_threshold_nm: 400.0,
            canals: default_canals(),
        }
    }
}

/// The default curated canal set. Specs whose gateway ports are absent from
/// the catalog are skipped at build time.
pub fn default_canals() -> Vec<CanalSpec> {
    vec![
        CanalSpec {
            name: "suez".to_string(),
            kind: EdgeKind::CanalSuez,
            from: "EGSUZ".to_string(),
            to: "EGPSD".to_string(),
        },
        CanalSpec {
            name: "panama".to_string(),
            kind: EdgeKind::CanalPanama,
            from: "PABLB".to_string(),
            to: "PAMIT".to_string(),
        },
        CanalSpec {
            name: "kiel".to_string(),
            kind: EdgeKind::River,
            from: "DEBRB".to_string(),
            to: "DEKEL".to_string(),
        },
        CanalSpec {
            name: "bosphorus".to_string(),
            kind: EdgeKind::Coastal,
            from: "TRIST".to_string(),
            to: "TRZON".to_string(),
        },
    ]
}

/// Immutable materialized port graph.
#[derive(Debug)]
pub struct PortGraph {
    nodes: Vec<Arc<Port>>,
    adjacency: Vec<Vec<GraphEdge>>,
    by_code: HashMap<String, NodeId>,
    catalog_version: u64,
    edge_count: usize,
}

impl PortGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Directed edge count.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn catalog_version(&self) -> u64 {
        self.catalog_version
    }

    pub fn port(&self, node: NodeId) -> &Arc<Port> {
        &self.nodes[node as usize]
    }

    pub fn node_by_code(&self, code: &str) -> Option<NodeId> {
        self.by_code.get(code).copied()
    }

    /// Outgoing edges, sorted by target UN/LOCODE for deterministic
    /// iteration.
    pub fn neighbours(&self, node: NodeId) -> &[GraphEdge] {
        &self.adjacency[node as usize]
    }
}

/// Build the port graph from a catalog snapshot.
///
/// Fails with [`Error::GraphBuildFailed`] when the result is not connected
/// over all included nodes.
pub fn build_graph(catalog: &PortCatalog, options: &GraphOptions, tables: &Tables) -> Result<PortGraph> {
    let nodes: Vec<Arc<Port>> = catalog
        .sorted_ports()
        .into_iter()
        .filter(|port| port.status != PortStatus::Inactive)
        .collect();

    if nodes.is_empty() {
        return Err(Error::GraphBuildFailed {
            message: "catalog has no non-inactive ports".to_string(),
        });
    }

    let by_code: HashMap<String, NodeId> = nodes
        .iter()
        .enumerate()
        .map(|(idx, port)| (port.code.clone(), idx as NodeId))
        .collect();

    let canal_pairs: Vec<(String, String)> = options
        .canals
        .iter()
        .map(|spec| ordered_pair(&spec.from, &spec.to))
        .collect();

    let index = SpatialPortIndex::build(catalog);
    let mut edges: HashMap<(NodeId, NodeId), EdgeKind> = HashMap::new();

    // k-NN legs. The spatial query over-fetches because the raw neighbour
    // list still gets filtered by status, sea-area wiring, and canal pairs.
    let fetch = options.k_nearest * 3 + 8;
    for (from_id, port) in nodes.iter().enumerate() {
        let from_id = from_id as NodeId;
        let mut taken = 0usize;
        for candidate in index.nearest(
            port.position,
            &NeighbourQuery::within_radius(fetch, options.knn_radius_nm),
        ) {
            if taken >= options.k_nearest {
                break;
            }
            let other = &candidate.port;
            if other.code == port.code {
                continue;
            }
            let Some(&to_id) = by_code.get(&other.code) else {
                continue;
            };
            if !wiring_allowed(port, other, &canal_pairs) {
                continue;
            }
            let kind = if candidate.distance_nm <= options.coastal_threshold_nm {
                EdgeKind::Coastal
            } else {
                EdgeKind::OpenSea
            };
            insert_twin(&mut edges, from_id, to_id, kind);
            taken += 1;
        }
    }

    // Curated canal edges.
    for spec in &options.canals {
        match (by_code.get(&spec.from), by_code.get(&spec.to)) {
            (Some(&a), Some(&b)) => {
                insert_twin(&mut edges, a, b, spec.kind);
                debug!(canal = %spec.name, "added canal edge");
            }
            _ => {
                debug!(canal = %spec.name, "canal gateway ports absent from catalog; skipping");
            }
        }
    }

    // Hub legs from the top-N hubs by berth count.
    let mut hubs: Vec<NodeId> = (0..nodes.len() as NodeId)
        .filter(|&id| {
            let port = &nodes[id as usize];
            port.is_hub_candidate() && port.status.accepts_traffic()
        })
        .collect();
    hubs.sort_by(|&a, &b| {
        let pa = &nodes[a as usize];
        let pb = &nodes[b as usize];
        pb.berth_count
            .cmp(&pa.berth_count)
            .then_with(|| pa.code.cmp(&pb.code))
    });
    hubs.truncate(options.hub_count);

    for &hub_id in &hubs {
        let hub = &nodes[hub_id as usize];
        for (to_id, other) in nodes.iter().enumerate() {
            let to_id = to_id as NodeId;
            if to_id == hub_id || !wiring_allowed(hub, other, &canal_pairs) {
                continue;
            }
            if distance_nm(hub.position, other.position) > options.hub_radius_nm {
                continue;
            }
            let entry = (hub_id.min(to_id), hub_id.max(to_id));
            if !edges.contains_key(&entry) {
                insert_twin(&mut edges, hub_id, to_id, EdgeKind::OpenSea);
            }
        }
    }

    // Materialize adjacency with per-edge metrics.
    let mut adjacency: Vec<Vec<GraphEdge>> = vec![Vec::new(); nodes.len()];
    let mut edge_count = 0usize;
    for (&(a, b), &kind) in &edges {
        let edge_ab = materialize_edge(&nodes, a, b, kind, tables);
        let edge_ba = materialize_edge(&nodes, b, a, kind, tables);
        adjacency[a as usize].push(edge_ab);
        adjacency[b as usize].push(edge_ba);
        edge_count += 2;
    }
    for (node, list) in adjacency.iter_mut().enumerate() {
        debug_assert!(list.iter().all(|edge| edge.to as usize != node));
        list.sort_by(|a, b| nodes[a.to as usize].code.cmp(&nodes[b.to as usize].code));
    }

    let graph = PortGraph {
        nodes,
        adjacency,
        by_code,
        catalog_version: catalog.version(),
        edge_count,
    };

    check_connectivity(&graph)?;

    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        catalog_version = graph.catalog_version(),
        "port graph built"
    );
    Ok(graph)
}

/// Generic wiring is allowed between traffic-accepting or maintenance
/// ports in open-water adjacent basins, excluding declared canal pairs.
fn wiring_allowed(a: &Port, b: &Port, canal_pairs: &[(String, String)]) -> bool {
    if !a.sea_area.open_to(b.sea_area) {
        return false;
    }
    let pair = ordered_pair(&a.code, &b.code);
    !canal_pairs.contains(&pair)
}

fn ordered_pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

fn insert_twin(edges: &mut HashMap<(NodeId, NodeId), EdgeKind>, a: NodeId, b: NodeId, kind: EdgeKind) {
    edges.entry((a.min(b), a.max(b))).or_insert(kind);
}

fn materialize_edge(
    nodes: &[Arc<Port>],
    from: NodeId,
    to: NodeId,
    kind: EdgeKind,
    tables: &Tables,
) -> GraphEdge {
    let from_port = &nodes[from as usize];
    let to_port = &nodes[to as usize];
    let distance = distance_nm(from_port.position, to_port.position);
    let midpoint = interpolate(from_port.position, to_port.position, 2)[1];
    let (weather_factor, weather_risk) = tables.weather_at(midpoint);
    let risk = tables.risk.lookup(&from_port.country, &to_port.country);

    GraphEdge {
        to,
        kind,
        distance_nm: distance,
        congestion: (from_port.congestion_factor + to_port.congestion_factor) / 2.0,
        weather_factor,
        weather_risk,
        piracy_risk: risk.piracy,
        political_risk: risk.political,
    }
}

fn check_connectivity(graph: &PortGraph) -> Result<()> {
    let n = graph.node_count();
    let mut visited = vec![false; n];
    let mut stack = vec![0 as NodeId];
    visited[0] = true;
    let mut reached = 1usize;

    while let Some(node) = stack.pop() {
        for edge in graph.neighbours(node) {
            if !visited[edge.to as usize] {
                visited[edge.to as usize] = true;
                reached += 1;
                stack.push(edge.to);
            }
        }
    }

    if reached != n {
        let stranded: Vec<&str> = visited
            .iter()
            .enumerate()
            .filter(|(_, seen)| !**seen)
            .take(5)
            .map(|(idx, _)| graph.nodes[idx].code.as_str())
            .collect();
        return Err(Error::GraphBuildFailed {
            message: format!(
                "graph is disconnected: {} of {} nodes unreachable (e.g. {})",
                n - reached,
                n,
                stranded.join(", ")
            ),
        });
    }
    Ok(())
}

/// Shared handle to the current graph snapshot.
///
/// Readers take a snapshot at request start and hold it for the full
/// request; rebuilds are serialized by a mutex and publish atomically.
/// A failed rebuild keeps the previous good snapshot in place.
pub struct GraphHandle {
    current: ArcSwap<PortGraph>,
    rebuild_lock: Mutex<()>,
}

impl GraphHandle {
    pub fn new(initial: PortGraph) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
            rebuild_lock: Mutex::new(()),
        }
    }

    /// Current snapshot. Cheap; safe to call per request.
    pub fn snapshot(&self) -> Arc<PortGraph> {
        self.current.load_full()
    }

    /// `true` when the given catalog version is newer than the snapshot's.
    pub fn is_stale(&self, catalog_version: u64) -> bool {
        self.current.load().catalog_version() < catalog_version
    }

    /// Rebuild from a newer catalog and publish the new snapshot.
    ///
    /// Serialized: a second caller blocks until the first finishes, then
    /// observes the fresh snapshot and returns without rebuilding.
    pub fn rebuild(
        &self,
        catalog: &PortCatalog,
        options: &GraphOptions,
        tables: &Tables,
    ) -> Result<()> {
        let _guard = self.rebuild_lock.lock().unwrap_or_else(|e| e.into_inner());
        if !self.is_stale(catalog.version()) {
            debug!(version = catalog.version(), "graph already current; skipping rebuild");
            return Ok(());
        }
        match build_graph(catalog, options, tables) {
            Ok(graph) => {
                self.current.store(Arc::new(graph));
                Ok(())
            }
            Err(error) => {
                warn!(%error, "graph rebuild failed; keeping previous snapshot");
                Err(error)
            }
        }
    }
}
