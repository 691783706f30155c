//! Pathfinding over the port graph.
//!
//! Dijkstra with a binary min-heap is the primary search; the balanced
//! criterion uses A* with an admissible great-circle lower bound. Labels
//! are per `(node, hops)` so the connecting-port cap never discards a
//! cheaper-but-longer label that could still reach the destination within
//! the cap. Alternatives come from Yen's algorithm over the same filtered
//! graph.
//!
//! Determinism: node identifiers are assigned in UN/LOCODE order, adjacency
//! lists are sorted by target code, and heap entries tie break on
//! `(cost, hops, node)`, so identical inputs always produce identical
//! route orderings.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use crate::cost::{CostModel, OptimizationCriterion};
use crate::error::{Error, Result};
use crate::geo::distance_nm;
use crate::graph::{GraphEdge, NodeId, PortGraph};
use crate::vessel::VesselProfile;

/// Cooperative cancellation signal checked during search.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::Relaxed)
    }
}

/// Search limits applied during pathfinding.
#[derive(Debug, Clone)]
pub struct SearchLimits {
    /// Maximum number of intermediate ports on a path.
    pub max_intermediate_ports: usize,
    /// Node expansions between cancellation checks.
    pub cancel_check_interval: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_intermediate_ports: 2,
            cancel_check_interval: 4_096,
        }
    }
}

/// A path found by the search, with its accumulated scalar cost.
#[derive(Debug, Clone, PartialEq)]
pub struct FoundPath {
    pub nodes: Vec<NodeId>,
    pub cost: f64,
}

impl FoundPath {
    pub fn hop_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn intermediate_count(&self) -> usize {
        self.nodes.len().saturating_sub(2)
    }
}

/// Result of a top-k search: paths in cost order plus the number of
/// candidate routes evaluated along the way.
#[derive(Debug, Clone)]
pub struct TopKResult {
    pub paths: Vec<FoundPath>,
    pub candidates_evaluated: usize,
}

/// `true` when the vessel may sail this edge: dimension caps at both
/// endpoints, canal compatibility, and traffic-accepting status.
pub fn edge_feasible(graph: &PortGraph, from: NodeId, edge: &GraphEdge, vessel: &VesselProfile) -> bool {
    let from_port = graph.port(from);
    let to_port = graph.port(edge.to);

    if !from_port.status.accepts_traffic() || !to_port.status.accepts_traffic() {
        return false;
    }

    for port in [from_port, to_port] {
        if let Some(max_draft) = port.limits.max_draft_m {
            if vessel.draft_m > max_draft {
                return false;
            }
        }
        if let Some(max_length) = port.limits.max_length_m {
            if vessel.length_m > max_length {
                return false;
            }
        }
        if let Some(max_beam) = port.limits.max_beam_m {
            if vessel.beam_m > max_beam {
                return false;
            }
        }
    }

    match edge.kind {
        crate::graph::EdgeKind::CanalSuez => vessel.suez_canal_compatible,
        crate::graph::EdgeKind::CanalPanama => vessel.panama_canal_compatible,
        _ => true,
    }
}

/// Pathfinder bound to one graph snapshot and one request's parameters.
pub struct PathSearch<'a> {
    graph: &'a PortGraph,
    cost_model: &'a CostModel,
    vessel: &'a VesselProfile,
    criterion: OptimizationCriterion,
    limits: SearchLimits,
    cancel: CancelToken,
    /// Port fees allocated onto edge destinations, cached per node.
    arrival_fees: Vec<f64>,
}

impl<'a> PathSearch<'a> {
    pub fn new(
        graph: &'a PortGraph,
        cost_model: &'a CostModel,
        vessel: &'a VesselProfile,
        criterion: OptimizationCriterion,
        limits: SearchLimits,
        cancel: CancelToken,
    ) -> Self {
        let arrival_fees = (0..graph.node_count())
            .map(|node| cost_model.port_fee_usd(graph.port(node as NodeId), vessel))
            .collect();
        Self {
            graph,
            cost_model,
            vessel,
            criterion,
            limits,
            cancel,
            arrival_fees,
        }
    }

    /// Algorithm tag for the response.
    pub fn algorithm(&self) -> &'static str {
        match self.criterion {
            OptimizationCriterion::Balanced => "a-star",
            _ => "dijkstra",
        }
    }

    fn edge_scalar(&self, edge: &GraphEdge) -> f64 {
        let breakdown = self.cost_model.edge_cost(edge, self.vessel);
        self.cost_model
            .scalar_cost(&breakdown, self.criterion, self.arrival_fees[edge.to as usize])
    }

    /// Scalar cost of a concrete node sequence, accumulating edge costs in
    /// path order so it agrees bit-for-bit with the search accumulation.
    fn path_cost(&self, nodes: &[NodeId]) -> Option<f64> {
        let mut total = 0.0;
        for pair in nodes.windows(2) {
            let edge = self.edge_between(pair[0], pair[1])?;
            total += self.edge_scalar(edge);
        }
        Some(total)
    }

    fn edge_between(&self, from: NodeId, to: NodeId) -> Option<&GraphEdge> {
        self.graph.neighbours(from).iter().find(|edge| edge.to == to)
    }

    /// Shortest feasible path. `Ok(None)` when the filtered subgraph
    /// disconnects the pair.
    pub fn shortest(&self, origin: NodeId, destination: NodeId) -> Result<Option<FoundPath>> {
        let mut expansions = 0usize;
        self.shortest_constrained(
            origin,
            destination,
            self.limits.max_intermediate_ports + 1,
            &HashSet::new(),
            &HashSet::new(),
            &mut expansions,
        )
    }

    /// Top-k loopless paths: the primary plus up to `k - 1` distinct
    /// alternatives, pruned at `cost_ratio` times the primary cost.
    pub fn top_k(
        &self,
        origin: NodeId,
        destination: NodeId,
        k: usize,
        cost_ratio: f64,
    ) -> Result<TopKResult> {
        let mut expansions = 0usize;
        let max_edges = self.limits.max_intermediate_ports + 1;
        let mut evaluated = 0usize;

        let Some(primary) = self.shortest_constrained(
            origin,
            destination,
            max_edges,
            &HashSet::new(),
            &HashSet::new(),
            &mut expansions,
        )?
        else {
            return Ok(TopKResult {
                paths: Vec::new(),
                candidates_evaluated: 0,
            });
        };
        evaluated += 1;

        let cost_cap = primary.cost * cost_ratio;
        let mut accepted: Vec<FoundPath> = vec![primary];
        let mut candidates: Vec<FoundPath> = Vec::new();

        while accepted.len() < k {
            let previous = accepted.last().expect("at least the primary").clone();

            for spur_index in 0..previous.nodes.len() - 1 {
                let spur_node = previous.nodes[spur_index];
                let root = &previous.nodes[..=spur_index];

                // Ban the outgoing edges that previously accepted paths take
                // from this root, and the root nodes themselves, so the spur
                // search can only produce a new loopless deviation.
                let mut banned_edges: HashSet<(NodeId, NodeId)> = HashSet::new();
                for path in &accepted {
                    if path.nodes.len() > spur_index && path.nodes[..=spur_index] == *root {
                        if let Some(&next) = path.nodes.get(spur_index + 1) {
                            banned_edges.insert((spur_node, next));
                        }
                    }
                }
                let banned_nodes: HashSet<NodeId> = root[..spur_index].iter().copied().collect();

                let Some(spur) = self.shortest_constrained(
                    spur_node,
                    destination,
                    max_edges - spur_index,
                    &banned_nodes,
                    &banned_edges,
                    &mut expansions,
                )?
                else {
                    continue;
                };
                evaluated += 1;

                let mut nodes = root.to_vec();
                nodes.extend_from_slice(&spur.nodes[1..]);
                let Some(cost) = self.path_cost(&nodes) else {
                    continue;
                };

                if accepted.iter().any(|path| path.nodes == nodes)
                    || candidates.iter().any(|path| path.nodes == nodes)
                {
                    continue;
                }
                candidates.push(FoundPath { nodes, cost });
            }

            candidates.sort_by(|a, b| {
                a.cost
                    .total_cmp(&b.cost)
                    .then_with(|| a.nodes.len().cmp(&b.nodes.len()))
                    .then_with(|| self.code_sequence(a).cmp(&self.code_sequence(b)))
            });

            let Some(best) = candidates.first().cloned() else {
                break;
            };
            candidates.remove(0);
            if best.cost > cost_cap {
                break;
            }
            accepted.push(best);
        }

        Ok(TopKResult {
            paths: accepted,
            candidates_evaluated: evaluated,
        })
    }

    fn code_sequence(&self, path: &FoundPath) -> Vec<&str> {
        path.nodes
            .iter()
            .map(|&node| self.graph.port(node).code.as_str())
            .collect()
    }

    fn shortest_constrained(
        &self,
        origin: NodeId,
        destination: NodeId,
        max_edges: usize,
        banned_nodes: &HashSet<NodeId>,
        banned_edges: &HashSet<(NodeId, NodeId)>,
        expansions: &mut usize,
    ) -> Result<Option<FoundPath>> {
        if origin == destination {
            return Ok(Some(FoundPath {
                nodes: vec![origin],
                cost: 0.0,
            }));
        }

        let use_astar = self.criterion == OptimizationCriterion::Balanced;
        let per_nm = if use_astar {
            self.cost_model.min_cost_per_nm(self.vessel, self.criterion)
        } else {
            0.0
        };
        let goal_position = self.graph.port(destination).position;
        let heuristic = |node: NodeId| -> f64 {
            if use_astar {
                per_nm * distance_nm(self.graph.port(node).position, goal_position)
            } else {
                0.0
            }
        };

        let mut best: HashMap<(NodeId, u32), f64> = HashMap::new();
        let mut parents: HashMap<(NodeId, u32), (NodeId, u32)> = HashMap::new();
        let mut queue: BinaryHeap<QueueEntry> = BinaryHeap::new();

        best.insert((origin, 0), 0.0);
        queue.push(QueueEntry {
            estimate: FloatOrd(heuristic(origin)),
            cost: FloatOrd(0.0),
            hops: 0,
            node: origin,
        });

        while let Some(entry) = queue.pop() {
            *expansions += 1;
            if *expansions % self.limits.cancel_check_interval == 0 && self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let label = (entry.node, entry.hops);
            match best.get(&label) {
                Some(&cost) if cost < entry.cost.0 => continue,
                None => continue,
                _ => {}
            }

            if entry.node == destination {
                let nodes = reconstruct(&parents, label, origin);
                return Ok(Some(FoundPath {
                    nodes,
                    cost: entry.cost.0,
                }));
            }

            if entry.hops as usize >= max_edges {
                continue;
            }

            for edge in self.graph.neighbours(entry.node) {
                if banned_nodes.contains(&edge.to)
                    || banned_edges.contains(&(entry.node, edge.to))
                    || !edge_feasible(self.graph, entry.node, edge, self.vessel)
                {
                    continue;
                }

                let next_label = (edge.to, entry.hops + 1);
                let next_cost = entry.cost.0 + self.edge_scalar(edge);
                if next_cost < *best.get(&next_label).unwrap_or(&f64::INFINITY) {
                    best.insert(next_label, next_cost);
                    parents.insert(next_label, label);
                    queue.push(QueueEntry {
                        estimate: FloatOrd(next_cost + heuristic(edge.to)),
                        cost: FloatOrd(next_cost),
                        hops: entry.hops + 1,
                        node: edge.to,
                    });
                }
            }
        }

        Ok(None)
    }
}

fn reconstruct(
    parents: &HashMap<(NodeId, u32), (NodeId, u32)>,
    goal: (NodeId, u32),
    origin: NodeId,
) -> Vec<NodeId> {
    let mut nodes = Vec::new();
    let mut current = goal;
    loop {
        nodes.push(current.0);
        if current.0 == origin && current.1 == 0 {
            break;
        }
        current = parents[&current];
    }
    nodes.reverse();
    nodes
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    estimate: FloatOrd,
    cost: FloatOrd,
    hops: u32,
    node: NodeId,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap pops the smallest estimate first;
        // ties prefer fewer hops, then the smaller node id, which follows
        // UN/LOCODE order by construction.
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.cost.cmp(&self.cost))
            .then_with(|| other.hops.cmp(&self.hops))
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
