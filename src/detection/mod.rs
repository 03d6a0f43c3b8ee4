/*!
 * Deadlock Detection
 *
 * Cycle analysis over the combined process/resource node space. With
 * single-instance resources a directed cycle is both necessary and
 * sufficient for deadlock.
 *
 * The adjacency map is viewed as a petgraph `DiGraphMap` borrowing the
 * store's ids. Strongly connected components come from Tarjan's algorithm
 * (O(V+E)), then one concrete closed walk is extracted from every cyclic
 * component so that disjoint deadlocks are reported separately. The graph is
 * only ever read.
 */

use crate::core::types::{NodeId, NodeKind};
use crate::graph::{Adjacency, GraphStore};
use ahash::RandomState;
use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, debug_span, info};

/// A closed directed walk found in the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    /// Nodes in walk order, starting at the smallest id; the last node links back to the first
    pub nodes: Vec<NodeId>,
    /// Processes on the walk, sorted
    pub processes: Vec<NodeId>,
    /// Every process of the strongly connected component holding the walk, sorted
    ///
    /// A superset of `processes` when several cycles overlap.
    pub deadlocked: Vec<NodeId>,
}

impl Cycle {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n == id)
    }
}

/// Result of a detection pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlockReport {
    /// One cycle per deadlocked component, ordered by smallest member id
    pub cycles: Vec<Cycle>,
}

impl DeadlockReport {
    pub fn is_deadlocked(&self) -> bool {
        !self.cycles.is_empty()
    }

    /// Every process sitting in a deadlocked component
    pub fn deadlocked_processes(&self) -> BTreeSet<&NodeId> {
        self.cycles
            .iter()
            .flat_map(|c| c.deadlocked.iter())
            .collect()
    }
}

/// Read-only cycle detector
#[derive(Debug, Clone, Copy, Default)]
pub struct Detector;

impl Detector {
    pub fn new() -> Self {
        Self
    }

    /// Analyse the graph and report every deadlocked component
    pub fn detect(&self, graph: &GraphStore) -> DeadlockReport {
        let span = debug_span!(
            "detect_deadlock",
            nodes = graph.node_count(),
            edges = graph.edge_count()
        );
        let _enter = span.enter();

        let is_process = |id: &NodeId| graph.kind(id.as_str()) == Some(NodeKind::Process);
        let cycles: Vec<Cycle> = find_cycles(graph.adjacency())
            .into_iter()
            .map(|(nodes, component)| {
                let mut processes: Vec<NodeId> =
                    nodes.iter().filter(|n| is_process(*n)).cloned().collect();
                processes.sort();
                let deadlocked = component.into_iter().filter(|n| is_process(n)).collect();
                Cycle {
                    nodes,
                    processes,
                    deadlocked,
                }
            })
            .collect();

        if cycles.is_empty() {
            debug!("No deadlock detected");
        } else {
            for cycle in &cycles {
                info!(
                    cycle = %join(&cycle.nodes),
                    processes = cycle.processes.len(),
                    "Deadlock cycle detected"
                );
            }
        }

        DeadlockReport { cycles }
    }

    /// Whether the graph is deadlocked
    pub fn is_deadlocked(&self, graph: &GraphStore) -> bool {
        has_cycle(graph.adjacency())
    }
}

fn join(nodes: &[NodeId]) -> String {
    nodes
        .iter()
        .map(NodeId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Wait-for view of the adjacency map, borrowing its ids
type WaitGraph<'a> = DiGraphMap<&'a NodeId, ()>;

fn wait_graph(adjacency: &Adjacency) -> WaitGraph<'_> {
    let edges = adjacency.values().map(|targets| targets.len()).sum();
    let mut graph = WaitGraph::with_capacity(adjacency.len(), edges);
    for (from, targets) in adjacency {
        graph.add_node(from);
        for to in targets {
            graph.add_edge(from, to, ());
        }
    }
    graph
}

/// Whether any directed cycle exists (self-edges included)
pub fn has_cycle(adjacency: &Adjacency) -> bool {
    is_cyclic_directed(&wait_graph(adjacency))
}

/// One closed walk per cyclic strongly connected component
///
/// Returns `(walk, component)` pairs ordered by the component's smallest id.
/// Nodes that appear only as edge targets are treated as nodes with no
/// successors.
pub fn find_cycles(adjacency: &Adjacency) -> Vec<(Vec<NodeId>, Vec<NodeId>)> {
    let graph = wait_graph(adjacency);

    let mut found: Vec<(Vec<NodeId>, Vec<NodeId>)> = tarjan_scc(&graph)
        .into_iter()
        .filter(|members| is_cyclic(&graph, members))
        .map(|mut members| {
            members.sort();
            let walk = extract_cycle(&graph, &members);
            (walk, members.into_iter().cloned().collect())
        })
        .collect();

    found.sort_by(|a, b| a.1.first().cmp(&b.1.first()));
    found
}

/// A component deadlocks when it has two or more members, or one with a self-edge
fn is_cyclic<'a>(graph: &WaitGraph<'a>, members: &[&'a NodeId]) -> bool {
    match members {
        [] => false,
        [only] => graph.contains_edge(*only, *only),
        _ => true,
    }
}

/// Closed walk inside a cyclic component, rotated to start at its smallest id
fn extract_cycle<'a>(graph: &WaitGraph<'a>, members: &[&'a NodeId]) -> Vec<NodeId> {
    let Some(&start) = members.iter().min() else {
        return Vec::new();
    };
    let inside: HashSet<&NodeId, RandomState> = members.iter().copied().collect();

    let mut visited: HashSet<&NodeId, RandomState> = HashSet::default();
    let mut path_pos: HashMap<&NodeId, usize, RandomState> = HashMap::default();
    let mut path: Vec<&'a NodeId> = vec![start];
    let mut frames = vec![graph.neighbors(start)];
    visited.insert(start);
    path_pos.insert(start, 0);

    let mut walk: Vec<&'a NodeId> = Vec::new();
    while let Some(successors) = frames.last_mut() {
        let Some(next) = successors.next() else {
            frames.pop();
            if let Some(done) = path.pop() {
                path_pos.remove(&done);
            }
            continue;
        };
        if !inside.contains(&next) {
            continue;
        }
        if let Some(&pos) = path_pos.get(&next) {
            walk = path[pos..].to_vec();
            break;
        }
        if visited.insert(next) {
            path_pos.insert(next, path.len());
            path.push(next);
            frames.push(graph.neighbors(next));
        }
    }

    if let Some(first) = walk
        .iter()
        .enumerate()
        .min_by_key(|&(_, id)| *id)
        .map(|(i, _)| i)
    {
        walk.rotate_left(first);
    }
    walk.into_iter().cloned().collect()
}
